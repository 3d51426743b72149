//! Events that trigger scan state transitions

use super::machine::FailureKind;

/// Events that can trigger scan state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanEvent {
    /// Operator or controller started a scan
    Start,
    /// Face is up and the `IMAGE` command went out
    Requested,
    /// Host answered with something that is not a response
    Noise,
    /// Host answered `OK`
    Accepted,
    /// Move on to the next face
    Advance,
    /// Scan aborted
    Fail(FailureKind),
    /// Return to idle after a finished or failed scan
    Reset,
}

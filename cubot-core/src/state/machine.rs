//! Scan state definition

use core::fmt;

use super::events::ScanEvent;
use crate::cube::Face;
use crate::scan::SCAN_ORDER;

/// Why a scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailureKind {
    /// A motor failed while placing a face
    Actuation,
    /// Host answered `ERROR`
    Rejected,
    /// No answer within the timeout
    Timeout,
    /// Link to the host is gone
    ConnectionLost,
    /// Too many unusable lines from the host
    Protocol,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Actuation => f.write_str("actuation"),
            FailureKind::Rejected => f.write_str("rejected"),
            FailureKind::Timeout => f.write_str("timeout"),
            FailureKind::ConnectionLost => f.write_str("connection lost"),
            FailureKind::Protocol => f.write_str("protocol"),
        }
    }
}

/// Scan states
///
/// The index is the position in `SCAN_ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanState {
    /// No scan running
    Idle,
    /// Placing the face and requesting the image
    Scanning(u8),
    /// Waiting for the host's answer
    Awaiting(u8),
    /// Image captured, about to move on
    Advancing(u8),
    /// All six faces captured
    Done,
    /// Scan aborted
    Failed(FailureKind),
}

impl ScanState {
    /// Face being handled, if a scan is in progress
    pub fn face(&self) -> Option<Face> {
        match self {
            ScanState::Scanning(i) | ScanState::Awaiting(i) | ScanState::Advancing(i) => {
                SCAN_ORDER.get(*i as usize).copied()
            }
            _ => None,
        }
    }

    /// Check if a scan is in progress
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ScanState::Scanning(_) | ScanState::Awaiting(_) | ScanState::Advancing(_)
        )
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Done | ScanState::Failed(_))
    }

    /// Process an event and return the next state
    pub fn transition(self, event: ScanEvent) -> Self {
        use ScanEvent::*;
        use ScanState::*;

        match (self, event) {
            (Idle, Start) => Scanning(0),

            (Scanning(i), Requested) => Awaiting(i),
            (Scanning(_), Fail(kind)) => Failed(kind),

            (Awaiting(i), Noise) => Awaiting(i),
            (Awaiting(i), Accepted) => Advancing(i),
            (Awaiting(_), Fail(kind)) => Failed(kind),

            (Advancing(i), Advance) if (i as usize) + 1 < SCAN_ORDER.len() => Scanning(i + 1),
            (Advancing(_), Advance) => Done,
            (Advancing(_), Fail(kind)) => Failed(kind),

            (Done, Reset) | (Failed(_), Reset) => Idle,
            (Done, Start) | (Failed(_), Start) => Scanning(0),

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_scan_flow() {
        let mut state = ScanState::Idle.transition(ScanEvent::Start);
        for (i, face) in SCAN_ORDER.iter().enumerate() {
            assert_eq!(state, ScanState::Scanning(i as u8));
            assert_eq!(state.face(), Some(*face));
            state = state.transition(ScanEvent::Requested);
            state = state.transition(ScanEvent::Noise);
            assert_eq!(state, ScanState::Awaiting(i as u8));
            state = state.transition(ScanEvent::Accepted);
            assert_eq!(state, ScanState::Advancing(i as u8));
            state = state.transition(ScanEvent::Advance);
        }
        assert_eq!(state, ScanState::Done);
        assert!(state.is_terminal());
        assert_eq!(state.face(), None);
    }

    #[test]
    fn test_failure_from_active_states() {
        let states = [
            ScanState::Scanning(0),
            ScanState::Awaiting(2),
            ScanState::Advancing(5),
        ];

        for state in states {
            assert!(state.is_active());
            let next = state.transition(ScanEvent::Fail(FailureKind::Rejected));
            assert_eq!(next, ScanState::Failed(FailureKind::Rejected));
        }
    }

    #[test]
    fn test_out_of_order_events_are_ignored() {
        assert_eq!(ScanState::Idle.transition(ScanEvent::Accepted), ScanState::Idle);
        assert_eq!(
            ScanState::Scanning(1).transition(ScanEvent::Accepted),
            ScanState::Scanning(1)
        );
        assert_eq!(
            ScanState::Awaiting(1).transition(ScanEvent::Advance),
            ScanState::Awaiting(1)
        );
        assert_eq!(ScanState::Idle.transition(ScanEvent::Fail(FailureKind::Timeout)), ScanState::Idle);
    }

    #[test]
    fn test_terminal_states_restart() {
        let failed = ScanState::Failed(FailureKind::Timeout);
        assert_eq!(failed.transition(ScanEvent::Reset), ScanState::Idle);
        assert_eq!(failed.transition(ScanEvent::Start), ScanState::Scanning(0));
        assert_eq!(ScanState::Done.transition(ScanEvent::Reset), ScanState::Idle);
        assert_eq!(
            ScanState::Done.transition(ScanEvent::Fail(FailureKind::Protocol)),
            ScanState::Done
        );
    }
}

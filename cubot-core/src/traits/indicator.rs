//! Operator feedback trait

/// Feedback shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cue {
    /// Homing done, robot ready
    Ready,
    /// High-level task finished
    Success,
    /// High-level task aborted
    Failure,
}

/// Trait for the light matrix / speaker on the hub
pub trait Indicator {
    fn show(&mut self, cue: Cue);
}

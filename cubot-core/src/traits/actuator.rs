//! Actuator trait
//!
//! The robot has two mechanisms that matter to the planner:
//! - a turntable under the cube, driven through a gear train
//! - a grabbing arm that either holds the top two layers (so a turntable
//!   move turns the bottom face) or swings over to tilt the cube
//!
//! Every call blocks until the motion has finished.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Turning sense of the turntable, seen from above
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Sense {
    /// Clockwise rotation
    Clockwise,
    /// Counter-clockwise rotation
    CounterClockwise,
}

impl Sense {
    /// Get the opposite sense
    pub fn opposite(self) -> Self {
        match self {
            Sense::Clockwise => Sense::CounterClockwise,
            Sense::CounterClockwise => Sense::Clockwise,
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Clockwise => f.write_str("clockwise"),
            Sense::CounterClockwise => f.write_str("counterclockwise"),
        }
    }
}

/// Errors that can occur with motor operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuationError {
    /// Motor stalled before reaching its target
    Stalled,
    /// Target position is outside the mechanism's travel
    Unreachable,
    /// Motor is not connected or not responding
    Disconnected,
}

impl fmt::Display for ActuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuationError::Stalled => f.write_str("motor stalled"),
            ActuationError::Unreachable => f.write_str("position unreachable"),
            ActuationError::Disconnected => f.write_str("motor disconnected"),
        }
    }
}

/// Trait for the robot's motion primitives
///
/// Implementations wrap the hub's motor API (or a simulator). Positions and
/// distances are in motor degrees; gearing is applied by the caller.
pub trait Actuator {
    /// Rotate the turntable by `degrees` in the given sense
    fn rotate_turntable(&mut self, sense: Sense, degrees: u32) -> Result<(), ActuationError>;

    /// Move the grabbing arm to `position` relative to its home position
    fn run_grab_arm_to(&mut self, position: i16, speed: u8) -> Result<(), ActuationError>;

    /// Wait for a mechanism to settle
    fn settle(&mut self, ms: u32);

    /// Find the home position of every mechanism
    ///
    /// Arms are driven against their end stops; the turntable's current
    /// position becomes its home.
    fn home(&mut self) -> Result<(), ActuationError>;
}

//! Configuration type definitions
//!
//! These types represent the robot configuration. Every field has a default,
//! so a configuration file only needs the values that differ.

use crate::motion::LashPolicy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Motor degrees per turntable degree on the reference robot (24/8 gears)
pub const DEFAULT_GEAR_RATIO: u16 = 3;

/// Degrees of one quarter turn of the cube
pub const QUARTER_TURN_DEGREES: u32 = 90;

/// Grabbing arm positions and speeds
///
/// Positions are motor degrees relative to the arm's home (fully open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArmConfig {
    /// Resting position, clear of the cube
    pub rest: i16,
    /// Holding the top two layers
    pub grab: i16,
    /// Far end of the tilt swing
    pub tilt_over: i16,
    /// Overshoot on the way back from a tilt
    pub tilt_back: i16,
    /// Default arm speed (percent)
    pub speed: u8,
    /// Speed of the return swing of a tilt (percent)
    pub tilt_back_speed: u8,
    /// Speed when moving to rest (percent)
    pub rest_speed: u8,
    /// Pause at both ends of a tilt (ms)
    pub settle_ms: u32,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            rest: 0,
            grab: -75,
            tilt_over: -155,
            tilt_back: -55,
            speed: 70,
            tilt_back_speed: 100,
            rest_speed: 40,
            settle_ms: 50,
        }
    }
}

/// Backlash compensation for bottom-face turns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LashConfig {
    /// When pre-travel is inserted
    pub policy: LashPolicy,
    /// Pre-travel in cube degrees
    pub extra_degrees: u16,
    /// Additional pre-travel on a reversal (`Preload` only), cube degrees
    pub reversal_degrees: u16,
}

impl Default for LashConfig {
    fn default() -> Self {
        Self {
            policy: LashPolicy::SameSense,
            extra_degrees: 19,
            reversal_degrees: 3,
        }
    }
}

/// Camera host link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Longest wait for one response line (ms)
    pub response_timeout_ms: u32,
    /// Noise lines tolerated while waiting for one response
    pub max_ignored_lines: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: 10_000,
            max_ignored_lines: 16,
        }
    }
}

/// Complete robot configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RobotConfig {
    /// Motor degrees per turntable degree
    pub gear_ratio: u16,
    /// Turntable speed (percent)
    pub turntable_speed: u8,
    /// Grabbing arm
    pub arm: ArmConfig,
    /// Backlash compensation
    pub lash: LashConfig,
    /// Camera host link
    pub link: LinkConfig,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            gear_ratio: DEFAULT_GEAR_RATIO,
            turntable_speed: 80,
            arm: ArmConfig::default(),
            lash: LashConfig::default(),
            link: LinkConfig::default(),
        }
    }
}

impl RobotConfig {
    /// Motor degrees for `quarters` quarter turns of the cube
    pub fn turn_degrees(&self, quarters: u8) -> u32 {
        QUARTER_TURN_DEGREES * quarters as u32 * self.gear_ratio as u32
    }

    /// Motor degrees for a distance given in cube degrees
    pub fn motor_degrees(&self, cube_degrees: u16) -> u32 {
        cube_degrees as u32 * self.gear_ratio as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_robot_distances() {
        let config = RobotConfig::default();
        assert_eq!(config.turn_degrees(1), 270);
        assert_eq!(config.turn_degrees(2), 540);
        assert_eq!(config.motor_degrees(config.lash.extra_degrees), 57);
    }

    #[test]
    fn test_gear_ratio_scales_turns() {
        let config = RobotConfig {
            gear_ratio: 1,
            ..RobotConfig::default()
        };
        assert_eq!(config.turn_degrees(1), 90);
        assert_eq!(config.motor_degrees(3), 3);
    }

    #[test]
    fn test_arm_defaults() {
        let arm = ArmConfig::default();
        assert!(arm.tilt_over < arm.grab);
        assert!(arm.grab < arm.tilt_back);
        assert!(arm.tilt_back < arm.rest);
    }
}

//! Backlash compensation for the turntable
//!
//! The gear train between the motor and the turntable has slack. Depending
//! on the previous motion, a turn may spend part of its travel taking up that
//! slack and stop short. The compensator overshoots by a fixed distance and
//! then backs off, so the net displacement is exactly the requested one.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::RobotConfig;
use crate::traits::{ActuationError, Actuator, Sense};

/// When pre-travel is inserted before a bottom-face turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LashPolicy {
    /// Never compensate
    Disabled,
    /// Compensate when the previous turntable motion had the same sense
    #[default]
    SameSense,
    /// Compensate when the previous turntable motion had the opposite sense
    OppositeSense,
    /// Always compensate, with extra travel after a reversal
    Preload,
}

impl fmt::Display for LashPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LashPolicy::Disabled => f.write_str("disabled"),
            LashPolicy::SameSense => f.write_str("same-sense"),
            LashPolicy::OppositeSense => f.write_str("opposite-sense"),
            LashPolicy::Preload => f.write_str("preload"),
        }
    }
}

/// Motions for one compensated turn, in motor degrees
///
/// The turntable runs `travel` in the requested sense, then `retract` in the
/// opposite sense. `travel - retract` is always the requested distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TurnPlan {
    pub sense: Sense,
    pub travel: u32,
    pub retract: u32,
}

impl TurnPlan {
    /// Net displacement of the plan
    pub fn net(&self) -> u32 {
        self.travel - self.retract
    }

    /// Returns true if the plan overshoots
    pub fn is_compensated(&self) -> bool {
        self.retract > 0
    }
}

/// Tracks the sense of the last bottom-face turn and plans compensated turns
///
/// Only `turn` updates the memory; whole-cube rotations leave it alone.
#[derive(Debug, Clone)]
pub struct LashCompensator {
    policy: LashPolicy,
    /// Pre-travel in motor degrees
    extra: u32,
    /// Additional pre-travel on a reversal, motor degrees
    reversal: u32,
    last: Option<Sense>,
}

impl LashCompensator {
    /// Create a compensator with distances given in motor degrees
    pub fn new(policy: LashPolicy, extra: u32, reversal: u32) -> Self {
        Self {
            policy,
            extra,
            reversal,
            last: None,
        }
    }

    /// Create a compensator from the robot configuration
    pub fn from_config(config: &RobotConfig) -> Self {
        Self::new(
            config.lash.policy,
            config.motor_degrees(config.lash.extra_degrees),
            config.motor_degrees(config.lash.reversal_degrees),
        )
    }

    pub fn policy(&self) -> LashPolicy {
        self.policy
    }

    /// Sense of the last bottom-face turn
    pub fn last(&self) -> Option<Sense> {
        self.last
    }

    /// Forget the last sense (after homing)
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Plan a turn of `degrees` motor degrees without executing it
    pub fn plan(&self, sense: Sense, degrees: u32) -> TurnPlan {
        let extra = match (self.policy, self.last) {
            (LashPolicy::Disabled, _) => 0,
            (LashPolicy::SameSense, Some(last)) if last == sense => self.extra,
            (LashPolicy::OppositeSense, Some(last)) if last != sense => self.extra,
            (LashPolicy::Preload, Some(last)) if last != sense => self.extra + self.reversal,
            (LashPolicy::Preload, _) => self.extra,
            _ => 0,
        };
        TurnPlan {
            sense,
            travel: degrees + extra,
            retract: extra,
        }
    }

    /// Execute a compensated turn and record its sense
    pub fn turn<A: Actuator>(
        &mut self,
        actuator: &mut A,
        sense: Sense,
        degrees: u32,
    ) -> Result<TurnPlan, ActuationError> {
        let plan = self.plan(sense, degrees);
        if plan.is_compensated() {
            trace!("lash: overshoot {} by {}", sense, plan.retract);
        }
        actuator.rotate_turntable(plan.sense, plan.travel)?;
        if plan.is_compensated() {
            actuator.rotate_turntable(plan.sense.opposite(), plan.retract)?;
        }
        self.last = Some(sense);
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Motion, SimActuator};

    const QUARTER: u32 = 270;

    fn same_sense() -> LashCompensator {
        LashCompensator::from_config(&RobotConfig::default())
    }

    /// Run one bottom turn on a throwaway actuator
    fn turned(lash: &mut LashCompensator, sense: Sense) {
        lash.turn(&mut SimActuator::new(), sense, QUARTER).unwrap();
    }

    #[test]
    fn test_first_turn_is_plain() {
        let lash = same_sense();
        let plan = lash.plan(Sense::Clockwise, QUARTER);
        assert_eq!(plan.travel, QUARTER);
        assert!(!plan.is_compensated());
    }

    #[test]
    fn test_same_sense_sequence() {
        let mut lash = same_sense();
        let mut actuator = SimActuator::new();

        lash.turn(&mut actuator, Sense::Clockwise, QUARTER).unwrap();
        lash.turn(&mut actuator, Sense::Clockwise, QUARTER).unwrap();
        lash.turn(&mut actuator, Sense::CounterClockwise, QUARTER).unwrap();

        assert_eq!(
            actuator.motions(),
            &[
                Motion::Turntable(Sense::Clockwise, 270),
                Motion::Turntable(Sense::Clockwise, 327),
                Motion::Turntable(Sense::CounterClockwise, 57),
                Motion::Turntable(Sense::CounterClockwise, 270),
            ]
        );
        assert_eq!(lash.last(), Some(Sense::CounterClockwise));
    }

    #[test]
    fn test_opposite_sense_policy() {
        let mut lash = LashCompensator::new(LashPolicy::OppositeSense, 57, 9);
        assert!(!lash.plan(Sense::Clockwise, QUARTER).is_compensated());
        turned(&mut lash, Sense::Clockwise);
        assert!(!lash.plan(Sense::Clockwise, QUARTER).is_compensated());
        let plan = lash.plan(Sense::CounterClockwise, QUARTER);
        assert_eq!(plan.travel, 327);
        assert_eq!(plan.retract, 57);
    }

    #[test]
    fn test_preload_policy() {
        let mut lash = LashCompensator::new(LashPolicy::Preload, 57, 9);
        assert_eq!(lash.plan(Sense::Clockwise, QUARTER).retract, 57);
        turned(&mut lash, Sense::Clockwise);
        assert_eq!(lash.plan(Sense::Clockwise, QUARTER).retract, 57);
        assert_eq!(lash.plan(Sense::CounterClockwise, QUARTER).retract, 66);
    }

    #[test]
    fn test_disabled_policy() {
        let mut lash = LashCompensator::new(LashPolicy::Disabled, 57, 9);
        turned(&mut lash, Sense::Clockwise);
        let plan = lash.plan(Sense::Clockwise, QUARTER);
        assert_eq!(plan.travel, QUARTER);
        assert_eq!(plan.retract, 0);
    }

    #[test]
    fn test_reset_forgets_sense() {
        let mut lash = same_sense();
        turned(&mut lash, Sense::Clockwise);
        lash.reset();
        assert_eq!(lash.last(), None);
        assert!(!lash.plan(Sense::Clockwise, QUARTER).is_compensated());
    }

    #[test]
    fn test_failed_turn_keeps_previous_sense() {
        let mut lash = same_sense();
        let mut actuator = SimActuator::new();
        turned(&mut lash, Sense::CounterClockwise);
        actuator.fail_on(1, ActuationError::Stalled);
        assert_eq!(
            lash.turn(&mut actuator, Sense::Clockwise, QUARTER),
            Err(ActuationError::Stalled)
        );
        assert_eq!(lash.last(), Some(Sense::CounterClockwise));
    }

    proptest::proptest! {
        #[test]
        fn prop_net_displacement_is_requested(
            policy in proptest::sample::select(vec![
                LashPolicy::Disabled,
                LashPolicy::SameSense,
                LashPolicy::OppositeSense,
                LashPolicy::Preload,
            ]),
            history in proptest::collection::vec(proptest::bool::ANY, 0..8),
            degrees in 0u32..2000,
        ) {
            let mut lash = LashCompensator::new(policy, 57, 9);
            for clockwise in history {
                let sense = if clockwise { Sense::Clockwise } else { Sense::CounterClockwise };
                let plan = lash.plan(sense, degrees);
                proptest::prop_assert_eq!(plan.net(), degrees);
                lash.turn(&mut SimActuator::new(), sense, degrees).unwrap();
            }
        }
    }
}

//! Motion planning
//!
//! Turning logical moves into turntable and arm motions, with backlash
//! compensation for the turntable's gear train.

pub mod lash;
pub mod planner;

pub use lash::{LashCompensator, LashPolicy, TurnPlan};
pub use planner::{MovePlanner, PlanError};

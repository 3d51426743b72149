//! Hardware abstraction traits
//!
//! These traits define the interface between the planning logic and the
//! robot's motors, its serial link to the camera host, and its operator
//! feedback (light matrix and speaker).

pub mod actuator;
pub mod indicator;
pub mod link;

pub use actuator::{ActuationError, Actuator, Sense};
pub use indicator::{Cue, Indicator};
pub use link::{Link, LinkError};

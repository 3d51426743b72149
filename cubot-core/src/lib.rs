//! Board-agnostic core logic for the cube solving robot
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Facelet model of the cube, driven by permutation tables
//! - Orientation-aware move planning with backlash compensation
//! - Scan state machine and driver
//! - Command/response exchange with the camera host
//! - Hardware abstraction traits (actuator, link, indicator) and simulators
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod config;
pub mod controller;
pub mod cube;
pub mod exchange;
pub mod motion;
pub mod scan;
pub mod sim;
pub mod state;
pub mod traits;

pub use controller::{Cubot, RobotError};

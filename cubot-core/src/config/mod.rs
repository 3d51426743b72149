//! Configuration types
//!
//! Board-agnostic robot configuration. The defaults describe the reference
//! robot; hosts load overrides from TOML.

pub mod types;

pub use types::*;

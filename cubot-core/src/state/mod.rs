//! Scan state machine
//!
//! Tracks progress through the six faces of a scan.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::ScanEvent;
pub use machine::{FailureKind, ScanState};

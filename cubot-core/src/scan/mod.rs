//! Face scanning
//!
//! Walks the cube through the six positions the camera needs and asks the
//! host to capture each face.

pub mod driver;

pub use driver::{ScanDriver, ScanError};

use crate::cube::Face;

/// Faces in the order they are imaged
///
/// Each face is shown to the camera by putting its opposite face down.
pub const SCAN_ORDER: [Face; 6] = [Face::L, Face::F, Face::D, Face::R, Face::B, Face::U];

/// Number of faces a scan visits
pub const SCAN_STEPS: usize = SCAN_ORDER.len();

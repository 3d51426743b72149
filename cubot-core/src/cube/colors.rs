//! Sticker colors and detection assembly
//!
//! The camera host reports each face as nine color letters. Colors are mapped
//! back to faces through the center stickers, which never move relative to
//! each other, so the result does not depend on the cube's color scheme.

use core::fmt;

use super::{
    frame_map, CubeError, Direction, Face, FaceletString, Orientation, FACE_COUNT, FACE_SIZE,
};

/// Sticker color, in the order of the standard color scheme
///
/// `Color::ALL[v]` is the color of face value `v` on a cube in the scheme
/// (white up, red right, green front).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    White,
    Red,
    Green,
    Yellow,
    Orange,
    Blue,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::White,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Orange,
        Color::Blue,
    ];

    pub const fn letter(self) -> char {
        match self {
            Color::White => 'W',
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Yellow => 'Y',
            Color::Orange => 'O',
            Color::Blue => 'B',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.letter() == letter)
    }

    /// Color of a face value in the standard scheme
    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Parse nine color letters, ignoring whitespace
fn parse_stickers(face: Face, letters: &str) -> Result<[Color; FACE_SIZE], CubeError> {
    let mut stickers = [Color::White; FACE_SIZE];
    let mut count = 0;
    for letter in letters.chars().filter(|c| !c.is_whitespace()) {
        if count == FACE_SIZE {
            return Err(CubeError::InvalidColor { face, index: count });
        }
        stickers[count] =
            Color::from_letter(letter).ok_or(CubeError::InvalidColor { face, index: count })?;
        count += 1;
    }
    if count != FACE_SIZE {
        return Err(CubeError::InvalidColor { face, index: count });
    }
    Ok(stickers)
}

/// Collects per-face detections and builds the 54-facelet configuration
#[derive(Debug, Clone, Default)]
pub struct FaceletAssembler {
    faces: [Option<[Color; FACE_SIZE]>; FACE_COUNT],
}

impl FaceletAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every recorded face
    pub fn clear(&mut self) {
        self.faces = [None; FACE_COUNT];
    }

    /// Record the nine stickers of one face, row-major in the face's own layout
    ///
    /// Whitespace between letters is ignored.
    pub fn record(&mut self, face: Face, letters: &str) -> Result<(), CubeError> {
        self.faces[face.index()] = Some(parse_stickers(face, letters)?);
        Ok(())
    }

    /// Record the stickers the camera saw on the up face while the cube had
    /// `orientation`
    ///
    /// The letters are row-major in the robot's frame at capture time. They
    /// are stored under the logical face that was up, turned back into that
    /// face's own layout.
    pub fn record_captured(
        &mut self,
        orientation: Orientation,
        letters: &str,
    ) -> Result<(), CubeError> {
        let face = orientation[Direction::Up.index()];
        let seen = parse_stickers(face, letters)?;
        let map = frame_map(orientation)?;
        let base = face.index() * FACE_SIZE;

        let mut stickers = [Color::White; FACE_SIZE];
        for (position, color) in seen.into_iter().enumerate() {
            // The up block always holds the facelets of the face that is up
            let slot = (map[position] as usize)
                .checked_sub(base)
                .filter(|&slot| slot < FACE_SIZE)
                .ok_or(CubeError::UnreachableOrientation)?;
            stickers[slot] = color;
        }
        self.faces[face.index()] = Some(stickers);
        Ok(())
    }

    /// Returns true once all six faces are recorded
    pub fn is_complete(&self) -> bool {
        self.faces.iter().all(Option::is_some)
    }

    /// Build the configuration in `U R F D L B` letters
    pub fn assemble(&self) -> Result<FaceletString, CubeError> {
        let mut faces = [[Color::White; FACE_SIZE]; FACE_COUNT];
        for face in Face::ALL {
            faces[face.index()] = self.faces[face.index()].ok_or(CubeError::IncompleteScan { face })?;
        }

        let mut centers = [Color::White; FACE_COUNT];
        for (center, stickers) in centers.iter_mut().zip(faces.iter()) {
            *center = stickers[FACE_SIZE / 2];
        }
        for (i, a) in centers.iter().enumerate() {
            if centers[i + 1..].contains(a) {
                return Err(CubeError::InconsistentColors);
            }
        }

        let mut counts = [0usize; FACE_COUNT];
        let mut out = FaceletString::new();
        for stickers in faces.iter() {
            for color in stickers {
                // Every color is one of the six distinct centers
                let index = centers.iter().position(|c| c == color).ok_or(CubeError::InconsistentColors)?;
                counts[index] += 1;
                let _ = out.push(Face::ALL[index].letter());
            }
        }
        if counts.iter().any(|&n| n != FACE_SIZE) {
            return Err(CubeError::UnbalancedFacelets);
        }
        Ok(out)
    }
}

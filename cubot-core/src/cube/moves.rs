//! Move grammar
//!
//! A move token is a face letter (`U R F D L B`) or a whole-cube rotation
//! axis (`x y z`) followed by an optional modifier: none (quarter turn),
//! `'` (quarter turn the other way) or `2` (half turn). That gives 27 tokens,
//! backed by 18 quarter-move tables; half turns expand to two quarter moves.

use core::fmt;

use heapless::Vec;

use super::{token, CubeError, Token};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of tokens in one move string
pub const MAX_SEQUENCE_LEN: usize = 128;

/// Logical cube face
///
/// The discriminant is the face index used by the facelet array and by the
/// wire format (`U R F D L B` blocks in that order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Face {
    U = 0,
    R = 1,
    F = 2,
    D = 3,
    L = 4,
    B = 5,
}

impl Face {
    /// All faces in facelet-array order
    pub const ALL: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    /// Index of this face in the facelet array (0-5)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Face with the given index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Wire letter of this face
    pub const fn letter(self) -> char {
        match self {
            Face::U => 'U',
            Face::R => 'R',
            Face::F => 'F',
            Face::D => 'D',
            Face::L => 'L',
            Face::B => 'B',
        }
    }

    /// Parse a face from its wire letter
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|face| face.letter() == letter)
    }

    /// The face on the other side of the cube
    pub const fn opposite(self) -> Self {
        match self {
            Face::U => Face::D,
            Face::R => Face::L,
            Face::F => Face::B,
            Face::D => Face::U,
            Face::L => Face::R,
            Face::B => Face::F,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Whole-cube rotation axis
///
/// `x` follows `R`, `y` follows `U` and `z` follows `F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub const fn letter(self) -> char {
        match self {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|axis| axis.letter() == letter)
    }
}

/// What a move turns: one face layer, or the whole cube
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layer {
    Face(Face),
    Rotation(Axis),
}

impl Layer {
    pub const fn letter(self) -> char {
        match self {
            Layer::Face(face) => face.letter(),
            Layer::Rotation(axis) => axis.letter(),
        }
    }
}

/// Move modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Modifier {
    /// Quarter turn, clockwise looking at the face
    Quarter,
    /// Quarter turn, counter-clockwise (`'`)
    Prime,
    /// Half turn (`2`), executed as two clockwise quarter turns
    Double,
}

/// One table-backed quarter move (18 in total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuarterMove {
    pub layer: Layer,
    pub prime: bool,
}

impl QuarterMove {
    /// Index into the facelet tables
    ///
    /// Faces occupy 0-11 (`U U' R R' ...`), rotations 12-17 (`x x' y y' z z'`).
    pub const fn table_index(self) -> usize {
        let base = match self.layer {
            Layer::Face(face) => face.index() * 2,
            Layer::Rotation(axis) => 12 + axis as usize * 2,
        };
        base + self.prime as usize
    }

    /// Index into the orientation tables, for rotations only
    pub const fn orientation_index(self) -> Option<usize> {
        match self.layer {
            Layer::Face(_) => None,
            Layer::Rotation(axis) => Some(axis as usize * 2 + self.prime as usize),
        }
    }
}

/// A parsed move token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Move {
    pub layer: Layer,
    pub modifier: Modifier,
}

impl Move {
    pub const fn new(layer: Layer, modifier: Modifier) -> Self {
        Self { layer, modifier }
    }

    /// A face turn
    pub const fn face(face: Face, modifier: Modifier) -> Self {
        Self::new(Layer::Face(face), modifier)
    }

    /// A whole-cube rotation
    pub const fn rotation(axis: Axis, modifier: Modifier) -> Self {
        Self::new(Layer::Rotation(axis), modifier)
    }

    /// Parse a single token such as `R`, `U'`, `F2` or `y'`
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let letter = chars.next()?;
        let layer = match (Face::from_letter(letter), Axis::from_letter(letter)) {
            (Some(face), _) => Layer::Face(face),
            (None, Some(axis)) => Layer::Rotation(axis),
            (None, None) => return None,
        };
        let modifier = match chars.next() {
            None => Modifier::Quarter,
            Some('\'') => Modifier::Prime,
            Some('2') => Modifier::Double,
            Some(_) => return None,
        };
        if chars.next().is_some() {
            return None;
        }
        Some(Self::new(layer, modifier))
    }

    /// The move that undoes this one
    pub const fn inverse(self) -> Self {
        let modifier = match self.modifier {
            Modifier::Quarter => Modifier::Prime,
            Modifier::Prime => Modifier::Quarter,
            Modifier::Double => Modifier::Double,
        };
        Self::new(self.layer, modifier)
    }

    /// Returns true for whole-cube rotations
    pub const fn is_rotation(self) -> bool {
        matches!(self.layer, Layer::Rotation(_))
    }

    /// The face this move turns, if it is a face turn
    pub const fn turned_face(self) -> Option<Face> {
        match self.layer {
            Layer::Face(face) => Some(face),
            Layer::Rotation(_) => None,
        }
    }

    /// Expand into a quarter move and how many times to apply it
    pub const fn quarters(self) -> (QuarterMove, u8) {
        match self.modifier {
            Modifier::Quarter => (QuarterMove { layer: self.layer, prime: false }, 1),
            Modifier::Prime => (QuarterMove { layer: self.layer, prime: true }, 1),
            Modifier::Double => (QuarterMove { layer: self.layer, prime: false }, 2),
        }
    }

    /// Token text, for error reports
    pub fn token(self) -> Token {
        let mut out = Token::new();
        // A token is at most two characters
        let _ = out.push(self.layer.letter());
        match self.modifier {
            Modifier::Quarter => {}
            Modifier::Prime => {
                let _ = out.push('\'');
            }
            Modifier::Double => {
                let _ = out.push('2');
            }
        }
        out
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.layer.letter())?;
        match self.modifier {
            Modifier::Quarter => Ok(()),
            Modifier::Prime => write!(f, "'"),
            Modifier::Double => write!(f, "2"),
        }
    }
}

/// A validated move string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveSequence {
    moves: Vec<Move, MAX_SEQUENCE_LEN>,
}

impl MoveSequence {
    pub fn new() -> Self {
        Self { moves: Vec::new() }
    }

    /// Parse a whitespace-separated move string
    ///
    /// Every token is validated before anything is returned; the first illegal
    /// token is named in the error.
    pub fn parse(text: &str) -> Result<Self, CubeError> {
        let mut moves = Vec::new();
        for word in text.split_whitespace() {
            let mv = Move::parse(word).ok_or_else(|| CubeError::InvalidMove {
                token: token(word),
            })?;
            moves.push(mv).map_err(|_| CubeError::SequenceTooLong)?;
        }
        Ok(Self { moves })
    }

    /// Parse a move string from the solver, which only ever turns faces
    pub fn parse_face_turns(text: &str) -> Result<Self, CubeError> {
        let sequence = Self::parse(text)?;
        if let Some(mv) = sequence.moves.iter().find(|mv| mv.is_rotation()) {
            return Err(CubeError::InvalidMove { token: mv.token() });
        }
        Ok(sequence)
    }

    pub fn push(&mut self, mv: Move) -> Result<(), CubeError> {
        self.moves.push(mv).map_err(|_| CubeError::SequenceTooLong)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.moves.iter().copied()
    }

    /// Number of single quarter-move applications after expanding half turns
    pub fn quarter_count(&self) -> usize {
        self.moves.iter().map(|mv| mv.quarters().1 as usize).sum()
    }

    /// The sequence that undoes this one
    pub fn inverse(&self) -> Self {
        let mut moves = Vec::new();
        for mv in self.moves.iter().rev() {
            // Same length as self, cannot overflow
            let _ = moves.push(mv.inverse());
        }
        Self { moves }
    }
}

impl fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mv) in self.moves.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", mv)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_tokens() {
        let mut count = 0;
        for letter in ['U', 'R', 'F', 'D', 'L', 'B', 'x', 'y', 'z'] {
            for suffix in ["", "'", "2"] {
                let mut text = heapless::String::<4>::new();
                text.push(letter).unwrap();
                text.push_str(suffix).unwrap();
                let mv = Move::parse(&text).unwrap();
                assert_eq!(format!("{}", mv), text.as_str());
                count += 1;
            }
        }
        assert_eq!(count, 27);
    }

    #[test]
    fn test_parse_rejects_illegal_tokens() {
        for text in ["", "u", "X", "M", "R3", "R''", "R2'", "RU", "E"] {
            assert_eq!(Move::parse(text), None, "{text}");
        }
    }

    #[test]
    fn test_inverse() {
        let r = Move::face(Face::R, Modifier::Quarter);
        assert_eq!(r.inverse(), Move::face(Face::R, Modifier::Prime));
        assert_eq!(r.inverse().inverse(), r);
        let y2 = Move::rotation(Axis::Y, Modifier::Double);
        assert_eq!(y2.inverse(), y2);
    }

    #[test]
    fn test_quarters() {
        let (q, n) = Move::parse("F2").unwrap().quarters();
        assert_eq!(q, QuarterMove { layer: Layer::Face(Face::F), prime: false });
        assert_eq!(n, 2);
        let (q, n) = Move::parse("z'").unwrap().quarters();
        assert!(q.prime);
        assert_eq!(n, 1);
    }

    #[test]
    fn test_table_indices_are_distinct() {
        let mut seen = [false; 18];
        for face in Face::ALL {
            for prime in [false, true] {
                let q = QuarterMove { layer: Layer::Face(face), prime };
                assert!(q.orientation_index().is_none());
                seen[q.table_index()] = true;
            }
        }
        for axis in Axis::ALL {
            for prime in [false, true] {
                let q = QuarterMove { layer: Layer::Rotation(axis), prime };
                assert_eq!(q.orientation_index(), Some(q.table_index() - 12));
                seen[q.table_index()] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_face_opposites() {
        for face in Face::ALL {
            assert_ne!(face.opposite(), face);
            assert_eq!(face.opposite().opposite(), face);
            assert_eq!(Face::from_index(face.index()), Some(face));
            assert_eq!(Face::from_letter(face.letter()), Some(face));
        }
    }

    #[test]
    fn test_sequence_names_first_offender() {
        let err = MoveSequence::parse("R U Q R' W").unwrap_err();
        assert_eq!(err, CubeError::InvalidMove { token: token("Q") });
    }

    #[test]
    fn test_sequence_expands_doubles() {
        let sequence = MoveSequence::parse("R2 U x2 D'").unwrap();
        assert_eq!(sequence.len(), 4);
        assert_eq!(sequence.quarter_count(), 6);
        assert_eq!(format!("{}", sequence), "R2 U x2 D'");
        assert_eq!(format!("{}", sequence.inverse()), "D x2 U' R2");
    }

    #[test]
    fn test_face_turns_reject_rotations() {
        assert!(MoveSequence::parse_face_turns("R U2 F'").is_ok());
        assert_eq!(
            MoveSequence::parse_face_turns("R y U").unwrap_err(),
            CubeError::InvalidMove { token: token("y") }
        );
    }

    #[test]
    fn test_sequence_too_long() {
        let mut text = std::string::String::new();
        for _ in 0..=MAX_SEQUENCE_LEN {
            text.push_str("R ");
        }
        assert_eq!(MoveSequence::parse(&text), Err(CubeError::SequenceTooLong));
    }
}

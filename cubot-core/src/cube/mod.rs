//! Facelet state model
//!
//! The cube is kept as 54 facelet values in the physical frame of the robot:
//! block 0 is whatever currently points up, block 3 whatever points down.
//! Next to it sits the orientation mapping, which records which logical face
//! currently occupies each physical direction.
//!
//! Both are mutated only by gathering through the transformation tables.
//! Face turns touch the facelets alone; whole-cube rotations move facelets
//! and relabel directions together.

pub mod colors;
pub mod moves;
pub mod tables;

use core::fmt;

use heapless::String;

pub use colors::{Color, FaceletAssembler};
pub use moves::{Axis, Face, Layer, Modifier, Move, MoveSequence, QuarterMove, MAX_SEQUENCE_LEN};

use tables::{FACELET_TABLES, ORIENTATION_TABLES};

/// Number of facelets on the cube
pub const NUM_FACELETS: usize = 54;

/// Number of facelets on one face
pub const FACE_SIZE: usize = 9;

/// Number of faces (and of physical directions)
pub const FACE_COUNT: usize = 6;

/// Longest move token kept in an error
pub const MAX_TOKEN_LEN: usize = 8;

/// Offending input named by an error, truncated to `MAX_TOKEN_LEN`
pub type Token = String<MAX_TOKEN_LEN>;

/// 54-letter wire form of a configuration
pub type FaceletString = String<NUM_FACELETS>;

/// Logical face at each physical direction, indexed by `Direction::index`
pub type Orientation = [Face; FACE_COUNT];

/// Orientation of a freshly reset cube
pub const IDENTITY_ORIENTATION: Orientation = Face::ALL;

/// Copy as much of `text` as fits into a token
pub(crate) fn token(text: &str) -> Token {
    let mut out = Token::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Errors raised by the model and by move parsing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CubeError {
    /// A single token passed to `apply_token` is not a legal move
    UnknownMove { token: Token },
    /// A move string contains an illegal token (the first one is named)
    InvalidMove { token: Token },
    /// A move string has more tokens than a sequence can hold
    SequenceTooLong,
    /// Direction name is not one of up/right/front/down/left/back
    InvalidDirection { name: Token },
    /// Configuration does not have exactly 54 facelets
    InvalidLength { len: usize },
    /// Configuration letter is not a face letter
    InvalidFacelet { index: usize },
    /// Configuration does not hold 9 facelets of every face
    UnbalancedFacelets,
    /// Detected sticker letter is not a color letter
    InvalidColor { face: Face, index: usize },
    /// A face has not been detected yet
    IncompleteScan { face: Face },
    /// Detected centers are not six distinct colors
    InconsistentColors,
    /// Target orientation is not reachable by rotating the cube
    UnreachableOrientation,
}

impl fmt::Display for CubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CubeError::UnknownMove { token } => write!(f, "unknown move '{}'", token),
            CubeError::InvalidMove { token } => write!(f, "invalid move '{}'", token),
            CubeError::SequenceTooLong => {
                write!(f, "move string longer than {} tokens", MAX_SEQUENCE_LEN)
            }
            CubeError::InvalidDirection { name } => write!(f, "invalid direction '{}'", name),
            CubeError::InvalidLength { len } => {
                write!(f, "expected {} facelets, got {}", NUM_FACELETS, len)
            }
            CubeError::InvalidFacelet { index } => write!(f, "invalid facelet at {}", index),
            CubeError::UnbalancedFacelets => write!(f, "every face must appear 9 times"),
            CubeError::InvalidColor { face, index } => {
                write!(f, "invalid color at {}{}", face, index + 1)
            }
            CubeError::IncompleteScan { face } => write!(f, "face {} not detected", face),
            CubeError::InconsistentColors => write!(f, "centers are not six distinct colors"),
            CubeError::UnreachableOrientation => write!(f, "orientation is not a rotation"),
        }
    }
}

/// Physical direction relative to the robot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Up = 0,
    Right = 1,
    Front = 2,
    Down = 3,
    Left = 4,
    Back = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Right,
        Direction::Front,
        Direction::Down,
        Direction::Left,
        Direction::Back,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Front => "front",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Back => "back",
        }
    }

    /// Parse a lower-case direction name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Orientation after a rotation, without touching any facelets
fn rotate_orientation(orientation: &Orientation, table: &[u8; FACE_COUNT]) -> Orientation {
    let mut out = *orientation;
    for (slot, &src) in out.iter_mut().zip(table.iter()) {
        *slot = orientation[src as usize];
    }
    out
}

/// Solved facelet array: value v fills all of block v
const fn solved_facelets() -> [u8; NUM_FACELETS] {
    let mut out = [0u8; NUM_FACELETS];
    let mut i = 0;
    while i < NUM_FACELETS {
        out[i] = (i / FACE_SIZE) as u8;
        i += 1;
    }
    out
}

/// Gather `values` through a facelet table
fn gather(values: &mut [u8; NUM_FACELETS], table: &[u8; NUM_FACELETS]) {
    let old = *values;
    for (slot, &src) in values.iter_mut().zip(table.iter()) {
        *slot = old[src as usize];
    }
}

/// Facelet positions after rotating the whole cube from the identity frame
/// to `target`
///
/// `map[i]` is the identity-frame index of the facelet that then sits at
/// position `i`. This is how a face seen by the camera in the robot's frame
/// is put back into the frame the configuration is named in.
pub fn frame_map(target: Orientation) -> Result<[u8; NUM_FACELETS], CubeError> {
    let rotations = Cube::new().reorient_to(target)?;
    let mut map = [0u8; NUM_FACELETS];
    for (i, slot) in map.iter_mut().enumerate() {
        *slot = i as u8;
    }
    for mv in rotations.iter() {
        let (quarter, times) = mv.quarters();
        for _ in 0..times {
            gather(&mut map, &FACELET_TABLES[quarter.table_index()]);
        }
    }
    Ok(map)
}

/// Rotations tried by `reorient_to`
const REORIENT_MOVES: [Move; 9] = [
    Move::rotation(Axis::X, Modifier::Quarter),
    Move::rotation(Axis::X, Modifier::Prime),
    Move::rotation(Axis::X, Modifier::Double),
    Move::rotation(Axis::Y, Modifier::Quarter),
    Move::rotation(Axis::Y, Modifier::Prime),
    Move::rotation(Axis::Y, Modifier::Double),
    Move::rotation(Axis::Z, Modifier::Quarter),
    Move::rotation(Axis::Z, Modifier::Prime),
    Move::rotation(Axis::Z, Modifier::Double),
];

/// Symbolic cube: facelet values plus physical orientation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cube {
    facelets: [u8; NUM_FACELETS],
    orientation: Orientation,
}

impl Default for Cube {
    fn default() -> Self {
        Self::new()
    }
}

impl Cube {
    /// Create a solved cube in the identity orientation
    pub const fn new() -> Self {
        Self {
            facelets: solved_facelets(),
            orientation: IDENTITY_ORIENTATION,
        }
    }

    /// Return to the solved configuration and identity orientation
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Install a 54-letter configuration (`U R F D L B` letters)
    ///
    /// The orientation mapping is reset to identity. Nothing changes on error.
    pub fn load(&mut self, config: &str) -> Result<(), CubeError> {
        let len = config.chars().count();
        if len != NUM_FACELETS {
            return Err(CubeError::InvalidLength { len });
        }
        let mut values = [0u8; NUM_FACELETS];
        for (index, (slot, letter)) in values.iter_mut().zip(config.chars()).enumerate() {
            let face = Face::from_letter(letter).ok_or(CubeError::InvalidFacelet { index })?;
            *slot = face.index() as u8;
        }
        self.load_values(&values)
    }

    /// Install a configuration given as raw face values (0-5)
    pub fn load_values(&mut self, values: &[u8]) -> Result<(), CubeError> {
        if values.len() != NUM_FACELETS {
            return Err(CubeError::InvalidLength { len: values.len() });
        }
        let mut counts = [0usize; FACE_COUNT];
        for (index, &value) in values.iter().enumerate() {
            let count = counts
                .get_mut(value as usize)
                .ok_or(CubeError::InvalidFacelet { index })?;
            *count += 1;
        }
        if counts.iter().any(|&count| count != FACE_SIZE) {
            return Err(CubeError::UnbalancedFacelets);
        }

        self.facelets.copy_from_slice(values);
        self.orientation = IDENTITY_ORIENTATION;
        Ok(())
    }

    /// Apply one parsed move
    pub fn apply(&mut self, mv: Move) {
        let (quarter, times) = mv.quarters();
        for _ in 0..times {
            self.apply_quarter(quarter);
        }
    }

    /// Apply one move token, failing on anything outside the 27 legal tokens
    pub fn apply_token(&mut self, text: &str) -> Result<(), CubeError> {
        let mv = Move::parse(text).ok_or_else(|| CubeError::UnknownMove { token: token(text) })?;
        self.apply(mv);
        Ok(())
    }

    /// Apply a whitespace-separated move string
    ///
    /// All tokens are validated first; on error the cube is unchanged.
    pub fn apply_sequence(&mut self, moves: &str) -> Result<(), CubeError> {
        let sequence = MoveSequence::parse(moves)?;
        self.apply_moves(&sequence);
        Ok(())
    }

    /// Apply an already validated sequence
    pub fn apply_moves(&mut self, sequence: &MoveSequence) {
        for mv in sequence.iter() {
            self.apply(mv);
        }
    }

    fn apply_quarter(&mut self, quarter: QuarterMove) {
        gather(&mut self.facelets, &FACELET_TABLES[quarter.table_index()]);
        if let Some(index) = quarter.orientation_index() {
            self.orientation = rotate_orientation(&self.orientation, &ORIENTATION_TABLES[index]);
        }
    }

    /// Logical face currently at a physical direction
    pub fn oriented_face(&self, direction: Direction) -> Face {
        self.orientation[direction.index()]
    }

    /// Logical face at a direction given by name (`"up"`, `"front"`, ...)
    pub fn oriented_face_named(&self, name: &str) -> Result<Face, CubeError> {
        let direction =
            Direction::parse(name).ok_or_else(|| CubeError::InvalidDirection { name: token(name) })?;
        Ok(self.oriented_face(direction))
    }

    /// Physical direction currently holding a logical face
    pub fn direction_of(&self, face: Face) -> Direction {
        let index = self.orientation.iter().position(|&f| f == face);
        debug_assert!(index.is_some(), "orientation lost face {:?}", face);
        // The orientation is a bijection, so the fallback is never taken
        let index = index.unwrap_or(Direction::Down.index());
        Direction::ALL[index]
    }

    /// Facelet values in array order
    pub fn facelets(&self) -> &[u8; NUM_FACELETS] {
        &self.facelets
    }

    /// Current orientation mapping
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Face value of one facelet
    pub fn facelet(&self, face: Face, position: usize) -> Option<Face> {
        if position >= FACE_SIZE {
            return None;
        }
        Face::from_index(self.facelets[face.index() * FACE_SIZE + position] as usize)
    }

    /// Returns true if every face shows a single value
    pub fn is_solved(&self) -> bool {
        self.facelets
            .chunks(FACE_SIZE)
            .all(|block| block.iter().all(|&v| v == block[4]))
    }

    /// 54-letter wire form, in array order
    pub fn serialize(&self) -> FaceletString {
        let mut out = FaceletString::new();
        for &value in self.facelets.iter() {
            // Values are 0-5 by construction and the string holds exactly 54 letters
            let letter = Face::from_index(value as usize).map_or('?', Face::letter);
            let _ = out.push(letter);
        }
        out
    }

    /// Rotate the whole cube until the orientation mapping equals `target`
    ///
    /// Used to carry a configuration detected in the identity frame over to
    /// the robot's current physical frame. Returns the rotations applied.
    pub fn reorient_to(&mut self, target: Orientation) -> Result<MoveSequence, CubeError> {
        // Every one of the 24 orientations is at most two of these rotations away
        for len in 0..=2u32 {
            for code in 0..REORIENT_MOVES.len().pow(len) {
                let mut orientation = self.orientation;
                let mut rest = code;
                for _ in 0..len {
                    let (quarter, times) = REORIENT_MOVES[rest % REORIENT_MOVES.len()].quarters();
                    rest /= REORIENT_MOVES.len();
                    if let Some(index) = quarter.orientation_index() {
                        for _ in 0..times {
                            orientation = rotate_orientation(&orientation, &ORIENTATION_TABLES[index]);
                        }
                    }
                }
                if orientation != target {
                    continue;
                }

                let mut applied = MoveSequence::new();
                let mut rest = code;
                for _ in 0..len {
                    let mv = REORIENT_MOVES[rest % REORIENT_MOVES.len()];
                    rest /= REORIENT_MOVES.len();
                    self.apply(mv);
                    applied.push(mv)?;
                }
                return Ok(applied);
            }
        }
        Err(CubeError::UnreachableOrientation)
    }

    /// Unfolded-net view for printing
    pub fn net(&self) -> Net<'_> {
        Net { cube: self }
    }
}

impl fmt::Display for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// Unfolded cross layout of the stickers as color letters
///
/// ```text
///       W W W
///       W W W
///       W W W
/// O O O G G G R R R B B B
/// ...
/// ```
pub struct Net<'a> {
    cube: &'a Cube,
}

impl Net<'_> {
    fn write_row(&self, f: &mut fmt::Formatter<'_>, face: Face, row: usize) -> fmt::Result {
        for col in 0..3 {
            let value = self.cube.facelets[face.index() * FACE_SIZE + row * 3 + col];
            let color = Color::from_value(value).map_or('?', Color::letter);
            write!(f, "{} ", color)?;
        }
        Ok(())
    }
}

impl fmt::Display for Net<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            f.write_str("      ")?;
            self.write_row(f, Face::U, row)?;
            writeln!(f)?;
        }
        for row in 0..3 {
            for face in [Face::L, Face::F, Face::R, Face::B] {
                self.write_row(f, face, row)?;
            }
            writeln!(f)?;
        }
        for row in 0..3 {
            f.write_str("      ")?;
            self.write_row(f, Face::D, row)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

//! Orientation-aware move planner
//!
//! The robot can only turn the bottom layer. Every other face is first
//! brought down with turntable rotations and tilts, and every physical action
//! is mirrored into the cube model right after it completes, so the next
//! decision always sees the real orientation.
//!
//! Turntable senses are seen from above. A bottom-face turn is named in move
//! notation (looking at the face, i.e. from below), so a clockwise `D` runs
//! the turntable counter-clockwise.

use core::fmt;

use crate::config::RobotConfig;
use crate::cube::{Axis, Cube, CubeError, Direction, Face, Modifier, Move, MoveSequence};
use crate::traits::{ActuationError, Actuator, Sense};

use super::lash::LashCompensator;

const TILT: Move = Move::rotation(Axis::Z, Modifier::Quarter);
const SPIN_CLOCKWISE: Move = Move::rotation(Axis::Y, Modifier::Quarter);
const SPIN_COUNTER_CLOCKWISE: Move = Move::rotation(Axis::Y, Modifier::Prime);

/// Errors from planning or executing moves
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanError {
    /// Move string rejected before any motion
    Cube(CubeError),
    /// A motor failed; the model reflects every motion completed before it
    Actuation(ActuationError),
}

impl From<CubeError> for PlanError {
    fn from(e: CubeError) -> Self {
        PlanError::Cube(e)
    }
}

impl From<ActuationError> for PlanError {
    fn from(e: ActuationError) -> Self {
        PlanError::Actuation(e)
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::Cube(e) => write!(f, "invalid moves: {}", e),
            PlanError::Actuation(e) => write!(f, "actuation failed: {}", e),
        }
    }
}

/// Drives the robot's mechanisms and keeps the cube model in step
pub struct MovePlanner<A: Actuator> {
    actuator: A,
    cube: Cube,
    lash: LashCompensator,
    config: RobotConfig,
}

impl<A: Actuator> MovePlanner<A> {
    /// Create a planner for a solved cube in the identity orientation
    pub fn new(actuator: A, config: RobotConfig) -> Self {
        Self {
            actuator,
            cube: Cube::new(),
            lash: LashCompensator::from_config(&config),
            config,
        }
    }

    /// Cube model
    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    /// Mutable cube model, for installing a detected configuration
    pub fn cube_mut(&mut self) -> &mut Cube {
        &mut self.cube
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    pub fn lash(&self) -> &LashCompensator {
        &self.lash
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    /// Release the actuator
    pub fn into_actuator(self) -> A {
        self.actuator
    }

    /// Home every mechanism and forget the last turntable sense
    pub fn home(&mut self) -> Result<(), PlanError> {
        self.actuator.home()?;
        self.lash.reset();
        debug!("planner: homed");
        Ok(())
    }

    /// Hold the top two layers
    pub fn grab(&mut self) -> Result<(), PlanError> {
        let arm = self.config.arm;
        self.actuator.run_grab_arm_to(arm.grab, arm.speed)?;
        Ok(())
    }

    /// Move the arm clear of the cube
    pub fn rest(&mut self) -> Result<(), PlanError> {
        let arm = self.config.arm;
        self.actuator.run_grab_arm_to(arm.rest, arm.rest_speed)?;
        Ok(())
    }

    /// Flip the cube forward: the right face ends up down
    pub fn tilt(&mut self) -> Result<(), PlanError> {
        let arm = self.config.arm;
        self.grab()?;
        self.actuator.run_grab_arm_to(arm.tilt_over, arm.speed)?;
        self.actuator.settle(arm.settle_ms);
        self.actuator.run_grab_arm_to(arm.tilt_back, arm.tilt_back_speed)?;
        self.actuator.run_grab_arm_to(arm.grab, arm.speed)?;
        self.actuator.settle(arm.settle_ms);
        self.cube.apply(TILT);
        trace!("planner: tilt");
        Ok(())
    }

    /// Turn the whole cube a quarter turn on the turntable
    pub fn rotate_cube(&mut self, sense: Sense) -> Result<(), PlanError> {
        self.rest()?;
        let degrees = self.config.turn_degrees(1);
        self.actuator.rotate_turntable(sense, degrees)?;
        self.cube.apply(match sense {
            Sense::Clockwise => SPIN_CLOCKWISE,
            Sense::CounterClockwise => SPIN_COUNTER_CLOCKWISE,
        });
        trace!("planner: rotate cube {}", sense);
        Ok(())
    }

    /// Bring a logical face to the bottom
    ///
    /// Takes at most two actions from any orientation.
    pub fn place_face_down(&mut self, face: Face) -> Result<(), PlanError> {
        match self.cube.direction_of(face) {
            Direction::Front => self.rotate_cube(Sense::CounterClockwise)?,
            Direction::Back => self.rotate_cube(Sense::Clockwise)?,
            Direction::Left => {
                self.rotate_cube(Sense::Clockwise)?;
                self.rotate_cube(Sense::Clockwise)?;
            }
            Direction::Up => self.tilt()?,
            Direction::Right | Direction::Down => {}
        }
        if self.cube.direction_of(face) == Direction::Right {
            self.tilt()?;
        }
        Ok(())
    }

    /// Turn the bottom layer by `count` quarter turns
    ///
    /// `sense` is the face's own sense in move notation.
    pub fn turn_bottom(&mut self, sense: Sense, count: u8) -> Result<(), PlanError> {
        if count == 0 {
            return Ok(());
        }
        self.grab()?;
        let degrees = self.config.turn_degrees(count);
        self.lash.turn(&mut self.actuator, sense.opposite(), degrees)?;
        let quarter = match sense {
            Sense::Clockwise => Move::face(Face::D, Modifier::Quarter),
            Sense::CounterClockwise => Move::face(Face::D, Modifier::Prime),
        };
        for _ in 0..count {
            self.cube.apply(quarter);
        }
        Ok(())
    }

    /// Execute one face turn
    pub fn execute_move(&mut self, mv: Move) -> Result<(), PlanError> {
        let Some(face) = mv.turned_face() else {
            return Err(CubeError::InvalidMove { token: mv.token() }.into());
        };
        debug!("planner: {}", mv);
        self.place_face_down(face)?;
        match mv.modifier {
            Modifier::Quarter => self.turn_bottom(Sense::Clockwise, 1),
            Modifier::Prime => self.turn_bottom(Sense::CounterClockwise, 1),
            Modifier::Double => self.turn_bottom(Sense::Clockwise, 2),
        }
    }

    /// Execute a parsed sequence of face turns
    pub fn execute_sequence(&mut self, sequence: &MoveSequence) -> Result<(), PlanError> {
        for mv in sequence.iter() {
            self.execute_move(mv)?;
        }
        Ok(())
    }

    /// Execute a solver move string
    ///
    /// The whole string is validated before the first motion. Rotations are
    /// rejected; the solver only speaks in face turns.
    pub fn execute(&mut self, moves: &str) -> Result<(), PlanError> {
        let sequence = MoveSequence::parse_face_turns(moves)?;
        info!("planner: executing {} moves", sequence.len());
        self.execute_sequence(&sequence)
    }
}

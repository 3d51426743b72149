//! Robot controller
//!
//! Owns the planner, the host link and the operator indicator, and runs the
//! high-level tasks: scan, detect, solve and apply. Every task stops at the
//! first failure and leaves the robot where it is.

use core::fmt;

use cubot_protocol::{Command, Line};

use crate::config::RobotConfig;
use crate::cube::{
    CubeError, Face, FaceletAssembler, FaceletString, FACE_COUNT, IDENTITY_ORIENTATION,
};
use crate::exchange::{self, ExchangeError};
use crate::motion::{MovePlanner, PlanError};
use crate::scan::{ScanDriver, ScanError};
use crate::state::ScanState;
use crate::traits::{Actuator, Cue, Indicator, Link};

/// Errors from high-level robot tasks
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RobotError {
    /// Motion planning or execution failed
    Plan(PlanError),
    /// Scan aborted
    Scan(ScanError),
    /// Detected configuration or solver answer is invalid
    Cube(CubeError),
    /// Exchange with the camera host failed
    Host(ExchangeError),
    /// Host answered `OK` without the expected payload
    MissingPayload,
}

impl From<PlanError> for RobotError {
    fn from(e: PlanError) -> Self {
        RobotError::Plan(e)
    }
}

impl From<ScanError> for RobotError {
    fn from(e: ScanError) -> Self {
        RobotError::Scan(e)
    }
}

impl From<CubeError> for RobotError {
    fn from(e: CubeError) -> Self {
        RobotError::Cube(e)
    }
}

impl From<ExchangeError> for RobotError {
    fn from(e: ExchangeError) -> Self {
        RobotError::Host(e)
    }
}

impl fmt::Display for RobotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RobotError::Plan(e) => write!(f, "{}", e),
            RobotError::Scan(e) => write!(f, "scan failed: {}", e),
            RobotError::Cube(e) => write!(f, "{}", e),
            RobotError::Host(e) => write!(f, "{}", e),
            RobotError::MissingPayload => f.write_str("host answered without a payload"),
        }
    }
}

/// The robot
pub struct Cubot<A: Actuator, L: Link, I: Indicator> {
    planner: MovePlanner<A>,
    link: L,
    indicator: I,
    scanner: ScanDriver,
    config: RobotConfig,
}

impl<A: Actuator, L: Link, I: Indicator> Cubot<A, L, I> {
    pub fn new(actuator: A, link: L, indicator: I, config: RobotConfig) -> Self {
        Self {
            planner: MovePlanner::new(actuator, config),
            link,
            indicator,
            scanner: ScanDriver::new(config.link),
            config,
        }
    }

    pub fn planner(&self) -> &MovePlanner<A> {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut MovePlanner<A> {
        &mut self.planner
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn scan_state(&self) -> ScanState {
        self.scanner.state()
    }

    /// Release the hardware
    pub fn into_parts(self) -> (A, L, I) {
        (self.planner.into_actuator(), self.link, self.indicator)
    }

    /// Home every mechanism and assume a solved cube in the identity frame
    pub fn reset(&mut self) -> Result<(), RobotError> {
        self.planner.home()?;
        self.planner.cube_mut().reset();
        self.scanner.reset();
        info!("cubot: ready");
        self.indicator.show(Cue::Ready);
        Ok(())
    }

    /// Show all six faces to the camera
    pub fn scan(&mut self) -> Result<(), RobotError> {
        self.scanner
            .run(&mut self.planner, &mut self.link, &mut self.indicator)?;
        Ok(())
    }

    /// Have the host classify the captured faces and load the result
    ///
    /// Each answer is read in the frame the cube had when that face was
    /// captured. The assembled configuration is in the identity frame and is
    /// rotated into the robot's current physical frame before it replaces
    /// the model. Needs a completed scan.
    pub fn detect(&mut self) -> Result<(), RobotError> {
        let mut captures = [IDENTITY_ORIENTATION; FACE_COUNT];
        for face in Face::ALL {
            captures[face.index()] =
                self.scanner.capture(face).ok_or(CubeError::IncompleteScan { face })?;
        }

        let mut assembler = FaceletAssembler::new();
        for face in Face::ALL {
            let colors = self.request_payload(&Command::Detect { face: face.letter() })?;
            assembler.record_captured(captures[face.index()], &colors)?;
        }
        let facelets = assembler.assemble()?;
        info!("cubot: detected {}", facelets.as_str());

        let orientation = self.planner.cube().orientation();
        let cube = self.planner.cube_mut();
        cube.load(&facelets)?;
        cube.reorient_to(orientation)?;
        Ok(())
    }

    /// Configuration in the identity frame, as the solver expects it
    pub fn facelets(&self) -> Result<FaceletString, RobotError> {
        let mut cube = self.planner.cube().clone();
        cube.reorient_to(IDENTITY_ORIENTATION)?;
        Ok(cube.serialize())
    }

    /// Ask the host's solver for a move string
    pub fn solve(&mut self) -> Result<Line, RobotError> {
        let facelets = self.facelets()?;
        let command = Command::Solve { facelets: &facelets };
        let solution = exchange::request(&mut self.link, &command, &self.config.link)?;
        // A solved cube needs no moves
        let solution = solution.unwrap_or_default();
        info!("cubot: solution '{}'", solution.as_str());
        Ok(solution)
    }

    /// Execute a solver move string
    pub fn apply_solution(&mut self, moves: &str) -> Result<(), RobotError> {
        self.planner.execute(moves)?;
        Ok(())
    }

    /// Scan, detect, solve and apply
    ///
    /// Shows `Cue::Success` when the cube is solved and `Cue::Failure` when
    /// any step fails.
    pub fn solve_and_apply(&mut self) -> Result<(), RobotError> {
        match self.run_solve_and_apply() {
            Ok(()) => {
                info!("cubot: solved");
                self.indicator.show(Cue::Success);
                Ok(())
            }
            Err(e) => {
                error!("cubot: {}", e);
                // The scan driver already reported its own failure
                if !matches!(e, RobotError::Scan(_)) {
                    self.indicator.show(Cue::Failure);
                }
                Err(e)
            }
        }
    }

    fn run_solve_and_apply(&mut self) -> Result<(), RobotError> {
        self.scan()?;
        self.detect()?;
        let solution = self.solve()?;
        self.apply_solution(&solution)?;
        self.planner.rest()?;
        Ok(())
    }

    /// Tell the host to stop its command loop
    pub fn shutdown(&mut self) -> Result<(), RobotError> {
        exchange::request(&mut self.link, &Command::Exit, &self.config.link)?;
        info!("cubot: host told to exit");
        Ok(())
    }

    fn request_payload(&mut self, command: &Command<'_>) -> Result<Line, RobotError> {
        exchange::request(&mut self.link, command, &self.config.link)?
            .ok_or(RobotError::MissingPayload)
    }
}

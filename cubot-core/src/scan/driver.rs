//! Scan driver
//!
//! Runs the scan state machine against the planner and the host link.
//! Any failure aborts the scan; nothing is retried.

use core::fmt;

use cubot_protocol::Command;

use crate::config::LinkConfig;
use crate::cube::{Direction, Face, Orientation, FACE_COUNT};
use crate::exchange::{self, ExchangeError, Reply};
use crate::motion::{MovePlanner, PlanError};
use crate::state::{FailureKind, ScanEvent, ScanState};
use crate::traits::{Actuator, Cue, Indicator, Link};

/// Errors that abort a scan
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanError {
    /// Placing a face failed
    Plan(PlanError),
    /// Host could not capture the face
    Rejected { face: Face },
    /// Host did not answer in time
    Timeout { face: Face },
    /// Link to the host is gone
    ConnectionLost,
    /// Host kept sending lines that are not responses
    Protocol { face: Face },
}

impl ScanError {
    fn from_exchange(e: ExchangeError, face: Face) -> Self {
        match e {
            ExchangeError::Rejected => ScanError::Rejected { face },
            ExchangeError::Timeout => ScanError::Timeout { face },
            ExchangeError::ConnectionLost => ScanError::ConnectionLost,
            ExchangeError::Protocol | ExchangeError::Encode(_) => ScanError::Protocol { face },
        }
    }

    /// Failure kind recorded in the state machine
    pub fn kind(&self) -> FailureKind {
        match self {
            ScanError::Plan(_) => FailureKind::Actuation,
            ScanError::Rejected { .. } => FailureKind::Rejected,
            ScanError::Timeout { .. } => FailureKind::Timeout,
            ScanError::ConnectionLost => FailureKind::ConnectionLost,
            ScanError::Protocol { .. } => FailureKind::Protocol,
        }
    }
}

impl From<PlanError> for ScanError {
    fn from(e: PlanError) -> Self {
        ScanError::Plan(e)
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Plan(e) => write!(f, "{}", e),
            ScanError::Rejected { face } => write!(f, "host could not capture face {}", face),
            ScanError::Timeout { face } => write!(f, "no answer while capturing face {}", face),
            ScanError::ConnectionLost => f.write_str("connection lost"),
            ScanError::Protocol { face } => write!(f, "unusable answers while capturing face {}", face),
        }
    }
}

/// Drives one scan at a time
#[derive(Debug, Clone)]
pub struct ScanDriver {
    state: ScanState,
    config: LinkConfig,
    /// Cube orientation when each face was captured, by face index
    captures: [Option<Orientation>; FACE_COUNT],
}

impl ScanDriver {
    pub fn new(config: LinkConfig) -> Self {
        Self {
            state: ScanState::Idle,
            config,
            captures: [None; FACE_COUNT],
        }
    }

    /// Current state
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Orientation the cube had when `face` was captured
    ///
    /// `None` until the host accepted an image of that face in the current
    /// scan. The face is the one that was up at the time.
    pub fn capture(&self, face: Face) -> Option<Orientation> {
        self.captures[face.index()]
    }

    /// Back to idle after a finished or failed scan, forgetting the captures
    pub fn reset(&mut self) {
        self.state = self.state.transition(ScanEvent::Reset);
        self.captures = [None; FACE_COUNT];
    }

    /// Capture all six faces
    ///
    /// Shows `Cue::Success` when done and `Cue::Failure` on any error.
    pub fn run<A, L, I>(
        &mut self,
        planner: &mut MovePlanner<A>,
        link: &mut L,
        indicator: &mut I,
    ) -> Result<(), ScanError>
    where
        A: Actuator,
        L: Link,
        I: Indicator,
    {
        self.state = self.state.transition(ScanEvent::Start);
        self.captures = [None; FACE_COUNT];
        info!("scan: started");

        match self.step_all(planner, link) {
            Ok(()) => {
                info!("scan: done");
                indicator.show(Cue::Success);
                Ok(())
            }
            Err(e) => {
                self.state = self.state.transition(ScanEvent::Fail(e.kind()));
                error!("scan: {}", e);
                indicator.show(Cue::Failure);
                Err(e)
            }
        }
    }

    fn step_all<A: Actuator, L: Link>(
        &mut self,
        planner: &mut MovePlanner<A>,
        link: &mut L,
    ) -> Result<(), ScanError> {
        let mut ignored = 0u8;
        while let Some(face) = self.state.face() {
            let event = match self.state {
                ScanState::Scanning(_) => {
                    planner.place_face_down(face.opposite())?;
                    planner.rest()?;
                    let mut buf = [0u8; 4];
                    let name: &str = face.letter().encode_utf8(&mut buf);
                    exchange::send(link, &Command::Image { name })
                        .map_err(|e| ScanError::from_exchange(e, face))?;
                    ignored = 0;
                    ScanEvent::Requested
                }
                ScanState::Awaiting(_) => {
                    match exchange::receive_reply(link, self.config.response_timeout_ms)
                        .map_err(|e| ScanError::from_exchange(e, face))?
                    {
                        Reply::Ok(_) => {
                            let orientation = planner.cube().orientation();
                            debug_assert_eq!(orientation[Direction::Up.index()], face);
                            self.captures[face.index()] = Some(orientation);
                            ScanEvent::Accepted
                        }
                        Reply::Noise => {
                            ignored = ignored.saturating_add(1);
                            if ignored > self.config.max_ignored_lines {
                                return Err(ScanError::Protocol { face });
                            }
                            ScanEvent::Noise
                        }
                    }
                }
                ScanState::Advancing(_) => {
                    debug!("scan: captured {}", face);
                    ScanEvent::Advance
                }
                _ => break,
            };
            self.state = self.state.transition(event);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RobotConfig;
    use crate::scan::SCAN_STEPS;
    use crate::sim::{RecordingIndicator, ScriptedLink, SimActuator};
    use crate::traits::ActuationError;

    fn setup() -> (ScanDriver, MovePlanner<SimActuator>, ScriptedLink, RecordingIndicator) {
        let config = RobotConfig::default();
        (
            ScanDriver::new(config.link),
            MovePlanner::new(SimActuator::new(), config),
            ScriptedLink::new(),
            RecordingIndicator::new(),
        )
    }

    #[test]
    fn test_full_scan() {
        let (mut driver, mut planner, mut link, mut indicator) = setup();
        for _ in 0..SCAN_STEPS {
            link.respond("OK\n\r");
        }
        driver.run(&mut planner, &mut link, &mut indicator).unwrap();

        let sent: std::vec::Vec<&str> = link.sent().iter().map(|l| l.as_str()).collect();
        assert_eq!(
            sent,
            ["IMAGE L\n", "IMAGE F\n", "IMAGE D\n", "IMAGE R\n", "IMAGE B\n", "IMAGE U\n"]
        );
        assert_eq!(driver.state(), ScanState::Done);
        assert_eq!(indicator.cues(), &[Cue::Success]);
        // Last face imaged is U, so D ends up down
        assert_eq!(planner.cube().oriented_face(Direction::Down), Face::D);
        assert!(planner.cube().is_solved());
    }

    #[test]
    fn test_captures_record_up_face() {
        let (mut driver, mut planner, mut link, mut indicator) = setup();
        planner.cube_mut().apply_sequence("R U F' L2 D B x").unwrap();
        for _ in 0..SCAN_STEPS {
            link.respond("OK\n\r");
        }
        driver.run(&mut planner, &mut link, &mut indicator).unwrap();

        for face in Face::ALL {
            let orientation = driver.capture(face).unwrap();
            assert_eq!(orientation[Direction::Up.index()], face);
        }
    }

    #[test]
    fn test_failed_scan_forgets_captures() {
        let (mut driver, mut planner, mut link, mut indicator) = setup();
        for _ in 0..SCAN_STEPS {
            link.respond("OK\n\r");
        }
        driver.run(&mut planner, &mut link, &mut indicator).unwrap();
        link.respond("OK\n\r").respond("ERROR\n\r");

        driver.reset();
        assert_eq!(driver.capture(Face::U), None);
        let _ = driver.run(&mut planner, &mut link, &mut indicator);
        assert!(driver.capture(Face::L).is_some());
        assert_eq!(driver.capture(Face::F), None);
        assert_eq!(driver.capture(Face::U), None);
    }

    #[test]
    fn test_error_on_third_image_stops_scan() {
        let (mut driver, mut planner, mut link, mut indicator) = setup();
        link.respond("OK\n\r").respond("OK\n\r").respond("ERROR\n\r").respond("OK\n\r");

        let err = driver.run(&mut planner, &mut link, &mut indicator).unwrap_err();
        assert_eq!(err, ScanError::Rejected { face: Face::D });
        assert_eq!(link.sent().len(), 3);
        assert_eq!(driver.state(), ScanState::Failed(FailureKind::Rejected));
        assert_eq!(indicator.last(), Some(Cue::Failure));
    }

    #[test]
    fn test_noise_is_ignored() {
        let (mut driver, mut planner, mut link, mut indicator) = setup();
        for _ in 0..SCAN_STEPS {
            link.respond("Command: IMAGE\r\nSaving image...\r\nOK\n\r");
        }
        driver.run(&mut planner, &mut link, &mut indicator).unwrap();
        assert_eq!(link.sent().len(), SCAN_STEPS);
    }

    #[test]
    fn test_too_much_noise_is_a_protocol_error() {
        let (mut driver, mut planner, mut link, mut indicator) = setup();
        for _ in 0..=planner.config().link.max_ignored_lines {
            link.respond("garbage\n");
        }
        link.respond("OK\n");
        let err = driver.run(&mut planner, &mut link, &mut indicator).unwrap_err();
        assert_eq!(err, ScanError::Protocol { face: Face::L });
        assert_eq!(driver.state(), ScanState::Failed(FailureKind::Protocol));
    }

    #[test]
    fn test_timeout() {
        let (mut driver, mut planner, mut link, mut indicator) = setup();
        link.respond("OK\n");
        let err = driver.run(&mut planner, &mut link, &mut indicator).unwrap_err();
        assert_eq!(err, ScanError::Timeout { face: Face::F });
        assert_eq!(link.sent().len(), 2);
    }

    #[test]
    fn test_connection_lost() {
        let (mut driver, mut planner, mut link, mut indicator) = setup();
        link.disconnect();
        let err = driver.run(&mut planner, &mut link, &mut indicator).unwrap_err();
        assert_eq!(err, ScanError::ConnectionLost);
        assert_eq!(indicator.cues(), &[Cue::Failure]);
    }

    #[test]
    fn test_actuation_failure_sends_nothing() {
        let (mut driver, mut planner, mut link, mut indicator) = setup();
        planner.actuator_mut().fail_on(1, ActuationError::Stalled);
        let err = driver.run(&mut planner, &mut link, &mut indicator).unwrap_err();
        assert_eq!(err, ScanError::Plan(PlanError::Actuation(ActuationError::Stalled)));
        assert!(link.sent().is_empty());
        assert_eq!(driver.state(), ScanState::Failed(FailureKind::Actuation));
    }

    #[test]
    fn test_scan_can_run_again() {
        let (mut driver, mut planner, mut link, mut indicator) = setup();
        let _ = driver.run(&mut planner, &mut link, &mut indicator);
        for _ in 0..SCAN_STEPS {
            link.respond("OK\n");
        }
        driver.run(&mut planner, &mut link, &mut indicator).unwrap();
        assert_eq!(driver.state(), ScanState::Done);
    }
}

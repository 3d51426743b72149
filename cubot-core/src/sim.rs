//! Simulated hardware
//!
//! In-memory implementations of the hardware traits. They record everything
//! they are asked to do so tests (and dry runs on a host) can check the exact
//! sequence of motions and messages.

use heapless::{Deque, Vec};

use cubot_protocol::{Encoded, Line, LineError, LineParser};

use crate::traits::{ActuationError, Actuator, Cue, Indicator, Link, LinkError, Sense};

/// Motions kept by `SimActuator`; later motions are dropped
pub const MAX_MOTIONS: usize = 1024;

/// Lines kept by `ScriptedLink` in each direction
pub const MAX_SCRIPT_LINES: usize = 64;

/// One recorded actuator call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Motion {
    /// Turntable rotation: sense and motor degrees
    Turntable(Sense, u32),
    /// Grabbing arm move: position and speed
    Arm(i16, u8),
    /// Pause in milliseconds
    Settle(u32),
    /// Homing of all mechanisms
    Home,
}

/// Actuator that records motions instead of moving motors
#[derive(Debug, Default)]
pub struct SimActuator {
    motions: Vec<Motion, MAX_MOTIONS>,
    /// Motor commands issued so far, failed ones included
    commands: usize,
    failure: Option<(usize, ActuationError)>,
}

impl SimActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `command`-th motor command fail (1-based, counting from
    /// creation). Pauses are not motor commands. A failed command is not
    /// recorded.
    pub fn fail_on(&mut self, command: usize, error: ActuationError) {
        self.failure = Some((command, error));
    }

    /// Recorded motions, oldest first
    pub fn motions(&self) -> &[Motion] {
        &self.motions
    }

    pub fn clear(&mut self) {
        self.motions.clear();
    }

    fn record(&mut self, motion: Motion) {
        let _ = self.motions.push(motion);
    }

    fn command(&mut self, motion: Motion) -> Result<(), ActuationError> {
        self.commands += 1;
        if let Some((command, error)) = self.failure {
            if command == self.commands {
                return Err(error);
            }
        }
        self.record(motion);
        Ok(())
    }
}

impl Actuator for SimActuator {
    fn rotate_turntable(&mut self, sense: Sense, degrees: u32) -> Result<(), ActuationError> {
        self.command(Motion::Turntable(sense, degrees))
    }

    fn run_grab_arm_to(&mut self, position: i16, speed: u8) -> Result<(), ActuationError> {
        self.command(Motion::Arm(position, speed))
    }

    fn settle(&mut self, ms: u32) {
        self.record(Motion::Settle(ms));
    }

    fn home(&mut self) -> Result<(), ActuationError> {
        self.command(Motion::Home)
    }
}

/// Link that replays scripted responses and records what was sent
///
/// When the script runs out, `receive_line` times out.
#[derive(Debug, Default)]
pub struct ScriptedLink {
    parser: LineParser,
    incoming: Deque<Result<Line, LinkError>, MAX_SCRIPT_LINES>,
    sent: Vec<Encoded, MAX_SCRIPT_LINES>,
    disconnected: bool,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw text from the remote side
    ///
    /// The text is split into lines the way a serial port would deliver it,
    /// so it may hold several lines, noise and any mix of terminators.
    pub fn respond(&mut self, text: &str) -> &mut Self {
        for &byte in text.as_bytes() {
            let item = match self.parser.feed(byte) {
                Ok(Some(line)) => Ok(line),
                Ok(None) => continue,
                Err(LineError::Overflow) => Err(LinkError::Overflow),
                Err(LineError::InvalidUtf8) => continue,
            };
            if self.incoming.push_back(item).is_err() {
                break;
            }
        }
        self
    }

    /// Queue a transport error
    pub fn fail(&mut self, error: LinkError) -> &mut Self {
        let _ = self.incoming.push_back(Err(error));
        self
    }

    /// Drop the connection; every later call fails
    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }

    /// Lines sent so far, terminators included
    pub fn sent(&self) -> &[Encoded] {
        &self.sent
    }

    /// Scripted lines not consumed yet
    pub fn pending(&self) -> usize {
        self.incoming.len()
    }
}

impl Link for ScriptedLink {
    fn send_line(&mut self, line: &str) -> Result<(), LinkError> {
        if self.disconnected {
            return Err(LinkError::ConnectionLost);
        }
        let mut copy = Encoded::new();
        copy.push_str(line).map_err(|_| LinkError::Overflow)?;
        self.sent.push(copy).map_err(|_| LinkError::Overflow)?;
        Ok(())
    }

    fn receive_line(&mut self, _timeout_ms: u32) -> Result<Line, LinkError> {
        if self.disconnected {
            return Err(LinkError::ConnectionLost);
        }
        self.incoming.pop_front().unwrap_or(Err(LinkError::Timeout))
    }
}

/// Indicator that remembers every cue
#[derive(Debug, Default)]
pub struct RecordingIndicator {
    cues: Vec<Cue, 32>,
}

impl RecordingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn last(&self) -> Option<Cue> {
        self.cues.last().copied()
    }
}

impl Indicator for RecordingIndicator {
    fn show(&mut self, cue: Cue) {
        let _ = self.cues.push(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actuator_failure_is_not_recorded() {
        let mut actuator = SimActuator::new();
        actuator.fail_on(2, ActuationError::Stalled);
        actuator.run_grab_arm_to(-75, 70).unwrap();
        actuator.settle(50);
        assert_eq!(
            actuator.rotate_turntable(Sense::Clockwise, 270),
            Err(ActuationError::Stalled)
        );
        actuator.home().unwrap();
        assert_eq!(
            actuator.motions(),
            &[Motion::Arm(-75, 70), Motion::Settle(50), Motion::Home]
        );
    }

    #[test]
    fn test_link_splits_scripted_text() {
        let mut link = ScriptedLink::new();
        link.respond("booting\r\nOK\n\r").respond("OK WWW");
        assert_eq!(link.receive_line(0).unwrap().as_str(), "booting");
        assert_eq!(link.receive_line(0).unwrap().as_str(), "OK");
        // Unterminated text stays buffered
        assert_eq!(link.receive_line(0), Err(LinkError::Timeout));
        link.respond("\n");
        assert_eq!(link.receive_line(0).unwrap().as_str(), "OK WWW");
    }

    #[test]
    fn test_link_records_and_disconnects() {
        let mut link = ScriptedLink::new();
        link.send_line("IMAGE F\n").unwrap();
        assert_eq!(link.sent()[0].as_str(), "IMAGE F\n");
        link.disconnect();
        assert_eq!(link.send_line("EXIT\n"), Err(LinkError::ConnectionLost));
        assert_eq!(link.receive_line(0), Err(LinkError::ConnectionLost));
    }

    #[test]
    fn test_indicator_records() {
        let mut indicator = RecordingIndicator::new();
        indicator.show(Cue::Ready);
        indicator.show(Cue::Success);
        assert_eq!(indicator.cues(), &[Cue::Ready, Cue::Success]);
        assert_eq!(indicator.last(), Some(Cue::Success));
    }
}

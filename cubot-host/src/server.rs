//! Camera host command loop
//!
//! The host side of the protocol: wait for a command, run it, answer
//! `OK [payload]` or `ERROR`. Lines that are not commands are skipped, and
//! `EXIT` ends the loop without an answer.

use cubot_core::traits::{Link, LinkError};
use cubot_protocol::{Command, Encoded, Response};
use log::{debug, info, warn};
use thiserror::Error;

/// Wait between idle checks while no command arrives
pub const DEFAULT_POLL_MS: u32 = 1000;

/// Failure reported by a command handler
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        HandlerError(message.to_string())
    }
}

/// The camera host's capabilities
pub trait CommandHandler {
    /// Capture the face in front of the camera and store it under `name`
    fn image(&mut self, name: &str) -> Result<(), HandlerError>;

    /// Classify the nine stickers of a captured face as color letters
    fn detect(&mut self, face: char) -> Result<String, HandlerError>;

    /// Solve a 54-facelet configuration into a move string
    fn solve(&mut self, facelets: &str) -> Result<String, HandlerError>;
}

/// Errors that stop the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("link failed: {0}")]
    Link(LinkError),
    #[error("no command within the idle limit")]
    Idle,
}

/// Serves commands from the robot until `EXIT`
pub struct CommandServer<L: Link, H: CommandHandler> {
    link: L,
    handler: H,
    poll_ms: u32,
    idle_limit: Option<u32>,
}

impl<L: Link, H: CommandHandler> CommandServer<L, H> {
    /// Create a server that waits for commands indefinitely
    pub fn new(link: L, handler: H) -> Self {
        Self {
            link,
            handler,
            poll_ms: DEFAULT_POLL_MS,
            idle_limit: None,
        }
    }

    /// Give up after `polls` consecutive idle waits
    pub fn with_idle_limit(mut self, polls: u32) -> Self {
        self.idle_limit = Some(polls);
        self
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Get the link and the handler back
    pub fn into_parts(self) -> (L, H) {
        (self.link, self.handler)
    }

    /// Serve until `EXIT`; returns the number of commands answered
    pub fn run(&mut self) -> Result<usize, ServerError> {
        info!("waiting for commands");
        let mut served = 0;
        let mut idle = 0;
        loop {
            let line = match self.link.receive_line(self.poll_ms) {
                Ok(line) => line,
                Err(LinkError::Timeout) => {
                    idle += 1;
                    if self.idle_limit.is_some_and(|limit| idle >= limit) {
                        return Err(ServerError::Idle);
                    }
                    continue;
                }
                Err(LinkError::Overflow) => {
                    warn!("dropping overlong line");
                    continue;
                }
                Err(e) => return Err(ServerError::Link(e)),
            };
            idle = 0;

            let Some(command) = Command::parse(&line) else {
                debug!("ignoring '{}'", line.as_str());
                continue;
            };
            if command == Command::Exit {
                info!("exit requested after {} commands", served);
                return Ok(served);
            }

            let answer = self.answer(&command);
            self.link.send_line(&answer).map_err(ServerError::Link)?;
            served += 1;
        }
    }

    /// Run one command and encode the answer
    pub fn answer(&mut self, command: &Command<'_>) -> Encoded {
        info!("command: {:?}", command);
        let result = match *command {
            Command::Image { name } => self.handler.image(name).map(|()| None),
            Command::Detect { face } => self.handler.detect(face).map(Some),
            Command::Solve { facelets } => self.handler.solve(facelets).map(Some),
            Command::Exit => Ok(None),
        };

        let encoded = match &result {
            Ok(payload) => {
                let payload = payload.as_deref().map(str::trim).filter(|p| !p.is_empty());
                Response::Ok(payload).encode()
            }
            Err(e) => {
                warn!("command failed: {}", e);
                Response::Error.encode()
            }
        };
        encoded.unwrap_or_else(|e| {
            warn!("cannot encode answer: {}", e);
            // ERROR always fits
            Response::Error.encode().unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubot_core::sim::ScriptedLink;

    #[derive(Default)]
    struct FakeCamera {
        images: Vec<String>,
        fail_image: Option<String>,
    }

    impl CommandHandler for FakeCamera {
        fn image(&mut self, name: &str) -> Result<(), HandlerError> {
            if self.fail_image.as_deref() == Some(name) {
                return Err("camera not ready".into());
            }
            self.images.push(name.to_string());
            Ok(())
        }

        fn detect(&mut self, face: char) -> Result<String, HandlerError> {
            match face {
                'U' => Ok("WWWWWWWWW".to_string()),
                _ => Err("no image".into()),
            }
        }

        fn solve(&mut self, facelets: &str) -> Result<String, HandlerError> {
            if facelets.len() != 54 {
                return Err("bad length".into());
            }
            Ok(" R U R' ".to_string())
        }
    }

    fn sent(server: CommandServer<ScriptedLink, FakeCamera>) -> (Vec<String>, FakeCamera) {
        let (link, camera) = server.into_parts();
        (link.sent().iter().map(|l| l.as_str().to_string()).collect(), camera)
    }

    #[test]
    fn test_serves_until_exit() {
        let mut link = ScriptedLink::new();
        link.respond("IMAGE L\nIMAGE F\nEXIT\nIMAGE D\n");
        let mut server = CommandServer::new(link, FakeCamera::default()).with_idle_limit(1);
        assert_eq!(server.run().unwrap(), 2);

        let (sent, camera) = sent(server);
        assert_eq!(sent, ["OK\n\r", "OK\n\r"]);
        assert_eq!(camera.images, ["L", "F"]);
    }

    #[test]
    fn test_ignores_unknown_lines() {
        let mut link = ScriptedLink::new();
        link.respond("hello\r\nSCAN U\r\nIMAGE\r\nDETECT U\r\nEXIT\r");
        let mut server = CommandServer::new(link, FakeCamera::default()).with_idle_limit(1);
        assert_eq!(server.run().unwrap(), 1);
        assert_eq!(sent(server).0, ["OK WWWWWWWWW\n\r"]);
    }

    #[test]
    fn test_handler_errors_answer_error() {
        let mut link = ScriptedLink::new();
        link.respond("IMAGE B\nDETECT R\nSOLVE UUU\nEXIT\n");
        let camera = FakeCamera {
            fail_image: Some("B".to_string()),
            ..FakeCamera::default()
        };
        let mut server = CommandServer::new(link, camera).with_idle_limit(1);
        assert_eq!(server.run().unwrap(), 3);
        assert_eq!(sent(server).0, ["ERROR\n\r", "ERROR\n\r", "ERROR\n\r"]);
    }

    #[test]
    fn test_solve_payload_is_trimmed() {
        let mut server = CommandServer::new(ScriptedLink::new(), FakeCamera::default());
        let facelets = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";
        let answer = server.answer(&Command::Solve { facelets });
        assert_eq!(answer.as_str(), "OK R U R'\n\r");
    }

    #[test]
    fn test_idle_limit() {
        let mut server = CommandServer::new(ScriptedLink::new(), FakeCamera::default()).with_idle_limit(3);
        assert!(matches!(server.run(), Err(ServerError::Idle)));
    }

    #[test]
    fn test_connection_lost() {
        let mut link = ScriptedLink::new();
        link.disconnect();
        let mut server = CommandServer::new(link, FakeCamera::default());
        assert!(matches!(
            server.run(),
            Err(ServerError::Link(LinkError::ConnectionLost))
        ));
    }
}

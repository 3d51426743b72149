//! Serial link trait
//!
//! This trait abstracts the byte stream to the camera host. Implementations
//! split incoming bytes into lines with `cubot_protocol::LineParser`.

use core::fmt;

use cubot_protocol::Line;

/// Errors that can occur with link communication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// No complete line arrived within the timeout
    Timeout,
    /// Transport closed or failed; there is no automatic reconnect
    ConnectionLost,
    /// A received line exceeded the maximum length
    Overflow,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Timeout => f.write_str("timed out waiting for a line"),
            LinkError::ConnectionLost => f.write_str("connection lost"),
            LinkError::Overflow => f.write_str("line too long"),
        }
    }
}

/// Trait for line-oriented communication with the camera host
pub trait Link {
    /// Send one line; `line` carries its own terminator
    fn send_line(&mut self, line: &str) -> Result<(), LinkError>;

    /// Block until a complete line arrives or `timeout_ms` elapses
    fn receive_line(&mut self, timeout_ms: u32) -> Result<Line, LinkError>;
}

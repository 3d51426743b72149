//! Command/response exchange with the camera host
//!
//! The hub sends one command and blocks until a response line arrives.
//! Lines that are not responses are noise; the caller decides how many of
//! them to tolerate.

use core::fmt;

use cubot_protocol::{Command, EncodeError, Line, Response};

use crate::config::LinkConfig;
use crate::traits::{Link, LinkError};

/// Errors from one exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExchangeError {
    /// Host answered `ERROR`
    Rejected,
    /// No line within the timeout
    Timeout,
    /// Transport closed
    ConnectionLost,
    /// Too many noise lines
    Protocol,
    /// Command could not be encoded
    Encode(EncodeError),
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeError::Rejected => f.write_str("host answered ERROR"),
            ExchangeError::Timeout => f.write_str("no response from host"),
            ExchangeError::ConnectionLost => f.write_str("connection lost"),
            ExchangeError::Protocol => f.write_str("too many malformed responses"),
            ExchangeError::Encode(e) => write!(f, "cannot encode command: {}", e),
        }
    }
}

impl From<EncodeError> for ExchangeError {
    fn from(e: EncodeError) -> Self {
        ExchangeError::Encode(e)
    }
}

/// One received line, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `OK`, with its payload if any
    Ok(Option<Line>),
    /// Anything that is not a response
    Noise,
}

/// Encode and send a command
pub fn send<L: Link>(link: &mut L, command: &Command<'_>) -> Result<(), ExchangeError> {
    let line = command.encode()?;
    debug!("link: > {}", line.trim_end());
    link.send_line(&line).map_err(map_link_error)
}

/// Receive and classify one line
///
/// `ERROR` becomes `ExchangeError::Rejected`. An overlong line was dropped
/// by the link and counts as noise.
pub fn receive_reply<L: Link>(link: &mut L, timeout_ms: u32) -> Result<Reply, ExchangeError> {
    let line = match link.receive_line(timeout_ms) {
        Ok(line) => line,
        Err(LinkError::Overflow) => return Ok(Reply::Noise),
        Err(e) => return Err(map_link_error(e)),
    };
    match Response::parse(&line) {
        Some(Response::Ok(payload)) => {
            debug!("link: < OK");
            let mut out = Line::new();
            if let Some(payload) = payload {
                // A payload is part of a line and always fits
                let _ = out.push_str(payload);
                return Ok(Reply::Ok(Some(out)));
            }
            Ok(Reply::Ok(None))
        }
        Some(Response::Error) => {
            warn!("link: < ERROR");
            Err(ExchangeError::Rejected)
        }
        None => {
            trace!("link: ignoring '{}'", line.as_str());
            Ok(Reply::Noise)
        }
    }
}

/// Send a command and wait for its response
///
/// Returns the `OK` payload, if any. Commands without a response return
/// right after sending.
pub fn request<L: Link>(
    link: &mut L,
    command: &Command<'_>,
    config: &LinkConfig,
) -> Result<Option<Line>, ExchangeError> {
    send(link, command)?;
    if !command.expects_response() {
        return Ok(None);
    }
    let mut ignored = 0u8;
    loop {
        match receive_reply(link, config.response_timeout_ms)? {
            Reply::Ok(payload) => return Ok(payload),
            Reply::Noise => {
                ignored = ignored.saturating_add(1);
                if ignored > config.max_ignored_lines {
                    return Err(ExchangeError::Protocol);
                }
            }
        }
    }
}

fn map_link_error(e: LinkError) -> ExchangeError {
    match e {
        LinkError::Timeout => ExchangeError::Timeout,
        LinkError::ConnectionLost => ExchangeError::ConnectionLost,
        LinkError::Overflow => ExchangeError::Protocol,
    }
}

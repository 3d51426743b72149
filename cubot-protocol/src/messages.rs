//! Message types for the command protocol
//!
//! Message types are divided into two categories:
//! - Hub → Host: commands (`IMAGE`, `DETECT`, `SOLVE`, `EXIT`)
//! - Host → Hub: responses (`OK`, `OK <payload>`, `ERROR`)

use core::fmt::Write;

use heapless::String;

use crate::line::MAX_LINE_LEN;

// Command keywords
pub const CMD_IMAGE: &str = "IMAGE";
pub const CMD_DETECT: &str = "DETECT";
pub const CMD_SOLVE: &str = "SOLVE";
pub const CMD_EXIT: &str = "EXIT";

// Response keywords
pub const RESP_OK: &str = "OK";
pub const RESP_ERROR: &str = "ERROR";

/// Maximum length of an image name
pub const IMAGE_NAME_LEN: usize = 16;

/// Maximum length of a response payload (`OK ` prefix excluded)
pub const PAYLOAD_LEN: usize = MAX_LINE_LEN - RESP_OK.len() - 1;

/// Capacity of an encoded message: one line plus a two-byte terminator
pub const ENCODED_LEN: usize = MAX_LINE_LEN + 2;

/// Wire form of a message, terminator included
pub type Encoded = String<ENCODED_LEN>;

/// Errors that can occur while encoding a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Message does not fit in one line
    TooLong,
    /// Argument is empty or contains whitespace
    InvalidArgument,
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EncodeError::TooLong => write!(f, "message does not fit in one line"),
            EncodeError::InvalidArgument => write!(f, "argument is empty or contains whitespace"),
        }
    }
}

/// A single command argument must be one non-empty word
fn check_word(arg: &str) -> Result<(), EncodeError> {
    if arg.is_empty() || arg.chars().any(char::is_whitespace) {
        return Err(EncodeError::InvalidArgument);
    }
    Ok(())
}

/// Commands sent from the hub to the camera host
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Capture the face currently seen by the camera and store it under `name`
    Image { name: &'a str },
    /// Classify the 9 stickers of a previously captured face
    Detect { face: char },
    /// Solve a 54-facelet configuration
    Solve { facelets: &'a str },
    /// Stop the host's command loop
    Exit,
}

impl<'a> Command<'a> {
    /// Encode this command as a `\n`-terminated line
    pub fn encode(&self) -> Result<Encoded, EncodeError> {
        let mut out = Encoded::new();
        match self {
            Command::Image { name } => {
                check_word(name)?;
                if name.len() > IMAGE_NAME_LEN {
                    return Err(EncodeError::TooLong);
                }
                write!(out, "{} {}", CMD_IMAGE, name).map_err(|_| EncodeError::TooLong)?;
            }
            Command::Detect { face } => {
                if face.is_whitespace() {
                    return Err(EncodeError::InvalidArgument);
                }
                write!(out, "{} {}", CMD_DETECT, face).map_err(|_| EncodeError::TooLong)?;
            }
            Command::Solve { facelets } => {
                check_word(facelets)?;
                write!(out, "{} {}", CMD_SOLVE, facelets).map_err(|_| EncodeError::TooLong)?;
            }
            Command::Exit => {
                out.push_str(CMD_EXIT).map_err(|_| EncodeError::TooLong)?;
            }
        }
        if out.len() > MAX_LINE_LEN {
            return Err(EncodeError::TooLong);
        }
        out.push('\n').map_err(|_| EncodeError::TooLong)?;
        Ok(out)
    }

    /// Parse a command from a received line
    ///
    /// Returns `None` for anything that is not a well-formed command; the host
    /// ignores such lines and keeps waiting.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let keyword = words.next()?;
        let arg = words.next();
        if words.next().is_some() {
            return None;
        }

        match (keyword, arg) {
            (CMD_IMAGE, Some(name)) => Some(Command::Image { name }),
            (CMD_DETECT, Some(face)) => {
                let mut chars = face.chars();
                let letter = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Some(Command::Detect { face: letter })
            }
            (CMD_SOLVE, Some(facelets)) => Some(Command::Solve { facelets }),
            (CMD_EXIT, None) => Some(Command::Exit),
            _ => None,
        }
    }

    /// Returns true if the host answers this command
    pub fn expects_response(&self) -> bool {
        !matches!(self, Command::Exit)
    }
}

/// Responses sent from the camera host to the hub
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response<'a> {
    /// Command succeeded, with an optional payload
    Ok(Option<&'a str>),
    /// Command failed
    Error,
}

impl<'a> Response<'a> {
    /// Parse a response from a received line
    ///
    /// Returns `None` for noise: any line that is not exactly `OK`, `ERROR`
    /// or `OK <payload>`.
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if line == RESP_OK {
            return Some(Response::Ok(None));
        }
        if line == RESP_ERROR {
            return Some(Response::Error);
        }
        let payload = line.strip_prefix(RESP_OK)?.strip_prefix(' ')?.trim();
        if payload.is_empty() {
            return Some(Response::Ok(None));
        }
        Some(Response::Ok(Some(payload)))
    }

    /// Encode this response as a `\n\r`-terminated line
    pub fn encode(&self) -> Result<Encoded, EncodeError> {
        let mut out = Encoded::new();
        match self {
            Response::Ok(None) => out.push_str(RESP_OK).map_err(|_| EncodeError::TooLong)?,
            Response::Ok(Some(payload)) => {
                if payload.len() > PAYLOAD_LEN {
                    return Err(EncodeError::TooLong);
                }
                write!(out, "{} {}", RESP_OK, payload).map_err(|_| EncodeError::TooLong)?;
            }
            Response::Error => out.push_str(RESP_ERROR).map_err(|_| EncodeError::TooLong)?,
        }
        out.push_str("\n\r").map_err(|_| EncodeError::TooLong)?;
        Ok(out)
    }

    /// Get the payload of a successful response
    pub fn payload(&self) -> Option<&'a str> {
        match self {
            Response::Ok(payload) => *payload,
            Response::Error => None,
        }
    }

    /// Returns true for `OK` responses
    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok(_))
    }
}

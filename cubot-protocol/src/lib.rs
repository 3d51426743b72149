//! Cubot Command Protocol
//!
//! This crate defines the text protocol spoken between the robot hub (which
//! moves the cube) and the camera host (which captures images, classifies
//! colors and runs the solver). The hub issues commands and blocks on the
//! answer; the host only ever answers.
//!
//! # Protocol Overview
//!
//! Every message is one line of ASCII text:
//! ```text
//! hub  → host   IMAGE <name>          host → hub   OK | ERROR
//! hub  → host   DETECT <face>         host → hub   OK <9 color letters> | ERROR
//! hub  → host   SOLVE <54 facelets>   host → hub   OK <move string> | ERROR
//! hub  → host   EXIT                  (no answer)
//! ```
//!
//! Lines end with `\n`, `\r` or both. Anything that does not parse as a
//! response is noise (console chatter from the host, boot banners) and is
//! reported as such so the caller can decide how much of it to tolerate.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod line;
pub mod messages;

pub use line::{Line, LineError, LineParser, MAX_LINE_LEN};
pub use messages::{Command, EncodeError, Encoded, Response, IMAGE_NAME_LEN, PAYLOAD_LEN};

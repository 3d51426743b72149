//! Line link over a byte stream
//!
//! Wraps any reader/writer pair (a serial port device, a pipe, a TCP stream)
//! and implements `Link` on top of `LineParser`.

use std::io::{BufReader, ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use cubot_core::traits::{Link, LinkError};
use cubot_protocol::{Line, LineError, LineParser};
use log::{debug, warn};

/// `Link` over a reader and a writer
///
/// The reader should have its own read timeout (as serial ports do); a
/// `TimedOut` or `WouldBlock` error counts as a timeout, EOF and any other
/// error as a lost connection. `receive_line` also gives up once
/// `timeout_ms` has passed between bytes.
pub struct SerialLink<R: Read, W: Write> {
    reader: BufReader<R>,
    writer: W,
    parser: LineParser,
}

impl<R: Read, W: Write> SerialLink<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            parser: LineParser::new(),
        }
    }

    /// Get the reader and writer back
    pub fn into_inner(self) -> (R, W) {
        (self.reader.into_inner(), self.writer)
    }

    fn read_byte(&mut self) -> Result<u8, LinkError> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Err(LinkError::ConnectionLost),
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Err(LinkError::Timeout)
                }
                Err(e) => {
                    warn!("serial read failed: {}", e);
                    return Err(LinkError::ConnectionLost);
                }
            }
        }
    }
}

impl<R: Read, W: Write> Link for SerialLink<R, W> {
    fn send_line(&mut self, line: &str) -> Result<(), LinkError> {
        self.writer
            .write_all(line.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|e| {
                warn!("serial write failed: {}", e);
                LinkError::ConnectionLost
            })
    }

    fn receive_line(&mut self, timeout_ms: u32) -> Result<Line, LinkError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms.into());
        loop {
            let byte = self.read_byte()?;
            match self.parser.feed(byte) {
                Ok(Some(line)) => return Ok(line),
                Ok(None) => {}
                Err(LineError::Overflow) => return Err(LinkError::Overflow),
                Err(LineError::InvalidUtf8) => debug!("dropping line with invalid UTF-8"),
            }
            if Instant::now() > deadline {
                return Err(LinkError::Timeout);
            }
        }
    }
}

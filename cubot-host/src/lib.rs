//! Host-side support for the Cubot robot
//!
//! - `config`: robot configuration from TOML
//! - `serial`: the `Link` trait over any byte stream (serial port, pipe, socket)
//! - `server`: the camera host's command loop

pub mod config;
pub mod serial;
pub mod server;

pub use config::{load, ConfigError};
pub use serial::SerialLink;
pub use server::{CommandHandler, CommandServer, HandlerError, ServerError};

//! Robot configuration from TOML
//!
//! The file mirrors `RobotConfig`; every key is optional. After parsing, the
//! values are checked against the robot's mechanics and every problem found
//! is reported at once.

use std::fs;
use std::path::{Path, PathBuf};

use cubot_core::config::{RobotConfig, QUARTER_TURN_DEGREES};
use log::info;
use thiserror::Error;

/// Errors from loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Load and validate a configuration file
pub fn load(path: impl AsRef<Path>) -> Result<RobotConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = from_toml_str(&text)?;
    info!("loaded configuration from {}", path.display());
    Ok(config)
}

/// Parse and validate configuration text
pub fn from_toml_str(text: &str) -> Result<RobotConfig, ConfigError> {
    let config: RobotConfig = toml::from_str(text)?;
    validate(&config)?;
    Ok(config)
}

/// Check a configuration against the robot's mechanics
pub fn validate(config: &RobotConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.gear_ratio == 0 {
        errors.push("gear_ratio must be at least 1".to_string());
    }

    let arm = &config.arm;
    for (name, speed) in [
        ("turntable_speed", config.turntable_speed),
        ("arm.speed", arm.speed),
        ("arm.tilt_back_speed", arm.tilt_back_speed),
        ("arm.rest_speed", arm.rest_speed),
    ] {
        if speed == 0 || speed > 100 {
            errors.push(format!("{} must be between 1 and 100, got {}", name, speed));
        }
    }

    // The arm closes towards negative positions
    if !(arm.tilt_over < arm.grab && arm.grab < arm.rest) {
        errors.push(format!(
            "arm positions must satisfy tilt_over < grab < rest, got {} / {} / {}",
            arm.tilt_over, arm.grab, arm.rest
        ));
    }
    if !(arm.tilt_over < arm.tilt_back && arm.tilt_back <= arm.rest) {
        errors.push(format!(
            "arm.tilt_back must lie between tilt_over and rest, got {}",
            arm.tilt_back
        ));
    }

    let pre_travel = u32::from(config.lash.extra_degrees) + u32::from(config.lash.reversal_degrees);
    if pre_travel >= QUARTER_TURN_DEGREES {
        errors.push("lash pre-travel must stay below a quarter turn".to_string());
    }

    if config.link.response_timeout_ms == 0 {
        errors.push("link.response_timeout_ms must be positive".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(errors))
    }
}

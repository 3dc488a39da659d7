//! Environment variable utilities for hornsim
//!
//! Ambient conditions (temperature, altitude) change the speed of sound and the
//! air density. Both can be overridden through environment variables so that the
//! same binary can be run for a hot stage or a cold hall without a config file.

use crate::constants::{AIR_DENSITY, SPEED_OF_SOUND};
use std::env;

/// Environment variable overriding the speed of sound (m/s)
pub const SPEED_OF_SOUND_VAR: &str = "HORNSIM_SPEED_OF_SOUND";

/// Environment variable overriding the air density (kg/m³)
pub const AIR_DENSITY_VAR: &str = "HORNSIM_AIR_DENSITY";

/// Error type for environment variable issues
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("{name} is not a number: '{value}'")]
    NotANumber { name: String, value: String },

    #[error("{name} must be a finite positive number, got {value}")]
    NotPositive { name: String, value: f64 },
}

/// Parse an optional raw override value into a positive float
///
/// `None` (variable unset) and blank strings fall back to `default`.
///
/// # Example
///
/// ```
/// use hornsim_env::env_utils::parse_positive;
///
/// assert_eq!(parse_positive("X", Some("340.5"), 343.0).unwrap(), 340.5);
/// assert_eq!(parse_positive("X", None, 343.0).unwrap(), 343.0);
/// ```
pub fn parse_positive(name: &str, raw: Option<&str>, default: f64) -> Result<f64, EnvError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    let value: f64 = raw.parse().map_err(|_| EnvError::NotANumber {
        name: name.to_string(),
        value: raw.to_string(),
    })?;
    if !value.is_finite() || value <= 0.0 {
        return Err(EnvError::NotPositive {
            name: name.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Speed of sound from `HORNSIM_SPEED_OF_SOUND`, or the 20°C default
pub fn speed_of_sound_from_env() -> Result<f64, EnvError> {
    let raw = env::var(SPEED_OF_SOUND_VAR).ok();
    parse_positive(SPEED_OF_SOUND_VAR, raw.as_deref(), SPEED_OF_SOUND)
}

/// Air density from `HORNSIM_AIR_DENSITY`, or the 20°C default
pub fn air_density_from_env() -> Result<f64, EnvError> {
    let raw = env::var(AIR_DENSITY_VAR).ok();
    parse_positive(AIR_DENSITY_VAR, raw.as_deref(), AIR_DENSITY)
}

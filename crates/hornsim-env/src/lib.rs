//! Hornsim Environment and Constants
//!
//! This crate provides shared environment utilities and constants for the hornsim workspace.
//! It centralizes the ambient defaults (speed of sound, air density) and their environment
//! variable overrides.

pub mod constants;
pub mod env_utils;

// Re-export commonly used items
pub use constants::{AIR_DENSITY, SPEED_OF_SOUND};
pub use env_utils::{
    AIR_DENSITY_VAR, EnvError, SPEED_OF_SOUND_VAR, air_density_from_env, parse_positive,
    speed_of_sound_from_env,
};

//! Profile and configuration JSON files.
//!
//! Profiles are stored as an array of `{ "z": mm, "radius": mm }` objects,
//! throat first.

use std::fs;
use std::path::Path;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::profile::{Profile, ProfilePoint};

/// Parse a profile from JSON text; the same validation as [`Profile::new`] applies.
pub fn profile_from_json_str(json: &str) -> Result<Profile> {
    let points: Vec<ProfilePoint> = serde_json::from_str(json)?;
    Profile::new(points)
}

/// Load a profile from a JSON file
pub fn load_profile(path: impl AsRef<Path>) -> Result<Profile> {
    let content = fs::read_to_string(path.as_ref())?;
    profile_from_json_str(&content)
}

/// Write a profile as pretty-printed JSON
pub fn save_profile(profile: &Profile, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(profile.points())?;
    fs::write(path.as_ref(), json)?;
    Ok(())
}

/// Load and validate an engine configuration; missing keys take their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let content = fs::read_to_string(path.as_ref())?;
    EngineConfig::from_json(&content)
}

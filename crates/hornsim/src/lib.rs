#![doc = include_str!("../README.md")]

/// Error types for hornsim operations.
pub mod error;
pub use error::{HornError, Result};

/// Plain-list serde for `Array1` curves
pub mod array_serde;
/// Engine configuration and ambient conditions
pub mod config;
/// Directivity of a circular piston in a baffle
pub mod directivity;
/// End-to-end evaluation of one or many profiles
pub mod evaluate;
/// Throat impedance with the transfer matrix method
pub mod impedance;
/// Horn profiles and the parametric shape families
pub mod profile;
/// Profile and configuration files
pub mod read;
/// On-axis frequency response
pub mod response;
/// Composite quality score
pub mod score;
/// Frequency sweeps
pub mod sweep;

// Re-export commonly used items
pub use config::{Ambient, EngineConfig};
pub use directivity::{DirectivityPattern, PolarPoint, directivity, directivity_samples};
pub use evaluate::{GeometrySummary, Report, evaluate, evaluate_many};
pub use impedance::{ImpedanceCurve, compute_impedance};
pub use profile::{GeometryMetrics, Profile, ProfilePoint, ShapeFamily, ShapeParams, generate};
pub use read::{load_config, load_profile, profile_from_json_str, save_profile};
pub use response::{FrequencyResponse, synthesize};
pub use score::{AcousticScore, Recommendation, score};
pub use sweep::log_sweep;

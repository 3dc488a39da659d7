//! Error types for the hornsim crate.
//!
//! Every failure of the engine is an input-validation failure detected before
//! numeric work starts, so each variant names the offending parameter and the
//! violated constraint. Nothing here is transient or worth retrying.

use thiserror::Error;

/// Error type for horn evaluation operations.
#[derive(Debug, Error)]
pub enum HornError {
    /// Non-physical dimensions: non-positive lengths or radii, too few points.
    #[error("invalid geometry: {parameter}: {message}")]
    InvalidGeometry {
        /// Name of the offending parameter (e.g. "throat_radius").
        parameter: String,
        /// Constraint that was violated.
        message: String,
    },

    /// Non-positive or inverted frequency bounds, too few points.
    #[error("invalid frequency sweep: {message}")]
    InvalidSweep {
        /// Constraint that was violated.
        message: String,
    },

    /// Fewer than two profile points reached the impedance solver.
    #[error("degenerate profile: {points} point(s), at least 2 required")]
    DegenerateProfile {
        /// Number of points received.
        points: usize,
    },

    /// Directivity angles outside [0, 180) or not strictly increasing.
    #[error("invalid angles: {message}")]
    InvalidAngles {
        /// Constraint that was violated.
        message: String,
    },

    /// Engine configuration rejected by validation.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Constraint that was violated.
        message: String,
    },

    /// A computation produced NaN or infinity.
    #[error("numerical failure at {frequency_hz} Hz: {message}")]
    Numerical {
        /// Frequency being evaluated.
        frequency_hz: f64,
        /// Description of the failing quantity.
        message: String,
    },

    /// I/O error wrapper.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for hornsim operations.
pub type Result<T> = std::result::Result<T, HornError>;

impl HornError {
    /// Shorthand for an [`HornError::InvalidGeometry`].
    pub fn geometry(parameter: &str, message: impl Into<String>) -> Self {
        HornError::InvalidGeometry {
            parameter: parameter.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`HornError::InvalidSweep`].
    pub fn sweep(message: impl Into<String>) -> Self {
        HornError::InvalidSweep {
            message: message.into(),
        }
    }

    /// Returns true if the caller supplied bad input (geometry, sweep, angles, config).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            HornError::InvalidGeometry { .. }
                | HornError::InvalidSweep { .. }
                | HornError::DegenerateProfile { .. }
                | HornError::InvalidAngles { .. }
                | HornError::InvalidConfig { .. }
        )
    }

    /// Returns true if this is a file/IO or parsing error.
    pub fn is_io_error(&self) -> bool {
        matches!(self, HornError::Io(_) | HornError::Json(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_parameter() {
        let e = HornError::geometry("throat_radius", "must be > 0, got -1");
        assert_eq!(
            e.to_string(),
            "invalid geometry: throat_radius: must be > 0, got -1"
        );
        assert!(e.is_input_error());
        assert!(!e.is_io_error());
    }

    #[test]
    fn test_degenerate_profile_message() {
        let e = HornError::DegenerateProfile { points: 1 };
        assert!(e.to_string().contains("1 point(s)"));
        assert!(e.is_input_error());
    }

    #[test]
    fn test_io_errors_are_classified() {
        let e: HornError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(e.is_io_error());
        assert!(!e.is_input_error());
    }
}

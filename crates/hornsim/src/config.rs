//! Engine configuration: ambient conditions and model parameters.
//!
//! Physical constants are passed explicitly to every stage.

use hornsim_env::constants;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{HornError, Result};

/// Properties of the propagation medium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Ambient {
    /// Speed of sound in m/s.
    pub speed_of_sound: f64,
    /// Air density in kg/m³.
    pub air_density: f64,
}

impl Default for Ambient {
    fn default() -> Self {
        Self {
            speed_of_sound: constants::SPEED_OF_SOUND,
            air_density: constants::AIR_DENSITY,
        }
    }
}

impl Ambient {
    /// Characteristic impedance of air, ρc (Pa·s/m).
    pub fn rho_c(&self) -> f64 {
        self.air_density * self.speed_of_sound
    }

    /// Wavenumber k = 2πf/c (rad/m).
    pub fn wavenumber(&self, frequency: f64) -> f64 {
        2.0 * std::f64::consts::PI * frequency / self.speed_of_sound
    }

    /// Defaults overridden by `HORNSIM_SPEED_OF_SOUND` / `HORNSIM_AIR_DENSITY`.
    pub fn from_env() -> Result<Self> {
        let speed_of_sound =
            hornsim_env::speed_of_sound_from_env().map_err(|e| HornError::InvalidConfig {
                message: e.to_string(),
            })?;
        let air_density =
            hornsim_env::air_density_from_env().map_err(|e| HornError::InvalidConfig {
                message: e.to_string(),
            })?;
        Ok(Self {
            speed_of_sound,
            air_density,
        })
    }
}

/// Full configuration of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    /// Propagation medium.
    pub ambient: Ambient,
    /// Viscothermal loss coefficient: α = loss_coefficient·√f.
    /// Empirical, not an authoritative physical model.
    pub loss_coefficient: f64,
    /// Amplitude (dB) of the phase-derived ripple in the frequency response.
    /// Empirical, not an authoritative physical model.
    pub ripple_db: f64,
    /// Reference sensitivity (dB SPL) of the driver.
    pub sensitivity_ref_db: f64,
    /// Angular step of the directivity samples (degrees).
    pub angle_step_deg: f64,
    /// Largest directivity angle (degrees), inclusive.
    pub max_angle_deg: f64,
    /// Frequencies at which directivity is sampled; those outside the sweep are skipped.
    pub key_frequencies_hz: Vec<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ambient: Ambient::default(),
            loss_coefficient: constants::LOSS_COEFFICIENT,
            ripple_db: constants::RESONANCE_RIPPLE_DB,
            sensitivity_ref_db: constants::SENSITIVITY_REF_DB,
            angle_step_deg: constants::ANGLE_STEP_DEG,
            max_angle_deg: constants::MAX_ANGLE_DEG,
            key_frequencies_hz: constants::KEY_FREQUENCIES_HZ.to_vec(),
        }
    }
}

impl EngineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| -> Result<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(HornError::InvalidConfig {
                    message: format!("{name} must be > 0, got {v}"),
                })
            }
        };
        let non_negative = |name: &str, v: f64| -> Result<()> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(HornError::InvalidConfig {
                    message: format!("{name} must be >= 0, got {v}"),
                })
            }
        };

        positive("ambient.speed_of_sound", self.ambient.speed_of_sound)?;
        positive("ambient.air_density", self.ambient.air_density)?;
        non_negative("loss_coefficient", self.loss_coefficient)?;
        non_negative("ripple_db", self.ripple_db)?;
        if !self.sensitivity_ref_db.is_finite() {
            return Err(HornError::InvalidConfig {
                message: format!(
                    "sensitivity_ref_db must be finite, got {}",
                    self.sensitivity_ref_db
                ),
            });
        }
        positive("angle_step_deg", self.angle_step_deg)?;
        if !(self.max_angle_deg > 0.0 && self.max_angle_deg < 180.0) {
            return Err(HornError::InvalidConfig {
                message: format!(
                    "max_angle_deg must be in (0, 180), got {}",
                    self.max_angle_deg
                ),
            });
        }
        for &f in &self.key_frequencies_hz {
            positive("key_frequencies_hz", f)?;
        }
        Ok(())
    }

    /// Load from JSON string; missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Same configuration with another medium.
    pub fn with_ambient(mut self, ambient: Ambient) -> Self {
        self.ambient = ambient;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ambient.speed_of_sound, 343.0);
        assert_eq!(config.ambient.air_density, 1.21);
        assert_eq!(config.key_frequencies_hz.len(), 5);
    }

    #[test]
    fn test_rho_c_and_wavenumber() {
        let ambient = Ambient::default();
        assert!((ambient.rho_c() - 415.03).abs() < 1e-9);
        let k = ambient.wavenumber(343.0);
        assert!((k - 2.0 * std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let config = EngineConfig::from_json(r#"{"ambient": {"speed_of_sound": 331.3}}"#).unwrap();
        assert_eq!(config.ambient.speed_of_sound, 331.3);
        assert_eq!(config.ambient.air_density, 1.21);
        assert_eq!(config.sensitivity_ref_db, 107.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.ambient.speed_of_sound = 0.0;
        assert!(matches!(
            config.validate(),
            Err(HornError::InvalidConfig { .. })
        ));

        let mut config = EngineConfig::default();
        config.max_angle_deg = 180.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_angle_deg"));

        let mut config = EngineConfig::default();
        config.key_frequencies_hz.push(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_rejects_invalid_json() {
        assert!(matches!(
            EngineConfig::from_json("{not json"),
            Err(HornError::Json(_))
        ));
    }
}

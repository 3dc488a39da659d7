//! Default physical and evaluation constants shared across the workspace.

/// Speed of sound in air (m/s) at 20°C
pub const SPEED_OF_SOUND: f64 = 343.0;

/// Air density (kg/m³) at 20°C
pub const AIR_DENSITY: f64 = 1.21;

/// Empirical viscothermal loss coefficient: α = LOSS_COEFFICIENT·√f (Np/m)
pub const LOSS_COEFFICIENT: f64 = 0.001;

/// Amplitude (dB) of the phase-derived ripple added to the synthesized response
pub const RESONANCE_RIPPLE_DB: f64 = 0.5;

/// Reference sensitivity (dB SPL) of the driver feeding the throat
pub const SENSITIVITY_REF_DB: f64 = 107.0;

/// Angular step (degrees) of directivity sampling
pub const ANGLE_STEP_DEG: f64 = 5.0;

/// Last sampled off-axis angle (degrees)
pub const MAX_ANGLE_DEG: f64 = 90.0;

/// Representative frequencies (Hz) at which directivity is sampled
pub const KEY_FREQUENCIES_HZ: [f64; 5] = [1000.0, 2000.0, 4000.0, 8000.0, 16000.0];

/// Millimetres to metres
pub const MM_TO_M: f64 = 1e-3;

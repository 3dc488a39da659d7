//! On-axis frequency response synthesized from the throat impedance.
//!
//! The level at each frequency combines the radiation efficiency of the mouth
//! (a function of ka) with the power transfer through the throat (1 − |Γ|²).
//! A small ripple derived from the impedance phase stands in for resonances;
//! it is an empirical term, not a validated physical model.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use hornsim_env::constants::MM_TO_M;

use crate::config::EngineConfig;
use crate::error::{HornError, Result};
use crate::impedance::ImpedanceCurve;
use crate::profile::Profile;
use crate::sweep::{check_frequencies, inner_half};

/// Added inside the logarithm so a dead band cannot produce -inf
const LEVEL_EPSILON: f64 = 1e-3;
/// Drop from the passband level that defines the cutoffs
const CUTOFF_DROP_DB: f64 = 3.0;
/// Relative tolerance when matching the sweep against the impedance curve
const FREQ_MATCH_TOL: f64 = 1e-9;

/// Radiation efficiency of the mouth as a function of ka
///
/// ka² below 0.5, a linear ramp from 0.25 to 1 up to ka = 2, then 1.
pub fn radiation_efficiency(ka: f64) -> f64 {
    if ka < 0.5 {
        ka * ka
    } else if ka < 2.0 {
        0.25 + 0.75 * (ka - 0.5) / 1.5
    } else {
        1.0
    }
}

/// Lower and upper passband edges (Hz)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Passband {
    /// Low cutoff (Hz)
    pub low: f64,
    /// High cutoff (Hz)
    pub high: f64,
}

/// Synthesized on-axis response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyResponse {
    /// Frequencies (Hz)
    #[serde(rename = "frequencies_hz", with = "crate::array_serde")]
    pub freq: Array1<f64>,
    /// On-axis SPL (dB)
    #[serde(rename = "spl_db", with = "crate::array_serde")]
    pub spl: Array1<f64>,
    /// −3 dB edges relative to the passband level
    #[serde(rename = "passband_hz")]
    pub passband: Passband,
    /// Highest level in the inner half of the sweep (dB)
    pub passband_level_db: f64,
    /// Mean level between the cutoffs (dB)
    pub sensitivity_db: f64,
    /// max(SPL) − min(SPL over the inner half) (dB)
    pub flatness_db: f64,
}

/// Passband edges and reference level of an SPL curve.
///
/// Returns `(low_index, high_index, passband_level)`. The low edge is the first
/// index above `passband_level − 3 dB`, the high edge the last one; the sweep
/// ends are used when nothing qualifies.
fn detect_passband(spl: &Array1<f64>) -> (usize, usize, f64) {
    let n = spl.len();
    let level = spl
        .slice(ndarray::s![inner_half(n)])
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let threshold = level - CUTOFF_DROP_DB;
    let low = spl.iter().position(|&v| v > threshold).unwrap_or(0);
    let high = spl
        .iter()
        .rposition(|&v| v > threshold)
        .unwrap_or(n.saturating_sub(1));
    (low, high, level)
}

/// Synthesize the on-axis frequency response
///
/// # Arguments
/// * `profile` - Horn profile (mm); only the mouth radius is used
/// * `impedance` - Throat impedance at the same frequencies
/// * `frequencies` - Frequencies (Hz), same length and order as `impedance`
/// * `sensitivity_ref` - Reference sensitivity (dB SPL)
/// * `config` - Ambient conditions and ripple amplitude
pub fn synthesize(
    profile: &Profile,
    impedance: &ImpedanceCurve,
    frequencies: &[f64],
    sensitivity_ref: f64,
    config: &EngineConfig,
) -> Result<FrequencyResponse> {
    check_frequencies(frequencies)?;
    if frequencies.len() != impedance.len() {
        return Err(HornError::sweep(format!(
            "impedance curve has {} entries but the sweep has {} frequencies",
            impedance.len(),
            frequencies.len()
        )));
    }
    if let Some((i, (f, g))) = frequencies
        .iter()
        .zip(impedance.freq.iter())
        .enumerate()
        .find(|(_, (f, g))| (*f - *g).abs() > FREQ_MATCH_TOL * f.abs())
    {
        return Err(HornError::sweep(format!(
            "frequency #{i} is {f} Hz but the impedance curve was computed at {g} Hz"
        )));
    }
    if !sensitivity_ref.is_finite() {
        return Err(HornError::InvalidConfig {
            message: format!("sensitivity_ref must be finite, got {sensitivity_ref}"),
        });
    }

    let mouth_radius = profile.mouth().radius * MM_TO_M;
    let spl: Array1<f64> = frequencies
        .iter()
        .enumerate()
        .map(|(i, &f)| {
            let ka = config.ambient.wavenumber(f) * mouth_radius;
            let efficiency = radiation_efficiency(ka);
            let reflection = impedance.reflection[i];
            let matching = 1.0 - reflection * reflection;
            let level = sensitivity_ref + 10.0 * (efficiency * matching + LEVEL_EPSILON).log10();
            let ripple = config.ripple_db * (2.0 * impedance.phase_deg[i].to_radians()).sin();
            level + ripple
        })
        .collect();

    let (low, high, passband_level) = detect_passband(&spl);
    let passband_slice = spl.slice(ndarray::s![low..=high.max(low)]);
    let sensitivity = passband_slice.mean().unwrap_or(passband_level);
    let max_spl = spl.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_inner = spl
        .slice(ndarray::s![inner_half(spl.len())])
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);

    Ok(FrequencyResponse {
        freq: Array1::from_vec(frequencies.to_vec()),
        passband: Passband {
            low: frequencies[low],
            high: frequencies[high],
        },
        passband_level_db: passband_level,
        sensitivity_db: sensitivity,
        flatness_db: max_spl - min_inner,
        spl,
    })
}

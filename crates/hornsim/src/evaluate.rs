//! Evaluation driver: profile in, report out.
//!
//! One call runs the sweep, the TMM solver, the response synthesizer, the
//! directivity model at the key frequencies and the scoring aggregator, and
//! gathers everything into a serializable [`Report`].

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use hornsim_env::constants::MM_TO_M;

use crate::config::EngineConfig;
use crate::directivity::{DirectivityPattern, directivity_samples};
use crate::error::Result;
use crate::impedance::{ImpedanceCurve, compute_impedance};
use crate::profile::{GeometryMetrics, Profile};
use crate::response::{FrequencyResponse, synthesize};
use crate::score::{AcousticScore, score};
use crate::sweep::log_sweep;

/// Headline dimensions of the evaluated horn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometrySummary {
    /// Throat diameter (mm)
    pub throat_diameter_mm: f64,
    /// Mouth diameter (mm)
    pub mouth_diameter_mm: f64,
    /// Axial length (mm)
    pub length_mm: f64,
    /// Mouth radius / throat radius
    pub expansion_ratio: f64,
}

impl GeometrySummary {
    /// Summarize a profile given in radii
    pub fn from_profile(profile: &Profile) -> Self {
        let throat = profile.throat().radius;
        let mouth = profile.mouth().radius;
        Self {
            throat_diameter_mm: 2.0 * throat,
            mouth_diameter_mm: 2.0 * mouth,
            length_mm: profile.length(),
            expansion_ratio: mouth / throat,
        }
    }
}

/// Sweep used for the evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// First sweep frequency (Hz)
    pub freq_min_hz: f64,
    /// Last sweep frequency (Hz)
    pub freq_max_hz: f64,
    /// Number of sweep frequencies
    pub freq_points: usize,
}

/// Scalar digest of the impedance curve plus the curve itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpedanceSummary {
    /// Mean |Z| over the sweep
    pub mean_magnitude: f64,
    /// (min, max) phase in degrees
    pub phase_range_deg: (f64, f64),
    /// Mean |Γ| over the sweep
    pub mean_reflection: f64,
    /// Full curve
    pub data: ImpedanceCurve,
}

impl From<ImpedanceCurve> for ImpedanceSummary {
    fn from(curve: ImpedanceCurve) -> Self {
        Self {
            mean_magnitude: curve.mean_magnitude(),
            phase_range_deg: curve.phase_range(),
            mean_reflection: curve.mean_reflection(),
            data: curve,
        }
    }
}

/// Directivity at the key frequencies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectivitySummary {
    /// One pattern per key frequency inside the sweep, ascending
    pub samples: Vec<DirectivityPattern>,
    /// Mean DI over the samples, 0 when there are none
    pub average_di_db: f64,
}

impl DirectivitySummary {
    fn new(samples: Vec<DirectivityPattern>) -> Self {
        let average_di_db = if samples.is_empty() {
            0.0
        } else {
            samples.iter().map(|s| s.directivity_index_db).sum::<f64>() / samples.len() as f64
        };
        Self {
            samples,
            average_di_db,
        }
    }
}

/// Complete result of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Headline dimensions
    pub geometry: GeometrySummary,
    /// Arc length, volume, surface and fractal dimension
    pub metrics: GeometryMetrics,
    /// Sweep settings
    pub simulation: SimulationSettings,
    /// Throat impedance
    pub impedance: ImpedanceSummary,
    /// On-axis response
    pub frequency_response: FrequencyResponse,
    /// Polar behaviour at the key frequencies
    pub directivity: DirectivitySummary,
    /// Composite score
    pub score: AcousticScore,
}

/// Evaluate a single profile over a logarithmic sweep
///
/// # Arguments
/// * `profile` - Horn profile (mm)
/// * `freq_min`, `freq_max` - Sweep bounds (Hz)
/// * `freq_points` - Number of sweep frequencies, >= 2
/// * `config` - Engine configuration
///
/// # Returns
/// The full report, or the first validation / numerical error encountered
pub fn evaluate(
    profile: &Profile,
    freq_min: f64,
    freq_max: f64,
    freq_points: usize,
    config: &EngineConfig,
) -> Result<Report> {
    config.validate()?;
    let freqs = log_sweep(freq_min, freq_max, freq_points)?;
    let freqs = freqs.to_vec();

    let geometry = GeometrySummary::from_profile(profile);
    info!(
        "Evaluating horn: throat {:.1} mm, mouth {:.1} mm, length {:.1} mm, {} points, {:.0}-{:.0} Hz",
        geometry.throat_diameter_mm,
        geometry.mouth_diameter_mm,
        geometry.length_mm,
        profile.len(),
        freq_min,
        freq_max
    );

    let impedance = compute_impedance(profile.points(), &freqs, config)?;
    debug!(
        "impedance: mean |Z| {:.1}, mean |Γ| {:.3}",
        impedance.mean_magnitude(),
        impedance.mean_reflection()
    );

    let response = synthesize(profile, &impedance, &freqs, config.sensitivity_ref_db, config)?;
    debug!(
        "response: passband {:.0}-{:.0} Hz, sensitivity {:.1} dB, flatness {:.2} dB",
        response.passband.low, response.passband.high, response.sensitivity_db, response.flatness_db
    );

    let key_freqs: Vec<f64> = config
        .key_frequencies_hz
        .iter()
        .copied()
        .filter(|f| (freq_min..=freq_max).contains(f))
        .collect();
    if key_freqs.is_empty() {
        warn!(
            "no key frequency inside {freq_min:.0}-{freq_max:.0} Hz, directivity not sampled"
        );
    }
    let mouth_radius_m = profile.mouth().radius * MM_TO_M;
    let samples = directivity_samples(mouth_radius_m, &key_freqs, config)?;
    for s in &samples {
        debug!(
            "directivity @ {:.0} Hz: ka {:.2}, -6 dB {:.1}°, DI {:.1} dB",
            s.frequency_hz, s.ka, s.coverage_6db_deg, s.directivity_index_db
        );
    }

    let acoustic_score = score(&impedance, &response, &samples);
    info!(
        "Score {:.3} ({})",
        acoustic_score.overall, acoustic_score.recommendation
    );

    Ok(Report {
        geometry,
        metrics: GeometryMetrics::from_profile(profile),
        simulation: SimulationSettings {
            freq_min_hz: freq_min,
            freq_max_hz: freq_max,
            freq_points,
        },
        impedance: impedance.into(),
        frequency_response: response,
        directivity: DirectivitySummary::new(samples),
        score: acoustic_score,
    })
}

/// Evaluate several named profiles concurrently; results keep input order.
pub fn evaluate_many(
    profiles: &[(String, Profile)],
    freq_min: f64,
    freq_max: f64,
    freq_points: usize,
    config: &EngineConfig,
) -> Vec<(String, Result<Report>)> {
    profiles
        .par_iter()
        .map(|(name, profile)| {
            (
                name.clone(),
                evaluate(profile, freq_min, freq_max, freq_points, config),
            )
        })
        .collect()
}

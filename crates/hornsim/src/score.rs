//! Composite acoustic quality score.
//!
//! Four normalized sub-scores are combined with fixed weights into a single
//! value in [0, 1] that ranks competing geometries.

use ndarray::{Array1, ArrayView1, s};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::directivity::DirectivityPattern;
use crate::impedance::ImpedanceCurve;
use crate::response::FrequencyResponse;
use crate::sweep::inner_half;

/// Weight of the impedance smoothness sub-score
pub const WEIGHT_SMOOTHNESS: f64 = 0.35;
/// Weight of the frequency flatness sub-score
pub const WEIGHT_FLATNESS: f64 = 0.30;
/// Weight of the polar uniformity sub-score
pub const WEIGHT_UNIFORMITY: f64 = 0.25;
/// Weight of the distortion sub-score
pub const WEIGHT_DISTORTION: f64 = 0.10;

/// SPL spread (dB) over the inner half that brings flatness to zero
const FLATNESS_SPAN_DB: f64 = 6.0;

/// Design recommendation derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    /// overall > 0.85
    Excellent,
    /// overall > 0.7
    Good,
    /// overall > 0.5
    Acceptable,
    /// everything else
    Poor,
}

impl Recommendation {
    /// Tier for an overall score; the first threshold exceeded wins.
    pub fn from_score(overall: f64) -> Self {
        if overall > 0.85 {
            Recommendation::Excellent
        } else if overall > 0.7 {
            Recommendation::Good
        } else if overall > 0.5 {
            Recommendation::Acceptable
        } else {
            Recommendation::Poor
        }
    }

    /// Advice attached to the tier
    pub fn description(&self) -> &'static str {
        match self {
            Recommendation::Excellent => "Excellent - proceed to fabrication",
            Recommendation::Good => "Good - consider minor optimization",
            Recommendation::Acceptable => "Acceptable - recommend iteration",
            Recommendation::Poor => "Poor - major revision needed",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Recommendation::Excellent => "excellent",
            Recommendation::Good => "good",
            Recommendation::Acceptable => "acceptable",
            Recommendation::Poor => "poor",
        };
        f.write_str(name)
    }
}

/// Sub-scores, overall score and tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcousticScore {
    /// 1 − coefficient of variation of |Z|
    pub impedance_smoothness: f64,
    /// Penalizes the SPL spread over the inner half of the sweep
    pub frequency_flatness: f64,
    /// 1 − coefficient of variation of the −6 dB coverage
    pub polar_uniformity: f64,
    /// 1 − max |Γ|
    pub distortion_score: f64,
    /// Weighted sum of the four sub-scores, in [0, 1]
    pub overall: f64,
    /// Tier derived from `overall`
    pub recommendation: Recommendation,
}

/// `1 − stddev/mean` (population stddev), or `fallback` when there is nothing to measure
fn coefficient_score(values: ArrayView1<f64>, fallback: f64) -> f64 {
    match values.mean() {
        Some(m) if m > 0.0 => 1.0 - values.std(0.0) / m,
        _ => fallback,
    }
}

/// Score one evaluated geometry
///
/// * smoothness: 1 − stddev(|Z|)/mean(|Z|)
/// * flatness: 1 − (SPL spread over the inner half)/6 dB
/// * uniformity: 1 − stddev(cov6)/mean(cov6) across directivity samples
/// * distortion: 1 − max |Γ|
///
/// Sub-scores are clamped to [0, 1] before weighting.
pub fn score(
    impedance: &ImpedanceCurve,
    response: &FrequencyResponse,
    directivity: &[DirectivityPattern],
) -> AcousticScore {
    let smoothness = coefficient_score(impedance.magnitude.view(), 0.0).clamp(0.0, 1.0);

    let inner = response.spl.slice(s![inner_half(response.spl.len())]);
    let flatness = if inner.is_empty() {
        0.5
    } else {
        let max = inner.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = inner.iter().copied().fold(f64::INFINITY, f64::min);
        1.0 - (max - min) / FLATNESS_SPAN_DB
    }
    .clamp(0.0, 1.0);

    let coverages: Array1<f64> = directivity.iter().map(|d| d.coverage_6db_deg).collect();
    let uniformity = coefficient_score(coverages.view(), 0.5).clamp(0.0, 1.0);

    let max_reflection = impedance.reflection.iter().copied().fold(0.0, f64::max);
    let distortion = (1.0 - max_reflection).clamp(0.0, 1.0);

    let overall = (WEIGHT_SMOOTHNESS * smoothness
        + WEIGHT_FLATNESS * flatness
        + WEIGHT_UNIFORMITY * uniformity
        + WEIGHT_DISTORTION * distortion)
        .clamp(0.0, 1.0);

    AcousticScore {
        impedance_smoothness: smoothness,
        frequency_flatness: flatness,
        polar_uniformity: uniformity,
        distortion_score: distortion,
        overall,
        recommendation: Recommendation::from_score(overall),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Passband;

    fn curve(magnitude: &[f64], reflection: &[f64]) -> ImpedanceCurve {
        let n = magnitude.len();
        ImpedanceCurve {
            freq: Array1::linspace(500.0, 20000.0, n),
            real: Array1::from_vec(magnitude.to_vec()),
            imag: Array1::zeros(n),
            magnitude: Array1::from_vec(magnitude.to_vec()),
            phase_deg: Array1::zeros(n),
            reflection: Array1::from_vec(reflection.to_vec()),
        }
    }

    fn response(spl: &[f64]) -> FrequencyResponse {
        let n = spl.len();
        FrequencyResponse {
            freq: Array1::linspace(500.0, 20000.0, n),
            spl: Array1::from_vec(spl.to_vec()),
            passband: Passband {
                low: 500.0,
                high: 20000.0,
            },
            passband_level_db: 100.0,
            sensitivity_db: 100.0,
            flatness_db: 0.0,
        }
    }

    fn pattern(cov6: f64) -> DirectivityPattern {
        DirectivityPattern {
            frequency_hz: 1000.0,
            ka: 1.0,
            points: Vec::new(),
            coverage_6db_deg: cov6,
            coverage_10db_deg: cov6 * 1.3,
            directivity_index_db: 6.0,
        }
    }

    #[test]
    fn test_perfect_inputs_score_excellent() {
        let s = score(
            &curve(&[400.0; 8], &[0.0; 8]),
            &response(&[100.0; 8]),
            &[pattern(60.0), pattern(60.0)],
        );
        assert_eq!(s.impedance_smoothness, 1.0);
        assert_eq!(s.frequency_flatness, 1.0);
        assert_eq!(s.polar_uniformity, 1.0);
        assert_eq!(s.distortion_score, 1.0);
        assert!((s.overall - 1.0).abs() < 1e-12);
        assert_eq!(s.recommendation, Recommendation::Excellent);
    }

    #[test]
    fn test_flatness_uses_inner_half_only() {
        // the outliers at the ends fall outside [n/4, 3n/4)
        let spl = [40.0, 100.0, 103.0, 140.0];
        let s = score(&curve(&[1.0; 4], &[0.0; 4]), &response(&spl), &[]);
        assert!((s.frequency_flatness - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fallbacks() {
        let s = score(&curve(&[], &[]), &response(&[]), &[]);
        assert_eq!(s.impedance_smoothness, 0.0);
        assert_eq!(s.frequency_flatness, 0.5);
        assert_eq!(s.polar_uniformity, 0.5);
        assert_eq!(s.distortion_score, 1.0);
        let s = score(&curve(&[1.0], &[0.0]), &response(&[1.0]), &[pattern(0.0)]);
        assert_eq!(s.polar_uniformity, 0.5);
    }

    #[test]
    fn test_sub_scores_are_clamped() {
        let s = score(
            &curve(&[1.0, 1000.0, 1.0, 1000.0], &[1.0, 0.9, 0.8, 0.7]),
            &response(&[0.0, 0.0, 50.0, 0.0]),
            &[pattern(1.0), pattern(300.0)],
        );
        for v in [
            s.impedance_smoothness,
            s.frequency_flatness,
            s.polar_uniformity,
            s.distortion_score,
            s.overall,
        ] {
            assert!((0.0..=1.0).contains(&v), "{v} out of range");
        }
        assert_eq!(s.frequency_flatness, 0.0);
        assert_eq!(s.distortion_score, 0.0);
        assert_eq!(s.recommendation, Recommendation::Poor);
    }

    #[test]
    fn test_score_is_idempotent() {
        let imp = curve(&[300.0, 420.0, 380.0, 410.0, 395.0], &[0.3, 0.1, 0.05, 0.02, 0.01]);
        let fr = response(&[95.0, 101.0, 102.5, 101.8, 99.0]);
        let dirs = [pattern(80.0), pattern(55.0), pattern(40.0)];
        let a = score(&imp, &fr, &dirs);
        let b = score(&imp, &fr, &dirs);
        assert_eq!(a, b);
        assert_eq!(a.overall.to_bits(), b.overall.to_bits());
    }

    #[test]
    fn test_tiers() {
        assert_eq!(Recommendation::from_score(0.9), Recommendation::Excellent);
        assert_eq!(Recommendation::from_score(0.85), Recommendation::Good);
        assert_eq!(Recommendation::from_score(0.71), Recommendation::Good);
        assert_eq!(Recommendation::from_score(0.7), Recommendation::Acceptable);
        assert_eq!(Recommendation::from_score(0.5), Recommendation::Poor);
        assert_eq!(Recommendation::Good.to_string(), "good");
        assert!(Recommendation::Poor.description().starts_with("Poor"));
        assert_eq!(
            serde_json::to_string(&Recommendation::Acceptable).unwrap(),
            "\"acceptable\""
        );
    }
}

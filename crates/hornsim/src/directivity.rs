//! Directivity of the horn mouth modelled as a rigid circular piston in an
//! infinite baffle.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::config::{Ambient, EngineConfig};
use crate::error::{HornError, Result};

/// Below this |ka·sin θ| the pattern is taken as on-axis (avoids 0/0)
const ON_AXIS_X: f64 = 1e-3;
/// Floor on |D| before taking the logarithm
const D_FLOOR: f64 = 1e-10;
/// Switch from the power series to the asymptotic form of J1
const J1_SERIES_LIMIT: f64 = 3.0;

/// First-order Bessel function of the first kind, J1(x)
///
/// Four-term power series for |x| < 3, large-argument asymptotic form otherwise.
pub fn bessel_j1(x: f64) -> f64 {
    if x.abs() < J1_SERIES_LIMIT {
        let x2 = x * x;
        x / 2.0 * (1.0 - x2 / 8.0 + x2 * x2 / 192.0 - x2 * x2 * x2 / 9216.0)
    } else {
        (2.0 / (PI * x)).sqrt() * (x - 3.0 * PI / 4.0).cos()
    }
}

/// Piston directivity factor D(θ) = 2·J1(ka·sin θ)/(ka·sin θ), 1 on axis
pub fn piston_factor(ka: f64, angle_deg: f64) -> f64 {
    if angle_deg == 0.0 {
        return 1.0;
    }
    let x = ka * angle_deg.to_radians().sin();
    if x.abs() < ON_AXIS_X {
        1.0
    } else {
        2.0 * bessel_j1(x) / x
    }
}

/// Level at one angle, relative to on-axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    /// Angle from the axis (degrees)
    pub angle_deg: f64,
    /// SPL relative to on-axis (dB)
    pub relative_spl_db: f64,
}

/// Polar response at one frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectivityPattern {
    /// Frequency (Hz)
    pub frequency_hz: f64,
    /// Wavenumber times mouth radius
    pub ka: f64,
    /// Samples ordered by increasing angle, starting on axis
    #[serde(rename = "directivity")]
    pub points: Vec<PolarPoint>,
    /// Angle where the level first falls below −6 dB
    pub coverage_6db_deg: f64,
    /// Angle where the level first falls below −10 dB
    pub coverage_10db_deg: f64,
    /// Directivity index (dB)
    pub directivity_index_db: f64,
}

impl DirectivityPattern {
    /// See [`coverage_at`]
    pub fn coverage_at(&self, level_db: f64) -> f64 {
        coverage_at(&self.points, level_db)
    }
}

/// Angle at which the level first drops below `level_db`
///
/// Scans from the first sample outward and interpolates linearly between the
/// two bracketing samples. Returns 0 when the first sample is already below,
/// and the last angle when the threshold is never crossed.
pub fn coverage_at(points: &[PolarPoint], level_db: f64) -> f64 {
    for (i, point) in points.iter().enumerate() {
        if point.relative_spl_db < level_db {
            if i == 0 {
                return 0.0;
            }
            let prev = points[i - 1];
            let frac =
                (level_db - prev.relative_spl_db) / (point.relative_spl_db - prev.relative_spl_db);
            return prev.angle_deg + frac * (point.angle_deg - prev.angle_deg);
        }
    }
    points.last().map(|p| p.angle_deg).unwrap_or(0.0)
}

/// Directivity index from a polar pattern, assuming rotational symmetry
///
/// # Formula
/// total = Σ ((d_i + d_{i+1})/2)² · sin(θ_mid) · Δθ, with d = 10^(spl/20)
/// DI = 10·log10(4π / (2π·total)), 0 when the integral is not positive
pub fn directivity_index(points: &[PolarPoint]) -> f64 {
    let total: f64 = points
        .windows(2)
        .map(|w| {
            let a1 = w[0].angle_deg.to_radians();
            let a2 = w[1].angle_deg.to_radians();
            let d1 = 10f64.powf(w[0].relative_spl_db / 20.0);
            let d2 = 10f64.powf(w[1].relative_spl_db / 20.0);
            let d_avg = (d1 + d2) / 2.0;
            d_avg * d_avg * ((a1 + a2) / 2.0).sin() * (a2 - a1)
        })
        .sum();
    let solid_angle = 2.0 * PI * total;
    if solid_angle > 0.0 {
        10.0 * (4.0 * PI / solid_angle).log10()
    } else {
        0.0
    }
}

/// Angles 0, step, 2·step, ... up to `max_deg` inclusive
pub fn standard_angles(step_deg: f64, max_deg: f64) -> Vec<f64> {
    let count = (max_deg / step_deg + 1e-9).floor() as usize;
    (0..=count).map(|i| i as f64 * step_deg).collect()
}

fn check_angles(angles_deg: &[f64]) -> Result<()> {
    if angles_deg.is_empty() {
        return Err(HornError::InvalidAngles {
            message: "at least one angle required".to_string(),
        });
    }
    if let Some(a) = angles_deg
        .iter()
        .find(|a| !(a.is_finite() && (0.0..180.0).contains(*a)))
    {
        return Err(HornError::InvalidAngles {
            message: format!("angle {a} outside [0, 180)"),
        });
    }
    if angles_deg.windows(2).any(|w| w[1] <= w[0]) {
        return Err(HornError::InvalidAngles {
            message: "angles must be strictly increasing".to_string(),
        });
    }
    Ok(())
}

/// Compute the polar pattern of a piston of radius `mouth_radius` at `frequency`
///
/// # Arguments
/// * `mouth_radius` - Piston radius (m)
/// * `frequency` - Frequency (Hz)
/// * `angles_deg` - Strictly increasing angles in [0, 180)
/// * `ambient` - Propagation medium
pub fn directivity(
    mouth_radius: f64,
    frequency: f64,
    angles_deg: &[f64],
    ambient: &Ambient,
) -> Result<DirectivityPattern> {
    if !(mouth_radius.is_finite() && mouth_radius > 0.0) {
        return Err(HornError::geometry(
            "mouth_radius",
            format!("must be a finite value > 0, got {mouth_radius}"),
        ));
    }
    if !(frequency.is_finite() && frequency > 0.0) {
        return Err(HornError::sweep(format!(
            "directivity frequency must be > 0, got {frequency}"
        )));
    }
    check_angles(angles_deg)?;

    let ka = ambient.wavenumber(frequency) * mouth_radius;
    let points: Vec<PolarPoint> = angles_deg
        .iter()
        .map(|&angle_deg| {
            let d = piston_factor(ka, angle_deg);
            PolarPoint {
                angle_deg,
                relative_spl_db: 20.0 * d.abs().max(D_FLOOR).log10(),
            }
        })
        .collect();

    Ok(DirectivityPattern {
        frequency_hz: frequency,
        ka,
        coverage_6db_deg: coverage_at(&points, -6.0),
        coverage_10db_deg: coverage_at(&points, -10.0),
        directivity_index_db: directivity_index(&points),
        points,
    })
}

/// Directivity patterns at several frequencies over the configured angle grid
pub fn directivity_samples(
    mouth_radius: f64,
    frequencies: &[f64],
    config: &EngineConfig,
) -> Result<Vec<DirectivityPattern>> {
    let angles = standard_angles(config.angle_step_deg, config.max_angle_deg);
    frequencies
        .par_iter()
        .map(|&f| directivity(mouth_radius, f, &angles, &config.ambient))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(mouth_radius: f64, f: f64) -> DirectivityPattern {
        directivity(
            mouth_radius,
            f,
            &standard_angles(5.0, 90.0),
            &Ambient::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_bessel_j1_reference_values() {
        assert_eq!(bessel_j1(0.0), 0.0);
        // J1(1) = 0.44005
        assert!((bessel_j1(1.0) - 0.440_05).abs() < 1e-4);
        // J1(2) = 0.57672
        assert!((bessel_j1(2.0) - 0.576_72).abs() < 2e-3);
        // J1(10) = 0.04347, asymptotic form
        assert!((bessel_j1(10.0) - 0.043_47).abs() < 1.5e-2);
        assert!((bessel_j1(-1.0) + bessel_j1(1.0)).abs() < 1e-15);
    }

    #[test]
    fn test_on_axis_is_zero_db() {
        for radius in [0.01, 0.15, 1.0] {
            for f in [20.0, 1000.0, 20000.0] {
                let p = pattern(radius, f);
                assert_eq!(p.points[0].angle_deg, 0.0);
                assert_eq!(p.points[0].relative_spl_db, 0.0);
            }
        }
    }

    #[test]
    fn test_small_piston_is_omnidirectional() {
        // ka ≈ 0.0009: every |x| < 1e-3
        let p = pattern(0.005, 10.0);
        assert!(p.points.iter().all(|pt| pt.relative_spl_db == 0.0));
        assert_eq!(p.coverage_6db_deg, 90.0);
        assert_eq!(p.coverage_10db_deg, 90.0);
        // hemisphere of unit intensity: DI ≈ 10·log10(2) ≈ 3 dB
        assert!((p.directivity_index_db - 3.0).abs() < 0.1);
    }

    #[test]
    fn test_coverage_narrows_with_frequency() {
        let low = pattern(0.15, 2000.0);
        let high = pattern(0.15, 8000.0);
        assert!(high.coverage_6db_deg < low.coverage_6db_deg);
        assert!(high.directivity_index_db > low.directivity_index_db);
    }

    #[test]
    fn test_stricter_threshold_is_reached_later() {
        let p = pattern(0.15, 4000.0);
        assert!(p.coverage_10db_deg >= p.coverage_6db_deg);
        // synthetic monotone pattern
        let points: Vec<PolarPoint> = (0..=18)
            .map(|i| PolarPoint {
                angle_deg: i as f64 * 5.0,
                relative_spl_db: -(i as f64) * 1.3,
            })
            .collect();
        let c6 = coverage_at(&points, -6.0);
        let c10 = coverage_at(&points, -10.0);
        assert!(c10 >= c6);
        // -6 dB lies between samples 4 (-5.2) and 5 (-6.5)
        assert!((c6 - (20.0 + 5.0 * 0.8 / 1.3)).abs() < 1e-9);
    }

    #[test]
    fn test_coverage_edge_cases() {
        let points = vec![
            PolarPoint {
                angle_deg: 0.0,
                relative_spl_db: -12.0,
            },
            PolarPoint {
                angle_deg: 5.0,
                relative_spl_db: -20.0,
            },
        ];
        assert_eq!(coverage_at(&points, -6.0), 0.0);
        let flat = vec![
            PolarPoint {
                angle_deg: 0.0,
                relative_spl_db: 0.0,
            },
            PolarPoint {
                angle_deg: 45.0,
                relative_spl_db: -1.0,
            },
        ];
        assert_eq!(coverage_at(&flat, -6.0), 45.0);
        assert_eq!(coverage_at(&[], -6.0), 0.0);
    }

    #[test]
    fn test_directivity_index_non_positive_integral() {
        let single = [PolarPoint {
            angle_deg: 0.0,
            relative_spl_db: 0.0,
        }];
        assert_eq!(directivity_index(&single), 0.0);
    }

    #[test]
    fn test_levels_are_finite_in_nulls() {
        let p = pattern(0.3, 16000.0);
        assert!(p.points.iter().all(|pt| pt.relative_spl_db.is_finite()));
        assert!(p.points.iter().all(|pt| pt.relative_spl_db >= -200.0));
    }

    #[test]
    fn test_standard_angles() {
        let a = standard_angles(5.0, 90.0);
        assert_eq!(a.len(), 19);
        assert_eq!(a[0], 0.0);
        assert_eq!(a[18], 90.0);
        assert_eq!(standard_angles(7.0, 20.0), vec![0.0, 7.0, 14.0]);
    }

    #[test]
    fn test_invalid_inputs() {
        let ambient = Ambient::default();
        assert!(matches!(
            directivity(0.1, 1000.0, &[0.0, 180.0], &ambient),
            Err(HornError::InvalidAngles { .. })
        ));
        assert!(matches!(
            directivity(0.1, 1000.0, &[0.0, 10.0, 5.0], &ambient),
            Err(HornError::InvalidAngles { .. })
        ));
        assert!(matches!(
            directivity(0.1, 1000.0, &[], &ambient),
            Err(HornError::InvalidAngles { .. })
        ));
        assert!(matches!(
            directivity(0.0, 1000.0, &[0.0], &ambient),
            Err(HornError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            directivity(0.1, 0.0, &[0.0], &ambient),
            Err(HornError::InvalidSweep { .. })
        ));
    }

    #[test]
    fn test_samples_keep_frequency_order() {
        let config = EngineConfig::default();
        let freqs = [16000.0, 1000.0, 4000.0];
        let samples = directivity_samples(0.15, &freqs, &config).unwrap();
        let got: Vec<f64> = samples.iter().map(|s| s.frequency_hz).collect();
        assert_eq!(got, freqs.to_vec());
        assert!(samples.iter().all(|s| s.points.len() == 19));
    }
}

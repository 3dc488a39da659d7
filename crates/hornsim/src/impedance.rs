//! Throat impedance by the Transfer Matrix Method.
//!
//! The horn is cut into short conical segments between consecutive profile
//! points. Starting from the radiation load of a piston in an infinite baffle
//! at the mouth, each segment transforms the impedance seen at its far end into
//! the impedance at its near end (telegrapher's equations). Walking the segments
//! from mouth to throat yields the throat impedance.
//!
//! All impedances use the ρc·area convention: the radiation load, the segment
//! characteristic impedance and the throat normalization share the same units.

use log::debug;
use ndarray::Array1;
use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use hornsim_env::constants::MM_TO_M;

use crate::config::{Ambient, EngineConfig};
use crate::error::{HornError, Result};
use crate::profile::{ProfilePoint, check_points};
use crate::sweep::check_frequencies;

/// ka at which the radiation load switches from the series to the asymptotic form
pub const RADIATION_REGIME_KA: f64 = 2.0;

/// One conical slice of the horn, in SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Axial length (m)
    pub length: f64,
    /// Cross-section at the throat side (m²)
    pub area_in: f64,
    /// Cross-section at the mouth side (m²)
    pub area_out: f64,
    /// Mean of both cross-sections (m²)
    pub avg_area: f64,
}

impl Segment {
    /// Build the segment between two profile points given in millimetres
    pub fn between(a: &ProfilePoint, b: &ProfilePoint) -> Self {
        let area_in = circle_area(a.radius * MM_TO_M);
        let area_out = circle_area(b.radius * MM_TO_M);
        Self {
            length: (b.position - a.position) * MM_TO_M,
            area_in,
            area_out,
            avg_area: (area_in + area_out) / 2.0,
        }
    }
}

fn circle_area(radius: f64) -> f64 {
    PI * radius * radius
}

/// Split a profile into its segments, throat first
pub fn segments(points: &[ProfilePoint]) -> Vec<Segment> {
    points
        .windows(2)
        .map(|w| Segment::between(&w[0], &w[1]))
        .collect()
}

/// Radiation impedance of a piston in an infinite baffle
///
/// # Arguments
/// * `ka` - Wavenumber times mouth radius
/// * `mouth_area` - Mouth area S (m²)
/// * `ambient` - Propagation medium
///
/// # Formula
/// * ka < 2: ρcS·(ka²/2) + jρcS·(8ka/3π)
/// * ka ≥ 2: ρcS·(1 − sin(2ka)/(2ka)) + jρcS·(sin²(ka)/ka)
pub fn radiation_impedance(ka: f64, mouth_area: f64, ambient: &Ambient) -> Complex64 {
    let z_s = ambient.rho_c() * mouth_area;
    if ka < RADIATION_REGIME_KA {
        Complex64::new(z_s * ka * ka / 2.0, z_s * 8.0 * ka / (3.0 * PI))
    } else {
        let s = ka.sin();
        Complex64::new(
            z_s * (1.0 - (2.0 * ka).sin() / (2.0 * ka)),
            z_s * s * s / ka,
        )
    }
}

/// Impedance seen at the input of a lossy line of characteristic impedance `z0`
/// terminated by `z_load`.
///
/// Z_in = Z0·(Z_L·cosh(γL) + Z0·sinh(γL)) / (Z0·cosh(γL) + Z_L·sinh(γL))
pub fn transform_impedance(z_load: Complex64, z0: f64, gamma: Complex64, length: f64) -> Complex64 {
    let gl = gamma * length;
    let (cosh_gl, sinh_gl) = (gl.cosh(), gl.sinh());
    let z0 = Complex64::new(z0, 0.0);
    z0 * (z_load * cosh_gl + z0 * sinh_gl) / (z0 * cosh_gl + z_load * sinh_gl)
}

/// Throat impedance over frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpedanceCurve {
    /// Frequencies (Hz)
    #[serde(rename = "frequencies_hz", with = "crate::array_serde")]
    pub freq: Array1<f64>,
    /// Real part of the throat impedance
    #[serde(rename = "impedance_real", with = "crate::array_serde")]
    pub real: Array1<f64>,
    /// Imaginary part of the throat impedance
    #[serde(rename = "impedance_imag", with = "crate::array_serde")]
    pub imag: Array1<f64>,
    /// |Z|
    #[serde(rename = "impedance_magnitude", with = "crate::array_serde")]
    pub magnitude: Array1<f64>,
    /// arg(Z) in degrees
    #[serde(rename = "impedance_phase", with = "crate::array_serde")]
    pub phase_deg: Array1<f64>,
    /// |Γ| against the throat characteristic impedance, in [0, 1]
    #[serde(rename = "reflection_coefficient", with = "crate::array_serde")]
    pub reflection: Array1<f64>,
}

impl ImpedanceCurve {
    fn from_points(freq: Array1<f64>, points: &[(Complex64, f64)]) -> Self {
        let real = points.iter().map(|(z, _)| z.re).collect();
        let imag = points.iter().map(|(z, _)| z.im).collect();
        let magnitude = points.iter().map(|(z, _)| z.norm()).collect();
        let phase_deg = points.iter().map(|(z, _)| z.arg().to_degrees()).collect();
        let reflection = points.iter().map(|(_, r)| *r).collect();
        Self {
            freq,
            real,
            imag,
            magnitude,
            phase_deg,
            reflection,
        }
    }

    /// Number of frequencies
    pub fn len(&self) -> usize {
        self.freq.len()
    }

    /// True when no frequency was evaluated
    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }

    /// Complex throat impedance at index `i`
    pub fn impedance_at(&self, i: usize) -> Complex64 {
        Complex64::new(self.real[i], self.imag[i])
    }

    /// Complex throat impedance at every frequency
    pub fn impedance(&self) -> Array1<Complex64> {
        (0..self.len()).map(|i| self.impedance_at(i)).collect()
    }

    /// Mean |Z|
    pub fn mean_magnitude(&self) -> f64 {
        self.magnitude.mean().unwrap_or(0.0)
    }

    /// Mean |Γ|
    pub fn mean_reflection(&self) -> f64 {
        self.reflection.mean().unwrap_or(0.0)
    }

    /// (min, max) of the phase in degrees
    pub fn phase_range(&self) -> (f64, f64) {
        self.phase_deg
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| {
                (lo.min(p), hi.max(p))
            })
    }
}

/// Throat impedance and reflection magnitude at a single frequency
fn throat_impedance_at(
    frequency: f64,
    segs: &[Segment],
    mouth_radius: f64,
    throat_area: f64,
    config: &EngineConfig,
) -> Result<(Complex64, f64)> {
    let ambient = &config.ambient;
    let rho_c = ambient.rho_c();
    let k = ambient.wavenumber(frequency);
    let ka = k * mouth_radius;

    let mut z = radiation_impedance(ka, circle_area(mouth_radius), ambient);

    let alpha = config.loss_coefficient * frequency.sqrt();
    let gamma = Complex64::new(alpha, k);
    for seg in segs.iter().rev() {
        z = transform_impedance(z, rho_c * seg.avg_area, gamma, seg.length);
    }
    if !(z.re.is_finite() && z.im.is_finite()) {
        return Err(HornError::Numerical {
            frequency_hz: frequency,
            message: format!("throat impedance is not finite ({z})"),
        });
    }

    let z_norm = z / (rho_c * throat_area);
    let reflection = ((z_norm - 1.0) / (z_norm + 1.0)).norm();
    if !reflection.is_finite() {
        return Err(HornError::Numerical {
            frequency_hz: frequency,
            message: "reflection coefficient is not finite".to_string(),
        });
    }
    Ok((z, reflection))
}

/// Compute the throat impedance of a horn at each frequency
///
/// # Arguments
/// * `points` - Profile samples in millimetres, throat first
/// * `frequencies` - Frequencies (Hz), each > 0
/// * `config` - Ambient conditions and loss coefficient
///
/// # Returns
/// * One entry per frequency, in input order
pub fn compute_impedance(
    points: &[ProfilePoint],
    frequencies: &[f64],
    config: &EngineConfig,
) -> Result<ImpedanceCurve> {
    if points.len() < 2 {
        return Err(HornError::DegenerateProfile {
            points: points.len(),
        });
    }
    check_points(points)?;
    check_frequencies(frequencies)?;
    config.validate()?;

    let segs = segments(points);
    let mouth_radius = points[points.len() - 1].radius * MM_TO_M;
    let throat_area = circle_area(points[0].radius * MM_TO_M);
    debug!(
        "TMM: {} segments, {} frequencies, mouth radius {:.4} m",
        segs.len(),
        frequencies.len(),
        mouth_radius
    );

    let values = frequencies
        .par_iter()
        .map(|&f| throat_impedance_at(f, &segs, mouth_radius, throat_area, config))
        .collect::<Result<Vec<_>>>()?;

    Ok(ImpedanceCurve::from_points(
        Array1::from_vec(frequencies.to_vec()),
        &values,
    ))
}

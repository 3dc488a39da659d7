//! Horn expansion profiles and their generators.
//!
//! A profile is the radius of the horn as a function of axial position, sampled
//! from the throat (first point) to the mouth (last point). Positions and radii
//! are in millimetres, the unit of the persisted profile files.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{HornError, Result};

/// One sample of a horn profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    /// Axial position from the throat plane (mm)
    #[serde(rename = "z", alias = "position")]
    pub position: f64,
    /// Radius of the cross-section (mm)
    pub radius: f64,
}

impl ProfilePoint {
    /// Create a new point
    pub fn new(position: f64, radius: f64) -> Self {
        Self { position, radius }
    }
}

/// Check the invariants every profile must satisfy, apart from the point count.
///
/// Positions must be finite and strictly increasing, radii finite and positive.
pub(crate) fn check_points(points: &[ProfilePoint]) -> Result<()> {
    for (i, p) in points.iter().enumerate() {
        if !p.position.is_finite() {
            return Err(HornError::geometry(
                "position",
                format!("point {i} has non-finite position {}", p.position),
            ));
        }
        if !(p.radius.is_finite() && p.radius > 0.0) {
            return Err(HornError::geometry(
                "radius",
                format!("point {i} has radius {}, must be > 0", p.radius),
            ));
        }
    }
    for (i, w) in points.windows(2).enumerate() {
        if w[1].position <= w[0].position {
            return Err(HornError::geometry(
                "position",
                format!(
                    "positions must be strictly increasing: point {} at {} follows {}",
                    i + 1,
                    w[1].position,
                    w[0].position
                ),
            ));
        }
    }
    Ok(())
}

/// Validated, immutable horn profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ProfilePoint>", into = "Vec<ProfilePoint>")]
pub struct Profile {
    points: Vec<ProfilePoint>,
}

impl Profile {
    /// Build a profile, checking ordering, positivity and the two-point minimum.
    pub fn new(points: Vec<ProfilePoint>) -> Result<Self> {
        if points.len() < 2 {
            return Err(HornError::geometry(
                "points",
                format!("at least 2 points required, got {}", points.len()),
            ));
        }
        check_points(&points)?;
        Ok(Self { points })
    }

    /// All samples, throat first.
    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed profile.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Throat sample.
    pub fn throat(&self) -> ProfilePoint {
        self.points[0]
    }

    /// Mouth sample.
    pub fn mouth(&self) -> ProfilePoint {
        self.points[self.points.len() - 1]
    }

    /// Axial length from throat to mouth (mm).
    pub fn length(&self) -> f64 {
        self.mouth().position - self.throat().position
    }
}

impl TryFrom<Vec<ProfilePoint>> for Profile {
    type Error = HornError;

    fn try_from(points: Vec<ProfilePoint>) -> Result<Self> {
        Profile::new(points)
    }
}

impl From<Profile> for Vec<ProfilePoint> {
    fn from(profile: Profile) -> Self {
        profile.points
    }
}

/// Shape families understood by [`generate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeFamily {
    /// Hermite S-curve between throat and mouth
    SmoothSigmoid,
    /// `t^p` expansion
    PowerLaw,
    /// Power-law base with Mandelbrot-orbit ripple
    FractalModulated,
    /// Classic exponential horn
    Exponential,
    /// Tractrix-like hyperbolic cosine flare
    Tractrix,
    /// Straight cone
    Linear,
}

impl ShapeFamily {
    /// Every family, in declaration order.
    pub const ALL: [ShapeFamily; 6] = [
        ShapeFamily::SmoothSigmoid,
        ShapeFamily::PowerLaw,
        ShapeFamily::FractalModulated,
        ShapeFamily::Exponential,
        ShapeFamily::Tractrix,
        ShapeFamily::Linear,
    ];

    /// Name used on the command line and in JSON.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeFamily::SmoothSigmoid => "smooth-sigmoid",
            ShapeFamily::PowerLaw => "power-law",
            ShapeFamily::FractalModulated => "fractal-modulated",
            ShapeFamily::Exponential => "exponential",
            ShapeFamily::Tractrix => "tractrix",
            ShapeFamily::Linear => "linear",
        }
    }
}

impl fmt::Display for ShapeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeFamily {
    type Err = HornError;

    fn from_str(s: &str) -> Result<Self> {
        ShapeFamily::ALL
            .into_iter()
            .find(|family| family.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = ShapeFamily::ALL.iter().map(|f| f.name()).collect();
                HornError::geometry(
                    "family",
                    format!("unknown shape family '{s}', expected one of {names:?}"),
                )
            })
    }
}

/// Shape parameters; only the fields relevant to the chosen family are read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    /// Power-law exponent. Defaults to 1.3 for power-law, 1.2 for the fractal base.
    pub exponent: Option<f64>,
    /// Real part of the Mandelbrot constant c
    pub c_real: f64,
    /// Imaginary part of the Mandelbrot constant c
    pub c_imag: f64,
    /// Orbit length N at the mouth (the orbit runs round(N·t)+1 steps)
    pub iterations: u32,
    /// Ripple depth at the throat
    pub modulation_depth: f64,
    /// Fraction of the ripple depth removed at the mouth: A(t) = depth·(1 − decay·t)
    pub modulation_decay: f64,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            exponent: None,
            c_real: -0.75,
            c_imag: 0.0,
            iterations: 100,
            modulation_depth: 0.03,
            modulation_decay: 0.5,
        }
    }
}

const POWER_LAW_EXPONENT: f64 = 1.3;
const FRACTAL_BASE_EXPONENT: f64 = 1.2;
/// Ripple periods along the horn length
const RIPPLE_PERIODS: f64 = 8.0;
/// |z|² beyond which the orbit has escaped
const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// Real part of the Mandelbrot orbit of `c` after `steps` iterations from z = 0.
///
/// The orbit stops right after the first step that leaves the radius-2 disc,
/// so escaping orbits freeze at their first outside value.
pub fn mandelbrot_orbit_real(c: Complex64, steps: usize) -> f64 {
    let mut z = Complex64::new(0.0, 0.0);
    for _ in 0..steps {
        z = z * z + c;
        if z.norm_sqr() > ESCAPE_RADIUS_SQ {
            break;
        }
    }
    z.re
}

fn blend(throat: f64, mouth: f64, h: f64) -> f64 {
    throat + (mouth - throat) * h
}

fn positive(parameter: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(HornError::geometry(
            parameter,
            format!("must be a finite value > 0, got {value}"),
        ))
    }
}

/// Generate a horn profile.
///
/// # Arguments
/// * `family` - Shape family
/// * `throat_radius` - Throat radius (mm)
/// * `mouth_radius` - Mouth radius (mm); may be smaller than the throat for most families
/// * `length` - Axial length (mm)
/// * `point_count` - Number of intervals; `point_count + 1` samples are produced
/// * `params` - Family-specific parameters
///
/// # Returns
/// * A profile starting at position 0
pub fn generate(
    family: ShapeFamily,
    throat_radius: f64,
    mouth_radius: f64,
    length: f64,
    point_count: usize,
    params: &ShapeParams,
) -> Result<Profile> {
    positive("throat_radius", throat_radius)?;
    positive("mouth_radius", mouth_radius)?;
    positive("length", length)?;
    if point_count < 2 {
        return Err(HornError::geometry(
            "point_count",
            format!("must be >= 2, got {point_count}"),
        ));
    }
    if let Some(p) = params.exponent {
        positive("exponent", p)?;
    }

    let ratio = mouth_radius / throat_radius;
    // Flare constants; None means the horn degenerates to a cylinder.
    let exp_scale = match family {
        ShapeFamily::Exponential if ratio != 1.0 => Some(length / ratio.ln()),
        _ => None,
    };
    let tractrix_scale = match family {
        ShapeFamily::Tractrix if ratio < 1.0 => {
            return Err(HornError::geometry(
                "mouth_radius",
                format!(
                    "tractrix needs mouth >= throat, got mouth {mouth_radius} < throat {throat_radius}"
                ),
            ));
        }
        ShapeFamily::Tractrix if ratio > 1.0 => Some(length / ratio.acosh()),
        _ => None,
    };
    if family == ShapeFamily::FractalModulated {
        if !(params.c_real.is_finite() && params.c_imag.is_finite()) {
            return Err(HornError::geometry("c", "Mandelbrot constant must be finite"));
        }
        if !(params.modulation_depth.is_finite() && params.modulation_decay.is_finite()) {
            return Err(HornError::geometry(
                "modulation",
                "modulation depth and decay must be finite",
            ));
        }
    }
    let c = Complex64::new(params.c_real, params.c_imag);

    let points = (0..=point_count)
        .map(|i| {
            let t = i as f64 / point_count as f64;
            let z = length * t;
            let radius = match family {
                ShapeFamily::SmoothSigmoid => {
                    blend(throat_radius, mouth_radius, 3.0 * t * t - 2.0 * t * t * t)
                }
                ShapeFamily::PowerLaw => {
                    let p = params.exponent.unwrap_or(POWER_LAW_EXPONENT);
                    blend(throat_radius, mouth_radius, t.powf(p))
                }
                ShapeFamily::FractalModulated => {
                    let p = params.exponent.unwrap_or(FRACTAL_BASE_EXPONENT);
                    let base = blend(throat_radius, mouth_radius, t.powf(p));
                    let steps = (params.iterations as f64 * t).round() as usize + 1;
                    let zr = mandelbrot_orbit_real(c, steps);
                    let amplitude = params.modulation_depth * (1.0 - params.modulation_decay * t);
                    base * (1.0 + amplitude * (RIPPLE_PERIODS * 2.0 * PI * t + zr).sin())
                }
                ShapeFamily::Exponential => match exp_scale {
                    Some(scale) => throat_radius * (z / scale).exp(),
                    None => throat_radius,
                },
                ShapeFamily::Tractrix => match tractrix_scale {
                    Some(scale) => throat_radius * (z / scale).cosh(),
                    None => throat_radius,
                },
                ShapeFamily::Linear => blend(throat_radius, mouth_radius, t),
            };
            ProfilePoint::new(z, radius)
        })
        .collect();

    Profile::new(points)
}

/// Estimate a fractal dimension in [1, 2] from the variability of the local slope.
///
/// Descriptive only: a smooth flare scores close to 1, a rippled one higher.
pub fn fractal_dimension(profile: &Profile) -> f64 {
    let points = profile.points();
    if points.len() < 10 {
        return 1.0;
    }
    let slopes: Vec<f64> = points
        .windows(2)
        .filter_map(|w| {
            let dz = w[1].position - w[0].position;
            (dz > 0.0).then(|| ((w[1].radius - w[0].radius) / dz).abs())
        })
        .collect();
    if slopes.is_empty() {
        return 1.0;
    }
    let n = slopes.len() as f64;
    let mean = slopes.iter().sum::<f64>() / n;
    let std = (slopes.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n).sqrt();
    let cv = if mean > 0.0 { std / mean } else { 0.0 };
    1.0 + (2.0 * cv).min(1.0)
}

/// Descriptive geometry of a profile, in millimetre units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryMetrics {
    /// See [`fractal_dimension`]
    pub fractal_dimension: f64,
    /// Mouth radius over throat radius
    pub expansion_ratio: f64,
    /// Arc length of the wall curve (mm)
    pub path_length_mm: f64,
    /// Enclosed volume (mm³), sum of frusta
    pub volume_mm3: f64,
    /// Lateral wall area (mm²), sum of frustum mantles
    pub surface_area_mm2: f64,
}

impl GeometryMetrics {
    /// Compute all metrics for a profile
    pub fn from_profile(profile: &Profile) -> Self {
        let mut path_length = 0.0;
        let mut volume = 0.0;
        let mut surface_area = 0.0;
        for w in profile.points().windows(2) {
            let (r1, r2) = (w[0].radius, w[1].radius);
            let dz = w[1].position - w[0].position;
            let slant = (dz * dz + (r2 - r1) * (r2 - r1)).sqrt();
            path_length += slant;
            volume += PI * dz / 3.0 * (r1 * r1 + r1 * r2 + r2 * r2);
            surface_area += PI * (r1 + r2) * slant;
        }
        Self {
            fractal_dimension: fractal_dimension(profile),
            expansion_ratio: profile.mouth().radius / profile.throat().radius,
            path_length_mm: path_length,
            volume_mm3: volume,
            surface_area_mm2: surface_area,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gen_family(family: ShapeFamily) -> Profile {
        generate(family, 12.7, 150.0, 400.0, 100, &ShapeParams::default()).unwrap()
    }

    #[test]
    fn test_every_family_spans_throat_to_mouth() {
        for family in ShapeFamily::ALL {
            let p = gen_family(family);
            assert_eq!(p.len(), 101, "{family}");
            assert_eq!(p.throat().position, 0.0);
            assert!((p.mouth().position - 400.0).abs() < 1e-9);
            assert!(p.points().iter().all(|pt| pt.radius > 0.0), "{family}");
        }
    }

    #[test]
    fn test_smooth_sigmoid_endpoints_and_midpoint() {
        let p = gen_family(ShapeFamily::SmoothSigmoid);
        assert!((p.throat().radius - 12.7).abs() < 1e-12);
        assert!((p.mouth().radius - 150.0).abs() < 1e-9);
        // Hermite blend is 0.5 at t = 0.5
        let mid = p.points()[50];
        assert!((mid.radius - (12.7 + 150.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_power_law_uses_exponent() {
        let params = ShapeParams {
            exponent: Some(2.0),
            ..ShapeParams::default()
        };
        let p = generate(ShapeFamily::PowerLaw, 10.0, 110.0, 100.0, 10, &params).unwrap();
        // t = 0.5 -> 10 + 100 * 0.25
        assert!((p.points()[5].radius - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_exponential_and_tractrix_reach_mouth() {
        for family in [ShapeFamily::Exponential, ShapeFamily::Tractrix] {
            let p = gen_family(family);
            assert!((p.throat().radius - 12.7).abs() < 1e-9, "{family}");
            assert!((p.mouth().radius - 150.0).abs() < 1e-6, "{family}");
        }
    }

    #[test]
    fn test_equal_radii_give_cylinders() {
        for family in ShapeFamily::ALL {
            if family == ShapeFamily::FractalModulated {
                continue;
            }
            let p = generate(family, 50.0, 50.0, 200.0, 20, &ShapeParams::default()).unwrap();
            assert!(
                p.points().iter().all(|pt| (pt.radius - 50.0).abs() < 1e-9),
                "{family}"
            );
        }
    }

    #[test]
    fn test_contraction_allowed_except_tractrix() {
        let p = generate(ShapeFamily::PowerLaw, 100.0, 20.0, 100.0, 10, &ShapeParams::default())
            .unwrap();
        assert!((p.mouth().radius - 20.0).abs() < 1e-9);
        let p = generate(ShapeFamily::Exponential, 100.0, 20.0, 100.0, 10, &ShapeParams::default())
            .unwrap();
        assert!((p.mouth().radius - 20.0).abs() < 1e-6);
        let err = generate(ShapeFamily::Tractrix, 100.0, 20.0, 100.0, 10, &ShapeParams::default())
            .unwrap_err();
        assert!(matches!(err, HornError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_generate_rejects_bad_inputs() {
        let params = ShapeParams::default();
        let cases = [
            (0.0, 150.0, 400.0, 100, "throat_radius"),
            (-1.0, 150.0, 400.0, 100, "throat_radius"),
            (12.7, 150.0, 0.0, 100, "length"),
            (12.7, 150.0, -400.0, 100, "length"),
            (12.7, 150.0, 400.0, 1, "point_count"),
        ];
        for (throat, mouth, length, n, param) in cases {
            match generate(ShapeFamily::SmoothSigmoid, throat, mouth, length, n, &params) {
                Err(HornError::InvalidGeometry { parameter, .. }) => assert_eq!(parameter, param),
                other => panic!("expected InvalidGeometry for {param}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_fractal_orbit_escape_freezes() {
        // c = 1 escapes at the third step: 0 -> 1 -> 2 -> 5
        let c = Complex64::new(1.0, 0.0);
        assert_eq!(mandelbrot_orbit_real(c, 2), 2.0);
        assert_eq!(mandelbrot_orbit_real(c, 3), 5.0);
        assert_eq!(mandelbrot_orbit_real(c, 50), 5.0);
        // c = -1 cycles 0, -1, 0, -1 ...
        let c = Complex64::new(-1.0, 0.0);
        assert_eq!(mandelbrot_orbit_real(c, 1), -1.0);
        assert_eq!(mandelbrot_orbit_real(c, 2), 0.0);
    }

    #[test]
    fn test_fractal_profile_matches_formula() {
        let params = ShapeParams::default();
        let p = generate(ShapeFamily::FractalModulated, 12.7, 150.0, 400.0, 100, &params).unwrap();
        let i = 37;
        let t = i as f64 / 100.0;
        let base = 12.7 + (150.0 - 12.7) * t.powf(1.2);
        let zr = mandelbrot_orbit_real(Complex64::new(-0.75, 0.0), (100.0 * t).round() as usize + 1);
        let expected = base * (1.0 + 0.03 * (1.0 - 0.5 * t) * (16.0 * PI * t + zr).sin());
        assert!((p.points()[i].radius - expected).abs() < 1e-9);
        // Throat: one orbit step gives z = c
        let throat = 12.7 * (1.0 + 0.03 * (-0.75f64).sin());
        assert!((p.throat().radius - throat).abs() < 1e-9);
    }

    #[test]
    fn test_fractal_converges_to_base_when_ripple_vanishes_at_mouth() {
        let params = ShapeParams {
            modulation_decay: 1.0,
            ..ShapeParams::default()
        };
        let p = generate(ShapeFamily::FractalModulated, 12.7, 150.0, 400.0, 100, &params).unwrap();
        assert!((p.mouth().radius - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_fractal_is_deterministic() {
        let a = gen_family(ShapeFamily::FractalModulated);
        let b = gen_family(ShapeFamily::FractalModulated);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fractal_dimension_range() {
        let smooth = gen_family(ShapeFamily::Linear);
        assert!((fractal_dimension(&smooth) - 1.0).abs() < 1e-9);
        for family in ShapeFamily::ALL {
            let d = fractal_dimension(&gen_family(family));
            assert!((1.0..=2.0).contains(&d), "{family}: {d}");
        }
        let rippled = fractal_dimension(&gen_family(ShapeFamily::FractalModulated));
        assert!(rippled > 1.0);
    }

    #[test]
    fn test_fractal_dimension_short_profile_is_one() {
        let p = generate(ShapeFamily::FractalModulated, 10.0, 50.0, 100.0, 5, &ShapeParams::default())
            .unwrap();
        assert_eq!(fractal_dimension(&p), 1.0);
    }

    #[test]
    fn test_geometry_metrics_of_cylinder() {
        let p = generate(ShapeFamily::Linear, 10.0, 10.0, 100.0, 10, &ShapeParams::default()).unwrap();
        let m = GeometryMetrics::from_profile(&p);
        assert!((m.expansion_ratio - 1.0).abs() < 1e-12);
        assert!((m.path_length_mm - 100.0).abs() < 1e-9);
        assert!((m.volume_mm3 - PI * 100.0 * 100.0).abs() < 1e-6);
        assert!((m.surface_area_mm2 - 2.0 * PI * 10.0 * 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_profile_validation() {
        assert!(Profile::new(vec![ProfilePoint::new(0.0, 1.0)]).is_err());
        assert!(
            Profile::new(vec![ProfilePoint::new(0.0, 1.0), ProfilePoint::new(0.0, 2.0)]).is_err()
        );
        assert!(
            Profile::new(vec![ProfilePoint::new(0.0, 1.0), ProfilePoint::new(1.0, 0.0)]).is_err()
        );
        let p = Profile::new(vec![ProfilePoint::new(5.0, 1.0), ProfilePoint::new(15.0, 2.0)])
            .unwrap();
        assert_eq!(p.length(), 10.0);
    }

    #[test]
    fn test_family_names_round_trip_through_from_str() {
        for family in ShapeFamily::ALL {
            assert_eq!(family.name().parse::<ShapeFamily>().unwrap(), family);
        }
        assert!("hyperbolic".parse::<ShapeFamily>().is_err());
    }
}

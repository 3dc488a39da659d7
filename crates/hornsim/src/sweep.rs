//! Logarithmic frequency sweeps.

use ndarray::Array1;

use crate::error::{HornError, Result};

/// Create a logarithmically spaced frequency grid, both bounds included.
///
/// # Arguments
/// * `freq_min` - First frequency (Hz), > 0
/// * `freq_max` - Last frequency (Hz), > `freq_min`
/// * `points` - Number of frequencies, >= 2
///
/// # Formula
/// f_i = freq_min · (freq_max / freq_min)^(i / (points − 1))
pub fn log_sweep(freq_min: f64, freq_max: f64, points: usize) -> Result<Array1<f64>> {
    if !(freq_min.is_finite() && freq_min > 0.0) {
        return Err(HornError::sweep(format!(
            "freq_min must be a finite value > 0, got {freq_min}"
        )));
    }
    if !(freq_max.is_finite() && freq_max > freq_min) {
        return Err(HornError::sweep(format!(
            "freq_max ({freq_max}) must be finite and greater than freq_min ({freq_min})"
        )));
    }
    if points < 2 {
        return Err(HornError::sweep(format!(
            "at least 2 points required, got {points}"
        )));
    }
    let ratio = freq_max / freq_min;
    let last = (points - 1) as f64;
    let mut freqs = Array1::from_shape_fn(points, |i| freq_min * ratio.powf(i as f64 / last));
    // Pin the bounds exactly; powf can be off by an ulp.
    freqs[0] = freq_min;
    freqs[points - 1] = freq_max;
    Ok(freqs)
}

/// Check that a caller-supplied frequency list is usable by the solvers.
pub(crate) fn check_frequencies(frequencies: &[f64]) -> Result<()> {
    if frequencies.is_empty() {
        return Err(HornError::sweep("at least one frequency required"));
    }
    if let Some((i, f)) = frequencies
        .iter()
        .enumerate()
        .find(|(_, f)| !(f.is_finite() && **f > 0.0))
    {
        return Err(HornError::sweep(format!(
            "frequency #{i} must be a finite value > 0, got {f}"
        )));
    }
    Ok(())
}

/// Index range of the inner half of a sweep of `n` points: `[n/4, 3n/4)`.
///
/// Falls back to the full range when the integer range is empty.
pub fn inner_half(n: usize) -> std::ops::Range<usize> {
    let range = n / 4..n * 3 / 4;
    if range.is_empty() { 0..n } else { range }
}

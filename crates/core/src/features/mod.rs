//! Scalar descriptors derived from a pitch contour.
//!
//! Unvoiced frames are dropped, the remaining magnitudes are z-score
//! normalized and smoothed with a quadratic Savitzky-Golay kernel (window 5)
//! when enough samples exist. Fewer than 3 usable samples is a defined
//! fallback, not an error: the extractor returns the all-zero vector.

use serde::{Deserialize, Serialize};

use crate::pitch::PitchContour;

/// Minimum count of voiced samples below which the zero vector is returned.
const MIN_USABLE_SAMPLES: usize = 3;

/// Smoothing applies only when strictly more samples than the window exist.
const SMOOTH_WINDOW: usize = 5;

/// Quadratic Savitzky-Golay kernel for a 5-sample window, scaled by 1/35.
const SG_KERNEL: [f64; 5] = [-3.0, 12.0, 17.0, 12.0, -3.0];
const SG_NORM: f64 = 35.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcousticFeatures {
    pub mean_pitch: f64,
    pub pitch_range: f64,
    pub pitch_slope: f64,
    pub pitch_variance: f64,
    pub contour_complexity: f64,
}

impl AcousticFeatures {
    pub const ZERO: Self = Self {
        mean_pitch: 0.0,
        pitch_range: 0.0,
        pitch_slope: 0.0,
        pitch_variance: 0.0,
        contour_complexity: 0.0,
    };
}

/// Deterministically derive the feature vector from a contour.
pub fn extract(contour: &PitchContour) -> AcousticFeatures {
    let voiced: Vec<f64> = contour.voiced().map(f64::from).collect();
    extract_from_values(&voiced)
}

pub(crate) fn extract_from_values(voiced: &[f64]) -> AcousticFeatures {
    if voiced.len() < MIN_USABLE_SAMPLES {
        return AcousticFeatures::ZERO;
    }

    let normalized = zscore(voiced);
    let processed = if normalized.len() > SMOOTH_WINDOW {
        savgol(&normalized)
    } else {
        normalized
    };

    let n = processed.len() as f64;
    let mean_pitch = processed.iter().sum::<f64>() / n;
    let min = processed.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = processed.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let pitch_variance = processed
        .iter()
        .map(|v| (v - mean_pitch) * (v - mean_pitch))
        .sum::<f64>()
        / n;

    AcousticFeatures {
        mean_pitch,
        pitch_range: max - min,
        pitch_slope: least_squares_slope(&processed),
        pitch_variance,
        contour_complexity: sign_changes(&processed) as f64 / n,
    }
}

fn zscore(values: &[f64]) -> Vec<f64> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let std = var.sqrt();
    if std <= f64::EPSILON {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - mean) / std).collect()
}

/// Interior points get the symmetric kernel; the two samples at each edge
/// pass through unchanged, keeping the filter a pure function of its input.
fn savgol(values: &[f64]) -> Vec<f64> {
    let radius = SG_KERNEL.len() / 2;
    let mut out = values.to_vec();
    for idx in radius..values.len() - radius {
        let mut acc = 0.0;
        for (k, coeff) in SG_KERNEL.iter().enumerate() {
            acc += coeff * values[idx + k - radius];
        }
        out[idx] = acc / SG_NORM;
    }
    out
}

/// Least-squares linear slope over the sample index.
fn least_squares_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, v) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (v - mean_y);
        den += dx * dx;
    }
    if den <= f64::EPSILON {
        0.0
    } else {
        num / den
    }
}

/// Count of sign changes in the first difference.
fn sign_changes(values: &[f64]) -> usize {
    let diffs: Vec<bool> = values.windows(2).map(|w| w[1] - w[0] < 0.0).collect();
    diffs.windows(2).filter(|w| w[0] != w[1]).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::PitchContour;

    #[test]
    fn all_unvoiced_contour_yields_zero_vector() {
        let contour = PitchContour::new(vec![0.0, 0.1, 0.2], vec![None, None, None]);
        assert_eq!(extract(&contour), AcousticFeatures::ZERO);
    }

    #[test]
    fn fewer_than_three_samples_yield_zero_vector() {
        let contour = PitchContour::new(vec![0.0, 0.1], vec![Some(120.0), Some(130.0)]);
        assert_eq!(extract(&contour), AcousticFeatures::ZERO);
        assert_eq!(extract(&PitchContour::default()), AcousticFeatures::ZERO);
    }

    #[test]
    fn constant_contour_has_no_spread() {
        let values = vec![150.0; 12];
        let f = extract_from_values(&values);
        assert_eq!(f.pitch_range, 0.0);
        assert_eq!(f.pitch_slope, 0.0);
        assert_eq!(f.pitch_variance, 0.0);
    }

    #[test]
    fn rising_ramp_has_positive_slope_and_no_direction_changes() {
        let values: Vec<f64> = (0..10).map(|i| 100.0 + 10.0 * i as f64).collect();
        let f = extract_from_values(&values);
        assert!(f.pitch_slope > 0.15, "slope {}", f.pitch_slope);
        assert_eq!(f.contour_complexity, 0.0);
        assert!(f.pitch_range > 1.0);
    }

    #[test]
    fn zigzag_has_high_complexity() {
        let values: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 200.0 })
            .collect();
        let f = extract_from_values(&values);
        assert!(f.contour_complexity > 0.5, "{}", f.contour_complexity);
    }

    #[test]
    fn extraction_is_deterministic() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 30.0).collect();
        assert_eq!(extract_from_values(&values), extract_from_values(&values));
    }
}

//! Fundamental-frequency estimation.
//!
//! Frame-based YIN: squared-difference function, cumulative-mean
//! normalization, absolute threshold, parabolic refinement of the selected
//! lag. Frames with no dip below the threshold are reported unvoiced rather
//! than zero so that downstream statistics are not biased.

use serde::{Deserialize, Serialize};

use crate::audio::AudioData;
use crate::config::PitchConfig;

/// F0 contour over an equally spaced time grid. Immutable once extracted.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PitchContour {
    times: Vec<f32>,
    f0: Vec<Option<f32>>,
}

impl PitchContour {
    pub fn new(times: Vec<f32>, f0: Vec<Option<f32>>) -> Self {
        debug_assert_eq!(times.len(), f0.len());
        Self { times, f0 }
    }

    pub fn len(&self) -> usize {
        self.f0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.f0.is_empty()
    }

    /// Voiced frequencies in time order.
    pub fn voiced(&self) -> impl Iterator<Item = f32> + '_ {
        self.f0.iter().filter_map(|f| *f)
    }

    /// Peak voiced frequency within [start, end) seconds.
    pub fn peak_in(&self, start: f32, end: f32) -> Option<f32> {
        self.times
            .iter()
            .zip(self.f0.iter())
            .filter(|(t, _)| **t >= start && **t < end)
            .filter_map(|(_, f)| *f)
            .fold(None, |acc: Option<f32>, f| match acc {
                Some(best) if best >= f => Some(best),
                _ => Some(f),
            })
    }
}

/// Estimate a pitch contour for the whole waveform.
///
/// Signals shorter than one analysis frame yield an empty contour; the
/// degenerate case is absorbed downstream as a zero feature vector.
pub fn extract_contour(audio: &AudioData, cfg: &PitchConfig) -> PitchContour {
    let sr = audio.sample_rate as f64;
    let samples = &audio.samples;
    if sr <= 0.0 || samples.len() < cfg.frame_len {
        return PitchContour::default();
    }

    let lag_min = ((sr / cfg.fmax).floor() as usize).max(2);
    let lag_max = ((sr / cfg.fmin).ceil() as usize).min(cfg.frame_len / 2);
    if lag_min >= lag_max {
        return PitchContour::default();
    }

    let mut times = Vec::new();
    let mut f0 = Vec::new();
    let mut start = 0;
    while start + cfg.frame_len <= samples.len() {
        let frame = &samples[start..start + cfg.frame_len];
        let freq = yin_frame(frame, lag_min, lag_max, cfg.threshold)
            .map(|lag| (sr / lag) as f32)
            .filter(|f| (*f as f64) >= cfg.fmin && (*f as f64) <= cfg.fmax);
        times.push(((start + cfg.frame_len / 2) as f64 / sr) as f32);
        f0.push(freq);
        start += cfg.hop_len;
    }

    PitchContour::new(times, f0)
}

/// Fractional lag of the first sufficiently deep dip, or None when the frame
/// is aperiodic at every candidate lag.
fn yin_frame(frame: &[f32], lag_min: usize, lag_max: usize, threshold: f64) -> Option<f64> {
    let window = frame.len().checked_sub(lag_max)?;
    if window == 0 {
        return None;
    }

    let mut diff = vec![0.0f64; lag_max];
    for (lag, slot) in diff.iter_mut().enumerate().skip(1) {
        let mut sum = 0.0;
        for j in 0..window {
            let d = (frame[j] - frame[j + lag]) as f64;
            sum += d * d;
        }
        *slot = sum;
    }

    let mut cmnd = vec![1.0f64; lag_max];
    let mut running = 0.0;
    for lag in 1..lag_max {
        running += diff[lag];
        if running > 0.0 {
            cmnd[lag] = diff[lag] * lag as f64 / running;
        }
    }

    let mut lag = lag_min;
    while lag < lag_max {
        if cmnd[lag] < threshold {
            while lag + 1 < lag_max && cmnd[lag + 1] < cmnd[lag] {
                lag += 1;
            }
            return Some(refine_lag(&cmnd, lag));
        }
        lag += 1;
    }
    None
}

fn refine_lag(cmnd: &[f64], lag: usize) -> f64 {
    if lag == 0 || lag + 1 >= cmnd.len() {
        return lag as f64;
    }
    let (a, b, c) = (cmnd[lag - 1], cmnd[lag], cmnd[lag + 1]);
    let denom = a + c - 2.0 * b;
    if denom.abs() < f64::EPSILON {
        lag as f64
    } else {
        lag as f64 + 0.5 * (a - c) / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, seconds: f32) -> AudioData {
        let n = (sample_rate as f32 * seconds) as usize;
        let samples = (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                0.8 * (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect();
        AudioData {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn tracks_a_steady_tone() {
        let audio = sine(220.0, 16_000, 0.5);
        let contour = extract_contour(&audio, &PitchConfig::default());
        assert!(!contour.is_empty());
        let voiced: Vec<f32> = contour.voiced().collect();
        assert!(voiced.len() > contour.len() / 2);
        for f in voiced {
            assert!((f - 220.0).abs() < 5.0, "estimated {f} Hz");
        }
    }

    #[test]
    fn silence_is_unvoiced() {
        let audio = AudioData {
            samples: vec![0.0; 8_192],
            sample_rate: 16_000,
        };
        let contour = extract_contour(&audio, &PitchConfig::default());
        assert!(!contour.is_empty());
        assert_eq!(contour.voiced().count(), 0);
    }

    #[test]
    fn short_signal_yields_empty_contour() {
        let audio = AudioData {
            samples: vec![0.1, -0.1],
            sample_rate: 16_000,
        };
        let contour = extract_contour(&audio, &PitchConfig::default());
        assert!(contour.is_empty());
    }

    #[test]
    fn peak_lookup_respects_time_window() {
        let contour = PitchContour::new(
            vec![0.1, 0.2, 0.3, 0.4],
            vec![Some(100.0), Some(180.0), None, Some(140.0)],
        );
        assert_eq!(contour.peak_in(0.0, 0.25), Some(180.0));
        assert_eq!(contour.peak_in(0.25, 0.35), None);
        assert_eq!(contour.peak_in(0.35, 0.5), Some(140.0));
        assert_eq!(contour.peak_in(1.0, 2.0), None);
    }
}

//! Lexical stress placement checks.
//!
//! The actual stressed syllable of a spoken word is taken to be the syllable
//! window with the highest pitch peak; a [`StressError`] is emitted only when
//! it differs from the dictionary expectation. Words the lexicon does not
//! know are skipped rather than guessed at.

mod lexicon;
mod syllabify;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::align::AlignTarget;
use crate::pitch::PitchContour;
use crate::report::SENTINEL_SPAN;
use crate::transcribe::WordTiming;

pub use lexicon::{Lexicon, LexiconError, SyllableProfile};
pub use syllabify::heuristic_syllabify;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum StressErrorKind {
    #[serde(rename = "Stress Misplacement")]
    Misplacement,
}

/// One mismatching word occurrence. Independent of other words; the char
/// span starts out as the sentinel and is filled by the span aligner.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StressError {
    pub word: String,
    pub syllable_breakdown: Vec<String>,
    pub error_type: StressErrorKind,
    pub actual_stress_index: usize,
    pub expected_stress_index: usize,
    pub char_span: (i64, i64),
}

impl AlignTarget for StressError {
    fn word(&self) -> &str {
        &self.word
    }

    fn set_span(&mut self, span: (i64, i64)) {
        self.char_span = span;
    }
}

pub struct SyllableStressResolver {
    lexicon: Arc<Lexicon>,
}

impl SyllableStressResolver {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Check each timed word against the lexicon. Pure function of its
    /// inputs plus the static lookup table.
    pub fn resolve(&self, words: &[WordTiming], contour: &PitchContour) -> Vec<StressError> {
        let mut errors = Vec::new();
        for timing in words {
            let token = normalize_token(&timing.word);
            if token.is_empty() {
                continue;
            }
            let Some(profile) = self.lexicon.lookup(&token) else {
                debug!(word = %token, "word absent from lexicon, skipped");
                continue;
            };
            let Some(actual) = actual_stress_index(profile, timing, contour) else {
                continue;
            };
            if actual != profile.expected_stress {
                errors.push(StressError {
                    word: token,
                    syllable_breakdown: profile.syllables.clone(),
                    error_type: StressErrorKind::Misplacement,
                    actual_stress_index: actual,
                    expected_stress_index: profile.expected_stress,
                    char_span: SENTINEL_SPAN,
                });
            }
        }
        errors
    }
}

/// Uniform per-syllable windows over the word's duration, each scored by its
/// peak voiced pitch; the highest-scoring window is the actual stress.
fn actual_stress_index(
    profile: &SyllableProfile,
    timing: &WordTiming,
    contour: &PitchContour,
) -> Option<usize> {
    let count = profile.syllables.len();
    if count == 0 || timing.end <= timing.start {
        return None;
    }
    let step = (timing.end - timing.start) / count as f32;

    let mut best: Option<(usize, f32)> = None;
    for k in 0..count {
        let window_start = timing.start + step * k as f32;
        let window_end = timing.start + step * (k + 1) as f32;
        let peak = contour.peak_in(window_start, window_end).unwrap_or(0.0);
        // Earlier syllable wins ties.
        if best.map_or(true, |(_, p)| peak > p) {
            best = Some((k, peak));
        }
    }
    best.map(|(k, _)| k)
}

fn normalize_token(word: &str) -> String {
    word.trim()
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DICT: &str = "\
RARELY  R EH1 R L IY0
ENGLISH  IH1 NG G L IH0 SH
";

    fn resolver() -> SyllableStressResolver {
        SyllableStressResolver::new(Arc::new(Lexicon::from_strs(DICT, None)))
    }

    fn timed(word: &str, start: f32, end: f32) -> WordTiming {
        WordTiming {
            word: word.to_owned(),
            start,
            end,
        }
    }

    /// Contour with a single pitch peak at the given time.
    fn peaked_contour(peak_time: f32) -> PitchContour {
        let times: Vec<f32> = (0..100).map(|i| i as f32 * 0.01).collect();
        let f0 = times
            .iter()
            .map(|t| {
                if (t - peak_time).abs() < 0.02 {
                    Some(260.0)
                } else {
                    Some(140.0)
                }
            })
            .collect();
        PitchContour::new(times, f0)
    }

    #[test]
    fn correctly_stressed_word_produces_no_error() {
        // "rarely" expects stress on syllable 0; peak lands early.
        let errors = resolver().resolve(&[timed("rarely", 0.0, 0.6)], &peaked_contour(0.1));
        assert!(errors.is_empty());
    }

    #[test]
    fn late_peak_flags_misplaced_stress() {
        let errors = resolver().resolve(&[timed("Rarely,", 0.0, 0.6)], &peaked_contour(0.45));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].word, "rarely");
        assert_eq!(errors[0].actual_stress_index, 1);
        assert_eq!(errors[0].expected_stress_index, 0);
        assert_eq!(errors[0].char_span, SENTINEL_SPAN);
    }

    #[test]
    fn unknown_words_are_skipped() {
        let errors = resolver().resolve(&[timed("zyzzyva", 0.0, 0.5)], &peaked_contour(0.4));
        assert!(errors.is_empty());
    }

    #[test]
    fn degenerate_timing_is_skipped() {
        let errors = resolver().resolve(&[timed("rarely", 0.5, 0.5)], &peaked_contour(0.4));
        assert!(errors.is_empty());
    }

    #[test]
    fn resolution_is_idempotent() {
        let words = [timed("rarely", 0.0, 0.6), timed("english", 0.6, 1.0)];
        let contour = peaked_contour(0.45);
        let r = resolver();
        assert_eq!(r.resolve(&words, &contour), r.resolve(&words, &contour));
    }
}

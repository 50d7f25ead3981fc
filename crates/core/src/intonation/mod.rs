//! Intonation classification.
//!
//! Two independent classifiers are fused per clause: an acoustic rule ladder
//! over [`AcousticFeatures`] picks the actual contour label, and the text
//! pattern families score the expected one. Both are pure functions of their
//! inputs, so repeated runs over identical audio and text agree exactly.

mod rules;

use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::features::{self, AcousticFeatures};
use crate::pitch::PitchContour;
use crate::report::SENTINEL_SPAN;

use rules::{compile_families, Family, PatternFamily, BOOSTED_WEIGHT, MATCH_SCORE};

#[derive(thiserror::Error, Debug)]
pub enum IntonationError {
    #[error("invalid rule pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContourLabel {
    Rising,
    Falling,
    Flat,
    #[serde(rename = "Rising-Falling")]
    RisingFalling,
    #[serde(rename = "Falling-Rising")]
    FallingRising,
    Unclear,
}

/// Expected-vs-actual judgment for one clause.
///
/// The span is a byte range into the clause text, or the (-1, -1) sentinel
/// when no location could be attributed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntonationVerdict {
    pub clause_text: String,
    pub actual: ContourLabel,
    pub confidence: f64,
    pub expected: ContourLabel,
    pub error_start: i64,
    pub error_end: i64,
}

/// Rule ladder over the feature vector; returns the label and a confidence
/// monotone in the feature magnitudes.
pub fn classify_contour(f: &AcousticFeatures, tau: f64) -> (ContourLabel, f64) {
    let confidence =
        (2.0 * f.pitch_slope.abs() + f.pitch_variance + f.contour_complexity).min(1.0);

    if f.pitch_slope > tau && f.pitch_range > tau {
        (ContourLabel::Rising, confidence)
    } else if f.pitch_slope < -tau && f.pitch_range > tau {
        (ContourLabel::Falling, confidence)
    } else if f.pitch_slope.abs() < tau / 2.0 && f.pitch_variance < tau {
        (ContourLabel::Flat, confidence)
    } else if f.contour_complexity > 0.5 {
        if f.pitch_slope > 0.0 {
            (ContourLabel::RisingFalling, confidence)
        } else {
            (ContourLabel::FallingRising, confidence)
        }
    } else {
        (ContourLabel::Unclear, confidence * 0.5)
    }
}

pub struct IntonationClassifier {
    config: ClassifierConfig,
    families: Vec<PatternFamily>,
}

impl IntonationClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, IntonationError> {
        Ok(Self {
            config,
            families: compile_families()?,
        })
    }

    /// Fuse the acoustic and text classifiers into one verdict for a clause.
    pub fn assess(&self, text: &str, contour: &PitchContour) -> IntonationVerdict {
        let features = features::extract(contour);
        self.assess_features(text, &features)
    }

    pub fn assess_features(&self, text: &str, features: &AcousticFeatures) -> IntonationVerdict {
        let (actual, confidence) = classify_contour(features, self.config.tau);

        let mut best: Option<(&PatternFamily, f64)> = None;
        for family in &self.families {
            let weight = if confidence > self.config.acoustic_gate
                && correlates(actual, family.family)
            {
                BOOSTED_WEIGHT
            } else {
                1.0
            };
            let score = family.match_count(text) as f64 * MATCH_SCORE * weight;
            // Strict comparison keeps the earliest family on ties.
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((family, score));
            }
        }

        let (expected, error_start, error_end) = match best {
            Some((family, score)) if score > 0.0 => {
                let expected = expected_label(family.family);
                if score > self.config.family_gate {
                    match family.first_match_span(text) {
                        Some((start, end)) => (expected, start as i64, end as i64),
                        None => (expected, SENTINEL_SPAN.0, SENTINEL_SPAN.1),
                    }
                } else {
                    (expected, 0, text.len() as i64)
                }
            }
            _ => (ContourLabel::Unclear, 0, text.len() as i64),
        };

        IntonationVerdict {
            clause_text: text.to_owned(),
            actual,
            confidence,
            expected,
            error_start,
            error_end,
        }
    }
}

fn correlates(label: ContourLabel, family: Family) -> bool {
    matches!(
        (label, family),
        (ContourLabel::Rising, Family::Question)
            | (ContourLabel::Falling, Family::Statement)
            | (ContourLabel::RisingFalling, Family::List)
            | (ContourLabel::FallingRising, Family::List)
    )
}

fn expected_label(family: Family) -> ContourLabel {
    match family {
        Family::Question => ContourLabel::Rising,
        Family::Statement => ContourLabel::Falling,
        Family::List => ContourLabel::RisingFalling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::PitchContour;

    fn contour_from(values: &[f32]) -> PitchContour {
        let times = (0..values.len()).map(|i| i as f32 * 0.01).collect();
        let f0 = values.iter().map(|v| Some(*v)).collect();
        PitchContour::new(times, f0)
    }

    #[test]
    fn rising_ramp_classifies_as_rising() {
        let values: Vec<f32> = (0..10).map(|i| 120.0 + 15.0 * i as f32).collect();
        let features = crate::features::extract(&contour_from(&values));
        let (label, confidence) = classify_contour(&features, 0.15);
        assert_eq!(label, ContourLabel::Rising);
        assert!(confidence > 0.0);
    }

    #[test]
    fn falling_ramp_classifies_as_falling() {
        let values: Vec<f32> = (0..10).map(|i| 260.0 - 15.0 * i as f32).collect();
        let features = crate::features::extract(&contour_from(&values));
        let (label, _) = classify_contour(&features, 0.15);
        assert_eq!(label, ContourLabel::Falling);
    }

    #[test]
    fn constant_contour_classifies_as_flat() {
        let features = crate::features::extract(&contour_from(&[150.0; 12]));
        let (label, _) = classify_contour(&features, 0.15);
        assert_eq!(label, ContourLabel::Flat);
    }

    #[test]
    fn zero_vector_is_flat_not_an_error() {
        let (label, confidence) =
            classify_contour(&crate::features::AcousticFeatures::ZERO, 0.15);
        assert_eq!(label, ContourLabel::Flat);
        assert_eq!(confidence, 0.0);
    }

    #[test]
    fn question_text_with_flat_audio_expects_rising() {
        let classifier = IntonationClassifier::new(ClassifierConfig::default())
            .expect("classifier builds");
        let verdict = classifier.assess(
            "do you prefer tea or coffee",
            &contour_from(&[150.0; 12]),
        );
        assert_eq!(verdict.actual, ContourLabel::Flat);
        assert_eq!(verdict.expected, ContourLabel::Rising);
        assert!(verdict.error_start >= 0);
        assert!(verdict.error_start <= verdict.error_end);
    }

    #[test]
    fn unmatched_text_spans_whole_clause() {
        let classifier = IntonationClassifier::new(ClassifierConfig::default())
            .expect("classifier builds");
        let text = "mhm";
        let verdict = classifier.assess(text, &contour_from(&[150.0; 12]));
        assert_eq!(verdict.expected, ContourLabel::Unclear);
        assert_eq!(verdict.error_start, 0);
        assert_eq!(verdict.error_end, text.len() as i64);
    }

    #[test]
    fn assessment_is_idempotent() {
        let classifier = IntonationClassifier::new(ClassifierConfig::default())
            .expect("classifier builds");
        let values: Vec<f32> = (0..30).map(|i| 150.0 + (i as f32 * 0.9).sin() * 40.0).collect();
        let contour = contour_from(&values);
        let text = "I rarely like learning English";
        assert_eq!(classifier.assess(text, &contour), classifier.assess(text, &contour));
    }
}

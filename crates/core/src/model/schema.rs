//! Declared output schemas for the generation collaborators.
//!
//! Collaborator replies are JSON-shaped and untrusted; each analysis kind
//! gets a typed schema validated at the boundary. Payloads that do not
//! conform are rejected as [`ModelError::InvalidResponse`] rather than
//! trusted for shape.
//!
//! [`ModelError::InvalidResponse`]: super::ModelError

use serde::{Deserialize, Serialize};

use crate::align::AlignTarget;
use crate::report::SENTINEL_SPAN;

fn sentinel_span() -> (i64, i64) {
    SENTINEL_SPAN
}

/// One phoneme-level pronunciation error reported by the collaborator.
///
/// `error_start_index`/`error_end_index` are positions within the word's
/// phoneme sequence as the collaborator counted them; `char_span` is the
/// location in the transcript, sentinel until the span aligner fills it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhonemeErrorEntry {
    pub transcribed_word: String,
    pub expected_word: String,
    pub expected_pronunciation: String,
    pub actual_pronunciation: String,
    pub error_type: String,
    pub error_start_index: i64,
    pub error_end_index: i64,
    #[serde(default)]
    pub error_description: String,
    #[serde(default)]
    pub improvement_advice: String,
    #[serde(default = "sentinel_span")]
    pub char_span: (i64, i64),
}

impl AlignTarget for PhonemeErrorEntry {
    fn word(&self) -> &str {
        &self.transcribed_word
    }

    fn set_span(&mut self, span: (i64, i64)) {
        self.char_span = span;
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhonemeReport {
    pub actual_phonetic_transcription: String,
    pub expected_phonetic_transcription: String,
    #[serde(default)]
    pub phoneme_error_details: Vec<PhonemeErrorEntry>,
}

/// Band-descriptor scores on the 0-9 scale.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BandScore {
    pub overall: f64,
    pub fluency_coherence: f64,
    pub lexical_resource: f64,
    pub grammatical_range_accuracy: f64,
    pub pronunciation: f64,
}

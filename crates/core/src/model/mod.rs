//! Generation collaborators.
//!
//! Everything produced by a text-generation model (phoneme comparisons, band
//! scores, advice) goes through one contract: a structured prompt in, a raw
//! reply out, decoded into a declared schema at the boundary.

mod dummy;
mod http;
pub mod schema;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use dummy::ScriptedGenerator;
pub use http::ChatGenerator;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PromptKind {
    /// Predict the sentence the speaker intended, from the transcript.
    IntendedText,
    /// Compare actual and intended pronunciation, phoneme by phoneme.
    PhonemeComparison,
    /// Grade the recording against the speaking band descriptors.
    BandScore,
    /// Summarize the aggregated assessment into a short advice list.
    AdviceSummary,
}

impl PromptKind {
    /// System instructions sent with every request of this kind.
    pub fn instructions(&self) -> &'static str {
        match self {
            PromptKind::IntendedText => {
                "You are a phonetics expert. Given a speech transcript that may \
                 contain recognition artifacts from mispronounced words, reply \
                 with only the sentence the speaker most likely intended."
            }
            PromptKind::PhonemeComparison => {
                "You are a phonetic analysis expert. Compare the actual and \
                 intended sentences and return JSON only, with fields \
                 actualPhoneticTranscription, expectedPhoneticTranscription and \
                 phonemeErrorDetails: a list of {transcribedWord, expectedWord, \
                 expectedPronunciation, actualPronunciation, errorType, \
                 errorStartIndex, errorEndIndex, errorDescription, \
                 improvementAdvice}."
            }
            PromptKind::BandScore => {
                "You are a certified speaking examiner. Grade the attached \
                 recording on the official band descriptors and return JSON \
                 only: {overall, fluencyCoherence, lexicalResource, \
                 grammaticalRangeAccuracy, pronunciation}, each 0-9."
            }
            PromptKind::AdviceSummary => {
                "You are given a JSON pronunciation assessment. Return JSON \
                 only: an array of at most 3 short, encouraging pieces of \
                 advice covering the most important improvement points."
            }
        }
    }
}

/// Base64-encoded audio rider for kinds that grade the recording itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioAttachment {
    pub data: String,
    pub format: String,
}

impl AudioAttachment {
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        use base64::Engine as _;
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            format: format.to_owned(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub kind: PromptKind,
    pub input: String,
    pub audio: Option<AudioAttachment>,
}

impl GenerationRequest {
    pub fn text(kind: PromptKind, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
            audio: None,
        }
    }

    pub fn with_audio(kind: PromptKind, input: impl Into<String>, audio: AudioAttachment) -> Self {
        Self {
            kind,
            input: input.into(),
            audio: Some(audio),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("generation request failed: {0}")]
    Network(reqwest::Error),

    #[error("generation service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("schema-invalid model output: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelError::Network(_) => true,
            ModelError::Api { status, .. } => crate::util::is_http_retryable(*status),
            ModelError::InvalidResponse(_) => false,
        }
    }
}

pub trait TextGenerator: Send + Sync {
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'_, Result<String, ModelError>>;
}

impl<G: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<G> {
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'_, Result<String, ModelError>> {
        (**self).generate(request)
    }
}

/// Decode a collaborator reply into its declared schema.
///
/// Models occasionally wrap JSON in a markdown code fence despite being told
/// not to; the fence is stripped before decoding.
pub fn decode_payload<T: DeserializeOwned>(raw: &str) -> Result<T, ModelError> {
    let body = strip_code_fence(raw.trim());
    serde_json::from_str(body).map_err(|e| ModelError::InvalidResponse(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

//! Transcription collaborator.
//!
//! The pipeline treats transcription as an external service returning the
//! transcript text plus word-level timestamps. A failure here is fatal to
//! the request; nothing downstream can run without a transcript.

mod dummy;
mod http;

use std::path::PathBuf;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub use dummy::StaticTranscriber;
pub use http::HttpTranscriber;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WordTiming {
    pub word: String,
    /// Seconds from the start of the recording.
    pub start: f32,
    pub end: f32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub words: Vec<WordTiming>,
}

#[derive(thiserror::Error, Debug)]
pub enum TranscribeError {
    #[error("audio file not found: {path}")]
    MissingFile { path: String },

    #[error("failed to read audio file: {0}")]
    Io(#[from] std::io::Error),

    #[error("transcription request failed: {0}")]
    Network(reqwest::Error),

    #[error("transcription service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid transcription response: {0}")]
    InvalidResponse(String),
}

impl TranscribeError {
    pub fn is_retryable(&self) -> bool {
        match self {
            TranscribeError::Network(_) => true,
            TranscribeError::Api { status, .. } => crate::util::is_http_retryable(*status),
            _ => false,
        }
    }
}

pub trait Transcriber: Send + Sync {
    fn transcribe(&self, audio_path: PathBuf)
        -> BoxFuture<'_, Result<Transcript, TranscribeError>>;
}

impl<T: Transcriber + ?Sized> Transcriber for std::sync::Arc<T> {
    fn transcribe(
        &self,
        audio_path: PathBuf,
    ) -> BoxFuture<'_, Result<Transcript, TranscribeError>> {
        (**self).transcribe(audio_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_are_retryable_by_status() {
        let server_side = TranscribeError::Api {
            status: 503,
            message: "overloaded".to_owned(),
        };
        assert!(server_side.is_retryable());

        let client_side = TranscribeError::Api {
            status: 400,
            message: "bad form".to_owned(),
        };
        assert!(!client_side.is_retryable());
    }

    #[test]
    fn missing_file_is_not_retryable() {
        let err = TranscribeError::MissingFile {
            path: "/tmp/x.mp3".to_owned(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "audio file not found: /tmp/x.mp3");
    }
}

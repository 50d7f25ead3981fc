use std::path::PathBuf;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use crate::transcribe::{TranscribeError, Transcriber, Transcript, WordTiming};
use crate::util::{retry_with_backoff, RetryConfig};

/// Client for a whisper-style `/audio/transcriptions` endpoint that supports
/// word-level timestamp granularity and the verbose JSON response format.
#[derive(Clone)]
pub struct HttpTranscriber {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    retry: RetryConfig,
}

impl HttpTranscriber {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn request_once(
        &self,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<Transcript, TranscribeError> {
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word");

        let url = format!("{}/audio/transcriptions", self.base_url);
        let mut request = self.client.post(&url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(TranscribeError::Network)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranscribeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let verbose: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| TranscribeError::InvalidResponse(e.to_string()))?;
        Ok(verbose.into())
    }
}

#[derive(Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    words: Vec<VerboseWord>,
}

#[derive(Deserialize)]
struct VerboseWord {
    word: String,
    start: f32,
    end: f32,
}

impl From<VerboseTranscription> for Transcript {
    fn from(v: VerboseTranscription) -> Self {
        Transcript {
            text: v.text,
            words: v
                .words
                .into_iter()
                .map(|w| WordTiming {
                    word: w.word,
                    start: w.start,
                    end: w.end,
                })
                .collect(),
        }
    }
}

impl Transcriber for HttpTranscriber {
    fn transcribe(
        &self,
        audio_path: PathBuf,
    ) -> BoxFuture<'_, Result<Transcript, TranscribeError>> {
        async move {
            if !audio_path.is_file() {
                return Err(TranscribeError::MissingFile {
                    path: audio_path.display().to_string(),
                });
            }
            let bytes = tokio::fs::read(&audio_path).await?;
            let file_name = audio_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "audio".to_owned());

            retry_with_backoff(
                &self.retry,
                || self.request_once(file_name.clone(), bytes.clone()),
                TranscribeError::is_retryable,
            )
            .await
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_json_maps_to_transcript() {
        let raw = r#"{
            "text": "I rarely like learning English",
            "words": [
                {"word": "I", "start": 0.0, "end": 0.12},
                {"word": "rarely", "start": 0.12, "end": 0.61}
            ]
        }"#;
        let verbose: VerboseTranscription = serde_json::from_str(raw).expect("parses");
        let transcript: Transcript = verbose.into();
        assert_eq!(transcript.text, "I rarely like learning English");
        assert_eq!(transcript.words.len(), 2);
        assert_eq!(transcript.words[1].word, "rarely");
    }

    #[test]
    fn words_default_to_empty_when_absent() {
        let verbose: VerboseTranscription =
            serde_json::from_str(r#"{"text": "hello"}"#).expect("parses");
        let transcript: Transcript = verbose.into();
        assert!(transcript.words.is_empty());
    }

    #[tokio::test]
    async fn missing_file_fails_before_any_request() {
        let transcriber = HttpTranscriber::new(
            "http://localhost:9".to_owned(),
            None,
            "whisper-1".to_owned(),
        );
        let err = transcriber
            .transcribe(PathBuf::from("/nonexistent/clip.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscribeError::MissingFile { .. }));
    }
}

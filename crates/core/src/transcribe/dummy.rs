use std::path::PathBuf;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::transcribe::{TranscribeError, Transcriber, Transcript};

/// Offline transcriber returning a fixed transcript (or failure). Used in
/// tests and for dry runs without a transcription service.
#[derive(Clone, Debug)]
pub struct StaticTranscriber {
    outcome: Result<Transcript, String>,
}

impl StaticTranscriber {
    pub fn new(transcript: Transcript) -> Self {
        Self {
            outcome: Ok(transcript),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
        }
    }
}

impl Transcriber for StaticTranscriber {
    fn transcribe(
        &self,
        _audio_path: PathBuf,
    ) -> BoxFuture<'_, Result<Transcript, TranscribeError>> {
        async move {
            match &self.outcome {
                Ok(transcript) => Ok(transcript.clone()),
                Err(message) => Err(TranscribeError::Api {
                    status: 500,
                    message: message.clone(),
                }),
            }
        }
        .boxed()
    }
}

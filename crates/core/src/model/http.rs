use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::{GenerationRequest, ModelError, TextGenerator};
use crate::util::{retry_with_backoff, RetryConfig};

/// Chat-completions client for the generation service.
///
/// One client serves every [`PromptKind`]; the kind only decides the
/// instructions and whether an audio part rides along.
///
/// [`PromptKind`]: super::PromptKind
#[derive(Clone)]
pub struct ChatGenerator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    retry: RetryConfig,
}

impl ChatGenerator {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key,
            model: model.into(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn request_once(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        let mut content = vec![ContentPart::Text {
            text: request.input.clone(),
        }];
        if let Some(audio) = &request.audio {
            content.push(ContentPart::InputAudio {
                input_audio: InputAudio {
                    data: audio.data.clone(),
                    format: audio.format.clone(),
                },
            });
        }

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(request.kind.instructions().to_owned()),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(content),
                },
            ],
        };

        let mut req = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(ModelError::Network)?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_owned());
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(format!("malformed completion: {e}")))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("no choices in completion".to_owned()))?;
        Ok(choice.message.content)
    }
}

impl TextGenerator for ChatGenerator {
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'_, Result<String, ModelError>> {
        async move {
            retry_with_backoff(
                &self.retry,
                || self.request_once(&request),
                ModelError::is_retryable,
            )
            .await
        }
        .boxed()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    InputAudio { input_audio: InputAudio },
}

#[derive(Serialize)]
struct InputAudio {
    data: String,
    format: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

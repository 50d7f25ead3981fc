use std::collections::HashMap;
use std::sync::Mutex;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::model::{GenerationRequest, ModelError, PromptKind, TextGenerator};

/// Test generator that replies from a script and records every prompt kind
/// it was asked for.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: HashMap<PromptKind, String>,
    failures: HashMap<PromptKind, String>,
    calls: Mutex<Vec<PromptKind>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, kind: PromptKind, reply: impl Into<String>) -> Self {
        self.responses.insert(kind, reply.into());
        self
    }

    pub fn fail(mut self, kind: PromptKind, message: impl Into<String>) -> Self {
        self.failures.insert(kind, message.into());
        self
    }

    /// Prompt kinds requested so far, in call order.
    pub fn calls(&self) -> Vec<PromptKind> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'_, Result<String, ModelError>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.kind);
        }
        let result = if let Some(message) = self.failures.get(&request.kind) {
            Err(ModelError::Api {
                status: 500,
                message: message.clone(),
            })
        } else if let Some(reply) = self.responses.get(&request.kind) {
            Ok(reply.clone())
        } else {
            Err(ModelError::Api {
                status: 500,
                message: format!("no scripted reply for {:?}", request.kind),
            })
        };
        async move { result }.boxed()
    }
}

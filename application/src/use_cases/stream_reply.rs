//! Stream Reply use case
//!
//! Stateless request/response path used by the HTTP endpoint: the caller
//! owns the history and gets the raw token stream back.

use crate::config::ChatConfig;
use crate::ports::llm_gateway::{CompletionRequest, GatewayError, LlmGateway, StreamHandle};
use parley_domain::{ChatTurn, LanguageTable, TutorPromptBuilder};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while starting a streamed reply
#[derive(Error, Debug)]
pub enum StreamReplyError {
    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),
}

/// Inbound chat request. Missing languages fall back to [`ChatConfig`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default)]
    pub native_language: Option<String>,
    #[serde(default)]
    pub character_prompt: Option<String>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatTurn>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = Some(language.into());
        self
    }

    pub fn with_native_language(mut self, language: impl Into<String>) -> Self {
        self.native_language = Some(language.into());
        self
    }

    pub fn with_character_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.character_prompt = Some(prompt.into());
        self
    }
}

/// Use case for streaming one tutor reply
pub struct StreamReplyUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    languages: Arc<LanguageTable>,
    config: ChatConfig,
}

impl<G: LlmGateway + 'static> StreamReplyUseCase<G> {
    pub fn new(gateway: Arc<G>, languages: Arc<LanguageTable>, config: ChatConfig) -> Self {
        Self {
            gateway,
            languages,
            config,
        }
    }

    /// Build the completion request for `request` without sending it.
    pub fn completion_request(&self, request: ChatRequest) -> CompletionRequest {
        let target = non_blank(request.target_language)
            .unwrap_or_else(|| self.config.target_language.clone());
        let native = non_blank(request.native_language)
            .unwrap_or_else(|| self.config.native_language.clone());

        let system_prompt = TutorPromptBuilder::new(&self.languages).build_system_prompt(
            &target,
            &native,
            request.character_prompt.as_deref(),
        );

        CompletionRequest::new(self.config.model.clone(), system_prompt, request.messages)
    }

    /// Start the completion and hand back the raw event stream.
    pub async fn execute(&self, request: ChatRequest) -> Result<StreamHandle, StreamReplyError> {
        let request = self.completion_request(request);
        info!(
            model = %request.model,
            turns = request.messages.len(),
            "Starting streamed reply"
        );
        debug!(prompt_len = request.system_prompt.len(), "System prompt built");

        Ok(self.gateway.stream_completion(request).await?)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

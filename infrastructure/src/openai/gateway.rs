//! OpenAI-compatible LLM Gateway implementation

use crate::config::FileProviderConfig;
use crate::openai::error::{OpenAiError, Result};
use crate::openai::protocol::{
    ChatCompletionRequest, LineBuffer, SseEvent, error_message, parse_sse_line,
};
use async_trait::async_trait;
use futures::StreamExt;
use parley_application::{CompletionRequest, GatewayError, LlmGateway, StreamHandle};
use parley_domain::StreamEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Events buffered between the HTTP reader task and the consumer
const CHANNEL_CAPACITY: usize = 64;

/// Connection settings for [`OpenAiGateway`]
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Time allowed until response headers arrive
    pub timeout: Option<Duration>,
}

impl OpenAiSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Settings from the `[provider]` section, reading the key from the
    /// configured environment variable.
    pub fn from_config(config: &FileProviderConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!(
                "{} is not set, requests will be sent without authorization",
                config.api_key_env
            );
        }

        Self {
            base_url: config.base_url.clone(),
            api_key,
            timeout: config.timeout(),
        }
    }
}

/// LLM Gateway implementation for OpenAI-compatible chat-completions APIs
pub struct OpenAiGateway {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

impl OpenAiGateway {
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| OpenAiError::ClientBuild(e.to_string()))?;

        info!(base_url = %settings.base_url, "OpenAiGateway initialized");
        Ok(Self { client, settings })
    }

    pub fn from_config(config: &FileProviderConfig) -> Result<Self> {
        Self::new(OpenAiSettings::from_config(config))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// Send the request and wait for a successful status line.
    async fn open_stream(&self, body: &ChatCompletionRequest) -> Result<reqwest::Response> {
        let mut request = self.client.post(self.endpoint()).json(body);
        if let Some(key) = &self.settings.api_key {
            request = request.bearer_auth(key);
        }

        let response = match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, request.send())
                .await
                .map_err(|_| OpenAiError::Timeout)??,
            None => request.send().await?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenAiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<StreamHandle, GatewayError> {
        let body = ChatCompletionRequest::from(&request);
        debug!(
            model = %body.model,
            messages = body.messages.len(),
            "Opening completion stream"
        );

        let response = self.open_stream(&body).await.map_err(|e| {
            warn!("Completion request failed: {}", e);
            GatewayError::from(e)
        })?;

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(pump(response, tx));
        Ok(StreamHandle::new(rx))
    }
}

/// Forward SSE chunks to `tx` until `[DONE]`, an error, or the receiver
/// going away. Returning drops `response`, which aborts the connection.
async fn pump(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
    let mut stream = response.bytes_stream();
    let mut lines = LineBuffer::new();
    let mut full_text = String::new();

    loop {
        let item = tokio::select! {
            _ = tx.closed() => {
                debug!("Stream receiver dropped, aborting request");
                return;
            }
            item = stream.next() => item,
        };

        match item {
            Some(Ok(bytes)) => {
                for line in lines.push(&bytes) {
                    match parse_sse_line(&line) {
                        Some(SseEvent::Content(chunk)) => {
                            full_text.push_str(&chunk);
                            if tx.send(StreamEvent::Delta(chunk)).await.is_err() {
                                return;
                            }
                        }
                        Some(SseEvent::Done) => {
                            let _ = tx.send(StreamEvent::Completed(full_text)).await;
                            return;
                        }
                        Some(SseEvent::Error(message)) => {
                            warn!("Provider reported an error mid-stream: {}", message);
                            let _ = tx.send(StreamEvent::Error(message)).await;
                            return;
                        }
                        None => {}
                    }
                }
            }
            Some(Err(e)) => {
                warn!("Completion stream failed: {}", e);
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
            None => break,
        }
    }

    // Body ended without [DONE]
    match lines.finish().as_deref().and_then(parse_sse_line) {
        Some(SseEvent::Content(chunk)) => {
            full_text.push_str(&chunk);
            let _ = tx.send(StreamEvent::Delta(chunk)).await;
        }
        Some(SseEvent::Error(message)) => {
            warn!("Provider reported an error mid-stream: {}", message);
            let _ = tx.send(StreamEvent::Error(message)).await;
            return;
        }
        Some(SseEvent::Done) | None => {}
    }
    let _ = tx.send(StreamEvent::Completed(full_text)).await;
}

//! LLM Gateway port
//!
//! Defines the interface for streaming chat completions from an LLM provider.

use async_trait::async_trait;
use parley_domain::{ChatTurn, Model, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// One chat completion request: system instruction plus ordered history.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: Model,
    pub system_prompt: String,
    pub messages: Vec<ChatTurn>,
}

impl CompletionRequest {
    pub fn new(model: Model, system_prompt: impl Into<String>, messages: Vec<ChatTurn>) -> Self {
        Self {
            model,
            system_prompt: system_prompt.into(),
            messages,
        }
    }
}

/// Gateway for LLM communication
///
/// Implementations (adapters) live in the infrastructure layer. Dropping
/// the returned [`StreamHandle`] must stop the upstream request.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Start a streamed completion.
    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<StreamHandle, GatewayError>;
}

/// Handle for receiving streaming events from an LLM completion.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience methods
/// for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Next event, `None` once the producer is gone.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recv_yields_events_in_order_then_none() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Delta("Bon".into())).await.unwrap();
        tx.send(StreamEvent::Completed("Bon".into())).await.unwrap();
        drop(tx);

        let mut handle = StreamHandle::new(rx);
        assert_eq!(handle.recv().await, Some(StreamEvent::Delta("Bon".into())));
        assert_eq!(handle.recv().await, Some(StreamEvent::Completed("Bon".into())));
        assert_eq!(handle.recv().await, None);
    }

    #[test]
    fn test_completion_request_new() {
        let request = CompletionRequest::new(Model::Gpt4o, "tutor", vec![ChatTurn::user("hi")]);
        assert_eq!(request.system_prompt, "tutor");
        assert_eq!(request.messages.len(), 1);
    }
}

//! Wire types for the OpenAI chat-completions streaming API.
//!
//! # Protocol Overview
//!
//! - **Request**: `POST {base_url}/chat/completions` with
//!   `{"model", "messages", "stream": true}`
//! - **Response**: server-sent events, one `data: <json>` line per chunk,
//!   text in `choices[0].delta.content`, terminated by `data: [DONE]`

use parley_application::CompletionRequest;
use parley_domain::ChatTurn;
use serde::{Deserialize, Serialize};

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl From<parley_domain::Role> for Role {
    fn from(role: parley_domain::Role) -> Self {
        match role {
            parley_domain::Role::User => Role::User,
            parley_domain::Role::Assistant => Role::Assistant,
        }
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Creates a system message (instructions for the model).
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

impl From<&ChatTurn> for Message {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            role: turn.role.into(),
            content: turn.content.clone(),
        }
    }
}

/// Body of a streaming chat-completions request
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
}

impl From<&CompletionRequest> for ChatCompletionRequest {
    /// The system prompt goes first, followed by the history in order.
    fn from(request: &CompletionRequest) -> Self {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(Message::system(&request.system_prompt));
        messages.extend(request.messages.iter().map(Message::from));

        Self {
            model: request.model.to_string(),
            messages,
            stream: true,
        }
    }
}

/// One streamed chunk
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

/// Best-effort human message from an error response body.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => "no response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// A meaningful event decoded from one SSE line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Text to append
    Content(String),
    /// `data: [DONE]`
    Done,
    /// `data: {"error":{"message":...}}` sent mid-stream
    Error(String),
}

/// Decode one SSE line.
///
/// Blank lines, comments, non-`data` fields, chunks without text and
/// unparseable payloads yield `None`. Provider errors reported inside the
/// stream are checked before chunks, since a chunk with no `choices` would
/// otherwise accept them.
pub fn parse_sse_line(line: &str) -> Option<SseEvent> {
    let line = line.trim_end_matches('\r');
    let payload = line.strip_prefix("data:")?.trim_start();

    if payload == "[DONE]" {
        return Some(SseEvent::Done);
    }

    if let Ok(body) = serde_json::from_str::<ApiErrorBody>(payload) {
        return Some(SseEvent::Error(body.error.message));
    }

    let chunk: ChatCompletionChunk = serde_json::from_str(payload).ok()?;
    let content = chunk.choices.into_iter().next()?.delta.content?;
    if content.is_empty() {
        return None;
    }
    Some(SseEvent::Content(content))
}

/// Splits a byte stream into complete lines.
///
/// Bytes are buffered until a `\n` arrives, so multi-byte characters split
/// across network chunks decode correctly.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` and drain every complete line.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        lines
    }

    /// Whatever is left once the stream ended without a trailing newline.
    pub fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.pending).into_owned())
        }
    }
}

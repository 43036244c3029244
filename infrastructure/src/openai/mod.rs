//! OpenAI-compatible adapter
//!
//! Implements LlmGateway over the streaming chat-completions HTTP API.
//! Works against OpenAI itself and compatible servers (Ollama, vLLM, ...).

pub mod error;
pub mod gateway;
pub mod protocol;

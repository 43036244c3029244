//! Application layer for parley
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ChatConfig;
pub use ports::{
    llm_gateway::{CompletionRequest, GatewayError, LlmGateway, StreamHandle},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::chat_session::{ChatSessionError, ChatSessionUseCase, SendOutcome};
pub use use_cases::stream_reply::{ChatRequest, StreamReplyError, StreamReplyUseCase};

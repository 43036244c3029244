//! Infrastructure layer for parley
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod openai;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileChatConfig, FileConfig, FileLoggingConfig,
    FileProviderConfig, FileReplConfig, FileServerConfig, FileSpeechConfig,
};
pub use openai::{
    error::{OpenAiError, Result},
    gateway::{OpenAiGateway, OpenAiSettings},
};

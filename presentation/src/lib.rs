//! Presentation layer for parley
//!
//! This crate contains the CLI definition, the HTTP API, the interactive
//! chat REPL, console formatting and the typing indicator.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;
pub mod server;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, Command};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::ProgressReporter;
pub use server::{AppState, router, serve};

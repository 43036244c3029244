//! Interactive chat module
//!
//! Provides a readline-based tutoring session in the terminal.

mod repl;

pub use repl::{ChatRepl, ReplCommand, expand_home, parse_command};

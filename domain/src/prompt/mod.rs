//! Prompt domain
//!
//! Builds the tutor system prompt from the language table and an optional
//! persona fragment.

pub mod template;

pub use template::TutorPromptBuilder;

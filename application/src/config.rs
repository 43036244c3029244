//! Application-level configuration.
//!
//! Controls how the chat use cases behave: which model answers and which
//! language pair applies when a request does not name one.

use parley_domain::{DEFAULT_NATIVE_LANGUAGE, DEFAULT_TARGET_LANGUAGE, Model};

/// Chat behavior configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Model used for every completion.
    pub model: Model,
    /// Target language when none is given.
    pub target_language: String,
    /// Learner's first language when none is given.
    pub native_language: String,
}

impl ChatConfig {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    pub fn with_languages(
        mut self,
        target_language: impl Into<String>,
        native_language: impl Into<String>,
    ) -> Self {
        self.target_language = target_language.into();
        self.native_language = native_language.into();
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: Model::default(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            native_language: DEFAULT_NATIVE_LANGUAGE.to_string(),
        }
    }
}

//! Persona entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Where a persona came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterOrigin {
    /// Shipped with the application, lives for the whole process
    BuiltIn,
    /// Created by the learner, lives for the current session only
    UserAuthored,
}

/// A reusable chat persona (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    /// Target language of conversations with this persona
    pub language: String,
    pub personality: String,
    pub description: String,
    /// Free text merged into the system prompt
    pub system_prompt_fragment: String,
    pub origin: CharacterOrigin,
    /// Display counter, e.g. "2.3k"
    pub interactions: String,
    /// Opening line for built-ins; user-authored personas greet from the
    /// language table instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
}

impl Character {
    pub fn is_user_authored(&self) -> bool {
        self.origin == CharacterOrigin::UserAuthored
    }

    /// Case-insensitive match on name, language or description.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.language.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

/// Learner-supplied fields for a new persona.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDraft {
    pub name: String,
    pub description: String,
    pub language: String,
    pub personality: String,
}

impl CharacterDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        language: impl Into<String>,
        personality: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            language: language.into(),
            personality: personality.into(),
        }
    }

    /// All four fields are required.
    pub fn validate(&self) -> Result<(), DomainError> {
        let fields = [
            ("name", &self.name),
            ("description", &self.description),
            ("language", &self.language),
            ("personality", &self.personality),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(DomainError::InvalidCharacter(format!(
                "{} is required",
                field
            ))),
            None => Ok(()),
        }
    }
}

//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Character not found: {0}")]
    CharacterNotFound(String),

    #[error("Invalid character: {0}")]
    InvalidCharacter(String),

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Invalid message index: {0}")]
    InvalidMessageIndex(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_not_found_display() {
        let error = DomainError::CharacterNotFound("7".to_string());
        assert_eq!(error.to_string(), "Character not found: 7");
    }

    #[test]
    fn test_invalid_character_display() {
        let error = DomainError::InvalidCharacter("name is required".to_string());
        assert_eq!(error.to_string(), "Invalid character: name is required");
    }
}

//! Conversation entities

use crate::annotation::entities::Correction;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque message identifier. Later messages always get larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message in a conversation (Entity)
///
/// Assistant `content` is kept raw, markers included; parse it for display.
/// `corrections` is only ever set on user messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrections: Option<Vec<Correction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encouragement: Option<String>,
}

impl Message {
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
            corrections: None,
            encouragement: None,
        }
    }

    pub fn assistant(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: content.into(),
            corrections: None,
            encouragement: None,
        }
    }

    pub fn with_encouragement(mut self, encouragement: Option<String>) -> Self {
        self.encouragement = encouragement;
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Corrections attached to this message, empty if none.
    pub fn corrections(&self) -> &[Correction] {
        self.corrections.as_deref().unwrap_or(&[])
    }
}

/// Role and content only, as sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatTurn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_without_empty_annotations() {
        let message = Message::user(MessageId::new(3), "Je mange du pain");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["role"], "user");
        assert!(json.get("corrections").is_none());
        assert!(message.corrections().is_empty());
    }

    #[test]
    fn chat_turn_deserializes_from_wire_shape() {
        let turn: ChatTurn =
            serde_json::from_str(r#"{"role":"assistant","content":"Bonjour !"}"#).unwrap();
        assert_eq!(turn, ChatTurn::assistant("Bonjour !"));
    }

    #[test]
    fn message_ids_are_ordered() {
        assert!(MessageId::new(1) < MessageId::new(2));
    }
}

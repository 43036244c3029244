//! Conversation state and correction reconciliation.
//!
//! # Reconciliation policy
//!
//! Corrections parsed from an assistant reply belong to the **nearest
//! preceding user message**: scan backward from the position just before
//! the assistant message and stop at the first `user` role. If there is
//! none, the corrections are dropped. Attaching replaces whatever that
//! message held before.

use super::entities::{ChatTurn, Message, MessageId};
use crate::annotation::entities::{Correction, ParsedReply};
use crate::annotation::parsing::parse_annotations;
use crate::core::error::DomainError;
use serde::Serialize;

/// Index of the nearest `user` message strictly before `index`.
pub fn nearest_preceding_user(messages: &[Message], index: usize) -> Option<usize> {
    let end = index.min(messages.len());
    messages[..end].iter().rposition(Message::is_user)
}

/// Outcome of [`Conversation::complete_assistant_reply`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedReply {
    /// Position of the new assistant message
    pub index: usize,
    pub message_id: MessageId,
    pub reply: ParsedReply,
    /// User message that received the corrections, if any
    pub corrected: Option<MessageId>,
}

/// Ordered turns for one persona/language pair (Aggregate)
///
/// `generation` increases on every [`reset`](Self::reset); callers capture
/// it before awaiting a reply and compare afterwards to detect that the
/// conversation they were answering is gone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    character_id: Option<String>,
    target_language: String,
    native_language: String,
    messages: Vec<Message>,
    generation: u64,
    #[serde(skip)]
    next_id: u64,
}

impl Conversation {
    pub fn new(target_language: impl Into<String>, native_language: impl Into<String>) -> Self {
        Self {
            character_id: None,
            target_language: target_language.into(),
            native_language: native_language.into(),
            messages: Vec::new(),
            generation: 0,
            next_id: 1,
        }
    }

    pub fn character_id(&self) -> Option<&str> {
        self.character_id.as_deref()
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn native_language(&self) -> &str {
        &self.native_language
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replace the whole conversation with a single greeting.
    ///
    /// Used on persona and language switches.
    pub fn reset(
        &mut self,
        character_id: Option<String>,
        target_language: impl Into<String>,
        native_language: impl Into<String>,
        greeting: impl Into<String>,
    ) {
        self.character_id = character_id;
        self.target_language = target_language.into();
        self.native_language = native_language.into();
        self.messages.clear();
        self.generation += 1;
        let id = self.allocate_id();
        self.messages.push(Message::assistant(id, greeting));
    }

    /// Append a learner message. Blank input is rejected.
    pub fn push_user(&mut self, content: impl Into<String>) -> Result<MessageId, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        let id = self.allocate_id();
        self.messages.push(Message::user(id, content));
        Ok(id)
    }

    /// Append a completed assistant message and return its index.
    pub fn push_assistant(
        &mut self,
        content: impl Into<String>,
        encouragement: Option<String>,
    ) -> usize {
        let id = self.allocate_id();
        self.messages
            .push(Message::assistant(id, content).with_encouragement(encouragement));
        self.messages.len() - 1
    }

    /// Backfill `corrections` from the assistant message at
    /// `assistant_index` onto the nearest preceding user message.
    ///
    /// Returns the id of the message that received them, `None` when the
    /// list was empty or no user message precedes the reply.
    pub fn on_assistant_message_complete(
        &mut self,
        assistant_index: usize,
        corrections: Vec<Correction>,
    ) -> Result<Option<MessageId>, DomainError> {
        if assistant_index >= self.messages.len() {
            return Err(DomainError::InvalidMessageIndex(assistant_index));
        }
        if corrections.is_empty() {
            return Ok(None);
        }

        let Some(target) = nearest_preceding_user(&self.messages, assistant_index) else {
            return Ok(None);
        };

        let message = &mut self.messages[target];
        message.corrections = Some(corrections);
        Ok(Some(message.id))
    }

    /// Parse a finished raw reply, append it and reconcile its corrections.
    pub fn complete_assistant_reply(&mut self, raw: impl Into<String>) -> CompletedReply {
        let raw = raw.into();
        let reply = parse_annotations(&raw);
        let index = self.push_assistant(raw, reply.encouragement.clone());
        // index was just pushed, so it is always in range
        let corrected = self
            .on_assistant_message_complete(index, reply.corrections.clone())
            .unwrap_or(None);
        CompletedReply {
            index,
            message_id: self.messages[index].id,
            reply,
            corrected,
        }
    }

    /// Full history as sent to the completion endpoint.
    pub fn history(&self) -> Vec<ChatTurn> {
        self.messages.iter().map(ChatTurn::from).collect()
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = MessageId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

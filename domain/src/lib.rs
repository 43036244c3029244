//! Domain layer for parley
//!
//! This crate contains the core language-tutoring logic. It has no
//! dependencies on infrastructure or presentation concerns.
//!
//! # Annotation pipeline
//!
//! ```text
//! TutorPromptBuilder ──system prompt──▶ model ──reply──▶ parse_annotations
//!                                                            │
//!                         Conversation::on_assistant_message_complete ◀┘
//! ```
//!
//! - The prompt tells the model how to embed corrections and encouragement
//!   ([`annotation::markers`]).
//! - The parser turns a finished reply into display text plus structured
//!   [`Correction`]s.
//! - The conversation attaches those corrections to the learner message
//!   that prompted them.

pub mod annotation;
pub mod conversation;
pub mod core;
pub mod language;
pub mod persona;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use annotation::{
    entities::{Correction, CorrectionKind, ParsedReply},
    markers::MarkerKind,
    parsing::{parse_annotations, strip_annotations},
};
pub use conversation::{
    entities::{ChatTurn, Message, MessageId, Role},
    state::{CompletedReply, Conversation, nearest_preceding_user},
};
pub use crate::core::{error::DomainError, model::Model};
pub use language::table::{
    DEFAULT_SPEAKING_RATE, FALLBACK_LOCALE, LanguageProfile, LanguageTable, SpeechSettings,
};
pub use persona::{
    catalog::CharacterCatalog,
    entities::{Character, CharacterDraft, CharacterOrigin},
};
pub use prompt::TutorPromptBuilder;
pub use session::stream::StreamEvent;

/// Target language used when a request names none.
pub const DEFAULT_TARGET_LANGUAGE: &str = "French";

/// Native language used when a request names none.
pub const DEFAULT_NATIVE_LANGUAGE: &str = "English";

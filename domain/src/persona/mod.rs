//! Chat personas ("characters").
//!
//! - [`entities::Character`]: a persona definition
//! - [`entities::CharacterDraft`]: learner input for a new persona
//! - [`catalog::CharacterCatalog`]: built-ins plus session-only personas

pub mod catalog;
pub mod entities;

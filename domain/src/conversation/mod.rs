//! Conversation domain.
//!
//! - [`entities::Message`]: one turn, optionally carrying corrections
//! - [`state::Conversation`]: ordered turns for one persona/language pair,
//!   including correction reconciliation

pub mod entities;
pub mod state;

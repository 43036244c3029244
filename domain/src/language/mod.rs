//! Supported target languages.
//!
//! - [`table::LanguageTable`]: immutable language → wording/locale mapping
//! - [`table::SpeechSettings`]: locale and rate for speech engines

pub mod table;

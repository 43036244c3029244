//! Completion streaming domain.
//!
//! - [`stream::StreamEvent`]: one event of a streaming reply

pub mod stream;

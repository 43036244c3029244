//! Progress notification port
//!
//! Defines the interface for reporting a tutor reply while it streams.

use parley_domain::ParsedReply;

/// Callback for progress updates while a reply is generated
///
/// Implementations live in the presentation layer (typing indicator,
/// live console output, ...).
pub trait ProgressNotifier: Send + Sync {
    /// Called once the request has been sent.
    fn on_reply_start(&self, _character: Option<&str>) {}

    /// Called for each raw text chunk, markers included.
    fn on_reply_chunk(&self, _chunk: &str) {}

    /// Called when the reply is finished. `reply` is `None` when it failed
    /// or was discarded.
    fn on_reply_end(&self, _reply: Option<&ParsedReply>) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {}

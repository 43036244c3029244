//! Streaming events for chat completions.
//!
//! [`StreamEvent`] represents individual events in a streaming reply,
//! enabling a typing indicator and incremental display while the model
//! is still writing.

/// An event in a streaming completion.
///
/// A well-formed stream is zero or more `Delta` events followed by exactly
/// one terminal event. Markers may straddle `Delta` boundaries, so only the
/// `Completed` text is ever parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// The complete reply text (signals stream end).
    Completed(String),
    /// An error that occurred during streaming (signals stream end).
    Error(String),
}

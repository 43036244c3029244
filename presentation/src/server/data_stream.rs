//! AI data-stream line protocol
//!
//! Each line is `<type>:<json>\n`:
//!
//! | Part   | Line                              |
//! |--------|-----------------------------------|
//! | text   | `0:"chunk"`                       |
//! | error  | `3:"message"`                     |
//! | finish | `d:{"finishReason":"stop"}`       |
//!
//! Browser clients read the body incrementally and append text parts to
//! the message being typed.

use futures::Stream;
use parley_application::StreamHandle;
use parley_domain::StreamEvent;
use std::convert::Infallible;

/// Response header announcing the protocol version
pub const DATA_STREAM_HEADER: &str = "x-vercel-ai-data-stream";
pub const DATA_STREAM_VERSION: &str = "v1";
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

fn json_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

pub fn text_part(text: &str) -> String {
    format!("0:{}\n", json_string(text))
}

pub fn error_part(message: &str) -> String {
    format!("3:{}\n", json_string(message))
}

pub fn finish_part() -> String {
    "d:{\"finishReason\":\"stop\"}\n".to_string()
}

/// Protocol line for one stream event, and whether the stream ends there.
fn encode_event(event: StreamEvent) -> (String, bool) {
    match event {
        StreamEvent::Delta(chunk) => (text_part(&chunk), false),
        StreamEvent::Completed(_) => (finish_part(), true),
        StreamEvent::Error(message) => (error_part(&message), true),
    }
}

/// Body stream for a reply in progress.
///
/// Dropping the returned stream drops `handle`, which stops the producer
/// and aborts the upstream request.
pub fn encode(handle: StreamHandle) -> impl Stream<Item = Result<String, Infallible>> + Send {
    futures::stream::unfold(Some(handle), |state| async move {
        let mut handle = state?;
        match handle.recv().await {
            Some(event) => {
                let (line, terminal) = encode_event(event);
                let next = if terminal { None } else { Some(handle) };
                Some((Ok(line), next))
            }
            // Producer went away without a terminal event
            None => Some((Ok(finish_part()), None)),
        }
    })
}

/// Body for a reply that could not be started.
pub fn encode_error(message: String) -> impl Stream<Item = Result<String, Infallible>> + Send {
    futures::stream::iter([Ok(error_part(&message))])
}

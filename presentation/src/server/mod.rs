//! HTTP API for browser clients

pub mod data_stream;
pub mod router;

pub use router::{AppState, router, serve};

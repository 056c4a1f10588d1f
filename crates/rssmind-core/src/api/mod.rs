//! Backend transport
//!
//! Opens the two streaming endpoints and hands back the raw response body.
//! Decoding is the [`stream`](crate::stream) module's job.

mod client;
mod error;
mod replay;
mod types;

pub use client::{BackendClient, ByteStream, CHAT_STREAM_PATH, SUMMARY_STREAM_PATH};
pub use error::TransportError;
pub use replay::open_replay;
pub use types::{ChatRequest, RequestMessage, SummaryRequest};

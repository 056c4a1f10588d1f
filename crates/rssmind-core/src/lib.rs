//! rssmind core library
//!
//! Decodes server-streamed replies (chat and article summaries) into
//! growing text snapshots, and provides the transport, slot and
//! conversation plumbing around that decoder.

pub mod api;
pub mod config;
pub mod conversation;
pub mod session;
pub mod stream;

pub use config::ClientConfig;
pub use conversation::{ChatMessage, Conversation, Role};
pub use stream::{
    drive_stream, StreamController, StreamEvent, StreamMode, StreamObserver, StreamSession,
    StreamStatus,
};

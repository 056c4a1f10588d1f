//! Decoder error types

use thiserror::Error;

use super::session::StreamStatus;

/// A single event line that could not be turned into text.
///
/// Never fatal: the frame is skipped and the stream carries on.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid base64 payload {token:?}: {source}")]
    Base64 {
        token: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Operation attempted on a session that already reached a terminal state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("stream session is {status:?}; no further input accepted")]
    Terminal { status: StreamStatus },
}

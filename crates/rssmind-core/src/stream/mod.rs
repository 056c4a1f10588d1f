//! Incremental streaming decoder
//!
//! Turns an open, chunked response body into ever-growing text snapshots.
//! Two wire conventions are supported:
//!
//! - [`StreamMode::Framed`]: newline-delimited `data:<base64>` events with a
//!   `data:[DONE]` sentinel (chat replies)
//! - [`StreamMode::Raw`]: plain UTF-8 text (article summaries)
//!
//! The layers are kept separate so each can be tested alone:
//! [`utf8`] carries split code points across chunks, [`lines`] splits the
//! decoded text into complete lines, [`frame`] interprets each line, and
//! [`session`] owns the state for one request.

mod controller;
mod driver;
mod error;
pub mod frame;
pub mod lines;
mod session;
pub mod utf8;

pub use controller::{ChannelObserver, StreamController, StreamEvent, StreamObserver};
pub use driver::{drive_stream, StreamOutcome};
pub use error::{FrameError, SessionError};
pub use frame::{Frame, FrameEvent, FrameInterpreter, DONE_SENTINEL, EVENT_PREFIX};
pub use lines::LineFramer;
pub use session::{StreamMode, StreamSession, StreamStats, StreamStatus};
pub use utf8::{DecodedText, Utf8BoundaryDecoder};

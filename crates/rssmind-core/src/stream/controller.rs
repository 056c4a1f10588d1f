//! Stream controller
//!
//! Sits between the transport (chunks, end, error) and the UI (snapshots,
//! done, failed). Owns one [`StreamSession`] and guarantees each terminal
//! notification fires at most once.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::session::{StreamMode, StreamSession, StreamStatus};

/// Receiver of decoded output for one stream
pub trait StreamObserver: Send {
    /// Full text so far; replaces whatever was displayed before
    fn on_snapshot(&mut self, text: &str);
    /// The stream completed normally
    fn on_done(&mut self);
    /// The transport failed; the last snapshot stays valid
    fn on_failed(&mut self, message: &str);
}

/// Observer notifications as values, for channel delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Snapshot { text: String },
    Done,
    Failed { message: String },
}

/// Forwards notifications over an unbounded channel
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<StreamEvent>) -> Self {
        Self { tx }
    }

    /// Create an observer together with the receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: StreamEvent) {
        // Receiver gone means nobody is displaying this stream anymore
        if self.tx.send(event).is_err() {
            debug!("Stream event dropped: receiver closed");
        }
    }
}

impl StreamObserver for ChannelObserver {
    fn on_snapshot(&mut self, text: &str) {
        self.send(StreamEvent::Snapshot {
            text: text.to_string(),
        });
    }

    fn on_done(&mut self) {
        self.send(StreamEvent::Done);
    }

    fn on_failed(&mut self, message: &str) {
        self.send(StreamEvent::Failed {
            message: message.to_string(),
        });
    }
}

/// Drives one session from transport callbacks and notifies an observer
pub struct StreamController<O: StreamObserver> {
    session: StreamSession,
    observer: O,
}

impl<O: StreamObserver> StreamController<O> {
    pub fn new(mode: StreamMode, observer: O) -> Self {
        Self {
            session: StreamSession::start(mode),
            observer,
        }
    }

    pub fn session(&self) -> &StreamSession {
        &self.session
    }

    pub fn status(&self) -> StreamStatus {
        self.session.status()
    }

    /// Give back the observer and the final session state
    pub fn into_parts(self) -> (StreamSession, O) {
        (self.session, self.observer)
    }

    /// A chunk arrived from the transport
    pub fn on_chunk(&mut self, bytes: &[u8]) {
        match self.session.push_chunk(bytes) {
            Ok(text) => self.observer.on_snapshot(text),
            Err(e) => warn!("Chunk ignored: {}", e),
        }
    }

    /// The transport closed the body gracefully
    pub fn on_end(&mut self) {
        match self.session.finish() {
            Ok(text) => {
                self.observer.on_snapshot(text);
                self.observer.on_done();
            }
            Err(e) => warn!("End of stream ignored: {}", e),
        }
    }

    /// The transport reported an error before the end of the body
    pub fn on_error(&mut self, error: impl std::fmt::Display) {
        let message = error.to_string();
        match self.session.fail(&message) {
            Ok(_) => self.observer.on_failed(&message),
            Err(e) => warn!("Transport error after terminal state ignored: {}", e),
        }
    }

    /// Abort: nothing reaches the observer after this
    pub fn cancel(&mut self) {
        if let Err(e) = self.session.cancel() {
            debug!("Cancel on finished stream: {}", e);
        }
    }
}

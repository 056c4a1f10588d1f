//! Stream session state
//!
//! One [`StreamSession`] per in-flight request. All buffers live here, so two
//! requests can never bleed into each other's text.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::SessionError;
use super::frame::{FrameEvent, FrameInterpreter};
use super::lines::LineFramer;
use super::utf8::Utf8BoundaryDecoder;

/// Wire convention of the response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamMode {
    /// Plain UTF-8 text, appended as it arrives
    Raw,
    /// `data:<base64>` event lines ended by `data:[DONE]`
    Framed,
}

/// Lifecycle of a session. Everything but `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    Active,
    Completed,
    Failed,
    Cancelled,
}

impl StreamStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, StreamStatus::Active)
    }
}

/// Diagnostic counters for one session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    /// Chunks pushed by the transport
    pub chunks: usize,
    /// Bytes received
    pub bytes: usize,
    /// Event lines seen (framed mode)
    pub frames: usize,
    /// Event lines skipped because their payload failed to decode
    pub skipped_frames: usize,
    /// Invalid or truncated UTF-8 bytes discarded
    pub dropped_bytes: usize,
}

/// Decoder state for a single streamed response
#[derive(Debug)]
pub struct StreamSession {
    id: Uuid,
    mode: StreamMode,
    status: StreamStatus,
    /// Full decoded text so far; append-only
    text: String,
    utf8: Utf8BoundaryDecoder,
    lines: LineFramer,
    frames: FrameInterpreter,
    failure: Option<String>,
    chunks: usize,
    bytes: usize,
    dropped_bytes: usize,
    started_at: Instant,
}

impl StreamSession {
    /// Start a new active session with empty buffers
    pub fn start(mode: StreamMode) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, mode = ?mode, "Stream session started");
        Self {
            id,
            mode,
            status: StreamStatus::Active,
            text: String::new(),
            utf8: Utf8BoundaryDecoder::new(),
            lines: LineFramer::new(),
            frames: FrameInterpreter::new(),
            failure: None,
            chunks: 0,
            bytes: 0,
            dropped_bytes: 0,
            started_at: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> StreamMode {
        self.mode
    }

    pub fn status(&self) -> StreamStatus {
        self.status
    }

    /// Current full text. Repeated calls without new input return the same text.
    pub fn snapshot(&self) -> &str {
        &self.text
    }

    /// Failure message recorded by [`fail`](Self::fail)
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Whether the producer sent its `[DONE]` sentinel
    pub fn done_received(&self) -> bool {
        self.frames.done_received()
    }

    /// Trailing line fragment still waiting for a newline (framed mode)
    pub fn pending_line(&self) -> &str {
        self.lines.pending()
    }

    /// Undecoded bytes carried from the last chunk
    pub fn pending_bytes(&self) -> &[u8] {
        self.utf8.pending()
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            chunks: self.chunks,
            bytes: self.bytes,
            frames: self.frames.frames(),
            skipped_frames: self.frames.skipped(),
            dropped_bytes: self.dropped_bytes,
        }
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.status.is_terminal() {
            warn!(session = %self.id, status = ?self.status, "Input rejected by terminal session");
            return Err(SessionError::Terminal {
                status: self.status,
            });
        }
        Ok(())
    }

    /// Feed one chunk from the transport and return the updated snapshot
    pub fn push_chunk(&mut self, bytes: &[u8]) -> Result<&str, SessionError> {
        self.ensure_active()?;

        self.chunks += 1;
        self.bytes += bytes.len();
        debug!(
            session = %self.id,
            "Chunk #{} received: {} bytes (total: {} bytes)",
            self.chunks,
            bytes.len(),
            self.bytes
        );

        let decoded = self.utf8.decode(bytes);
        self.dropped_bytes += decoded.dropped;

        match self.mode {
            StreamMode::Raw => self.text.push_str(&decoded.text),
            StreamMode::Framed => {
                for line in self.lines.push(&decoded.text) {
                    self.apply_line(&line);
                }
            }
        }

        Ok(&self.text)
    }

    fn apply_line(&mut self, line: &str) {
        match self.frames.interpret(line) {
            FrameEvent::Text(text) => self.text.push_str(&text),
            FrameEvent::Done => {
                info!(
                    session = %self.id,
                    "[DONE] marker received after {:?}, {} frames, {} bytes",
                    self.started_at.elapsed(),
                    self.frames.frames(),
                    self.bytes
                );
            }
            FrameEvent::Ignored | FrameEvent::Skipped => {}
        }
    }

    /// End of stream: flush the unterminated last line and complete
    pub fn finish(&mut self) -> Result<&str, SessionError> {
        self.ensure_active()?;

        self.dropped_bytes += self.utf8.finish();
        if self.mode == StreamMode::Framed {
            if let Some(line) = self.lines.take_pending() {
                debug!(session = %self.id, "Flushing unterminated final line");
                self.apply_line(&line);
            }
        }

        self.status = StreamStatus::Completed;
        let stats = self.stats();
        info!(
            session = %self.id,
            "Stream completed: {:?} elapsed, {} chunks, {} bytes, {} frames ({} skipped), {} chars",
            self.started_at.elapsed(),
            stats.chunks,
            stats.bytes,
            stats.frames,
            stats.skipped_frames,
            self.text.chars().count()
        );
        Ok(&self.text)
    }

    /// Transport failure: keep the partial text and record the error
    pub fn fail(&mut self, error: impl std::fmt::Display) -> Result<&str, SessionError> {
        self.ensure_active()?;

        let message = error.to_string();
        warn!(
            session = %self.id,
            "Stream failed after {:?} ({} bytes kept): {}",
            self.started_at.elapsed(),
            self.text.len(),
            message
        );
        self.failure = Some(message);
        self.status = StreamStatus::Failed;
        Ok(&self.text)
    }

    /// Abort the session; the current snapshot is frozen from here on
    pub fn cancel(&mut self) -> Result<&str, SessionError> {
        self.ensure_active()?;

        info!(
            session = %self.id,
            "Stream cancelled after {:?}",
            self.started_at.elapsed()
        );
        self.status = StreamStatus::Cancelled;
        Ok(&self.text)
    }
}

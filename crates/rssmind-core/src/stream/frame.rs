//! Event line interpretation for framed streams
//!
//! Each complete line is one frame. A frame starting with `data:` carries
//! either the `[DONE]` sentinel or a Base64 blob whose bytes are UTF-8 text.
//! Everything else is ignored. The Base64 layer is decoded per frame, with no
//! state carried between frames.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use tracing::{debug, warn};

use super::error::FrameError;

/// Prefix that marks an event line (case-sensitive)
pub const EVENT_PREFIX: &str = "data:";

/// Payload token signalling that the producer has nothing more to send
pub const DONE_SENTINEL: &str = "[DONE]";

/// Standard alphabet, accepting payloads with or without `=` padding
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// One classified line of a framed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// `data:[DONE]`
    Done,
    /// `data:<token>` with the token trimmed, still Base64-encoded
    Payload(&'a str),
    /// Anything without the event prefix
    Ignored,
}

impl<'a> Frame<'a> {
    /// Classify a line without decoding its payload
    pub fn parse(line: &'a str) -> Self {
        match line.strip_prefix(EVENT_PREFIX) {
            Some(rest) => {
                let token = rest.trim();
                if token == DONE_SENTINEL {
                    Frame::Done
                } else {
                    Frame::Payload(token)
                }
            }
            None => Frame::Ignored,
        }
    }
}

/// Decode a Base64 payload token into its UTF-8 text
pub fn decode_payload(token: &str) -> Result<String, FrameError> {
    let bytes = PAYLOAD_ENGINE
        .decode(token)
        .map_err(|source| FrameError::Base64 {
            token: token.to_string(),
            source,
        })?;
    Ok(String::from_utf8(bytes)?)
}

/// What a single line contributed to the stream
#[derive(Debug, PartialEq, Eq)]
pub enum FrameEvent {
    /// Decoded text to append
    Text(String),
    /// Completion sentinel seen
    Done,
    /// Line carried no event
    Ignored,
    /// Event line whose payload could not be decoded; skipped
    Skipped,
}

/// Interprets complete lines and keeps per-stream frame counters
#[derive(Debug, Default)]
pub struct FrameInterpreter {
    frames: usize,
    skipped: usize,
    done: bool,
}

impl FrameInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of event lines seen (including skipped and sentinel lines)
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of event lines whose payload failed to decode
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Whether the `[DONE]` sentinel has been seen
    pub fn done_received(&self) -> bool {
        self.done
    }

    /// Interpret one complete line
    pub fn interpret(&mut self, line: &str) -> FrameEvent {
        match Frame::parse(line) {
            Frame::Ignored => FrameEvent::Ignored,
            Frame::Done => {
                self.frames += 1;
                if self.done {
                    debug!("Repeated [DONE] sentinel");
                }
                self.done = true;
                FrameEvent::Done
            }
            Frame::Payload(token) => {
                self.frames += 1;
                if self.done {
                    // Tolerated: the transport's end-of-stream still decides completion
                    debug!("Payload frame #{} after [DONE] sentinel", self.frames);
                }
                match decode_payload(token) {
                    Ok(text) => FrameEvent::Text(text),
                    Err(e) => {
                        self.skipped += 1;
                        warn!("Skipping frame #{}: {}", self.frames, e);
                        FrameEvent::Skipped
                    }
                }
            }
        }
    }
}

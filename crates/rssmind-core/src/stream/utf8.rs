//! Byte-to-text boundary decoding
//!
//! Network chunks are cut at arbitrary byte offsets, so a multi-byte code
//! point can arrive split across two reads. The decoder keeps the trailing
//! incomplete sequence (at most 3 bytes) and prepends it to the next chunk.

use std::borrow::Cow;

use tracing::warn;

/// Longest incomplete UTF-8 sequence that can be carried between chunks
const MAX_CARRY: usize = 3;

/// Text produced from one decode call
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// Longest valid text decodable so far
    pub text: String,
    /// Invalid bytes discarded while decoding
    pub dropped: usize,
}

/// Stateful UTF-8 decoder that never splits a code point
#[derive(Debug, Default)]
pub struct Utf8BoundaryDecoder {
    carry: Vec<u8>,
}

impl Utf8BoundaryDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes held back from the previous chunk
    pub fn pending(&self) -> &[u8] {
        &self.carry
    }

    /// Decode `chunk` together with any carried bytes.
    ///
    /// Invalid sequences are dropped (and counted); an incomplete sequence at
    /// the end of the input is carried into the next call.
    pub fn decode(&mut self, chunk: &[u8]) -> DecodedText {
        let input: Cow<'_, [u8]> = if self.carry.is_empty() {
            Cow::Borrowed(chunk)
        } else {
            let mut joined = std::mem::take(&mut self.carry);
            joined.extend_from_slice(chunk);
            Cow::Owned(joined)
        };

        let mut out = DecodedText {
            text: String::with_capacity(input.len()),
            dropped: 0,
        };
        let mut rest: &[u8] = &input;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.text.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // valid_up_to guarantees this prefix is well-formed
                    if let Ok(valid) = std::str::from_utf8(valid) {
                        out.text.push_str(valid);
                    }
                    match e.error_len() {
                        Some(bad) => {
                            warn!(
                                "Dropping {} invalid UTF-8 byte(s): {:02x?}",
                                bad,
                                &after[..bad]
                            );
                            out.dropped += bad;
                            rest = &after[bad..];
                        }
                        None => {
                            debug_assert!(after.len() <= MAX_CARRY);
                            self.carry.extend_from_slice(after);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// End of input: any carried bytes can never complete, so they are dropped.
    ///
    /// Returns the number of bytes discarded.
    pub fn finish(&mut self) -> usize {
        let dropped = self.carry.len();
        if dropped > 0 {
            warn!(
                "Stream ended inside a multi-byte sequence; dropping {} byte(s)",
                dropped
            );
            self.carry.clear();
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ascii_passes_through() {
        let mut decoder = Utf8BoundaryDecoder::new();
        let out = decoder.decode(b"hello");
        assert_eq!(out.text, "hello");
        assert_eq!(out.dropped, 0);
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn test_split_two_byte_sequence() {
        let mut decoder = Utf8BoundaryDecoder::new();
        let first = decoder.decode(b"caf\xC3");
        assert_eq!(first.text, "caf");
        assert_eq!(decoder.pending(), &[0xC3]);

        let second = decoder.decode(b"\xA9 !");
        assert_eq!(second.text, "é !");
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn test_four_byte_sequence_split_byte_by_byte() {
        let crab = "🦀".as_bytes();
        let mut decoder = Utf8BoundaryDecoder::new();
        let mut text = String::new();
        for byte in crab {
            text.push_str(&decoder.decode(std::slice::from_ref(byte)).text);
        }
        assert_eq!(text, "🦀");
        assert_eq!(decoder.finish(), 0);
    }

    #[test]
    fn test_invalid_byte_is_dropped_not_fatal() {
        let mut decoder = Utf8BoundaryDecoder::new();
        let out = decoder.decode(b"ok\xFFstill ok");
        assert_eq!(out.text, "okstill ok");
        assert_eq!(out.dropped, 1);
    }

    #[test]
    fn test_invalid_continuation_inside_carry() {
        let mut decoder = Utf8BoundaryDecoder::new();
        assert_eq!(decoder.decode(b"a\xE2\x82").text, "a");
        // 'x' cannot continue the three-byte sequence
        let out = decoder.decode(b"x");
        assert_eq!(out.text, "x");
        assert_eq!(out.dropped, 2);
        assert!(decoder.pending().is_empty());
    }

    #[test]
    fn test_finish_drops_truncated_tail() {
        let mut decoder = Utf8BoundaryDecoder::new();
        decoder.decode(b"end\xE4\xB8");
        assert_eq!(decoder.finish(), 2);
        assert!(decoder.pending().is_empty());
    }
}

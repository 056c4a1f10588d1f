//! Line framing over decoded text
//!
//! Pure text splitting: no decoding happens here.

/// Splits decoded text on `\n`, holding back the unterminated tail
#[derive(Debug, Default)]
pub struct LineFramer {
    /// Text after the last newline seen so far
    pending: String,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The trailing fragment not yet terminated by a newline
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Append `text` and return every line it completed, in order.
    ///
    /// Empty lines are returned as empty strings.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.pending.push_str(text);

        // Newlines can only be in the new text
        if !text.contains('\n') {
            return Vec::new();
        }
        let Some(cut) = self.pending.rfind('\n') else {
            return Vec::new();
        };

        let tail = self.pending.split_off(cut + 1);
        let complete = std::mem::replace(&mut self.pending, tail);
        complete[..cut].split('\n').map(str::to_owned).collect()
    }

    /// Take the unterminated tail, if any (end-of-stream flush)
    pub fn take_pending(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

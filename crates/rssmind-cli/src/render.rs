//! Terminal rendering of stream snapshots
//!
//! Snapshots are full texts that only ever grow, so the terminal prints just
//! the suffix it has not shown yet.

use std::future::Future;
use std::io::Write;

use rssmind_core::api::{ByteStream, TransportError};
use rssmind_core::stream::{
    drive_stream, StreamController, StreamMode, StreamObserver, StreamOutcome,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Prints stream progress to `out`, failures to `err`
pub struct TerminalObserver<W: Write + Send, E: Write + Send> {
    out: W,
    err: E,
    /// Snapshot currently on screen
    shown: String,
}

impl TerminalObserver<std::io::Stdout, std::io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdout(), std::io::stderr())
    }
}

impl<W: Write + Send, E: Write + Send> TerminalObserver<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self {
            out,
            err,
            shown: String::new(),
        }
    }

    fn write_out(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }

    fn write_err(&mut self, text: &str) {
        if let Err(e) = self.err.write_all(text.as_bytes()).and_then(|_| self.err.flush()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }
}

impl<W: Write + Send, E: Write + Send> StreamObserver for TerminalObserver<W, E> {
    fn on_snapshot(&mut self, text: &str) {
        if text == self.shown {
            return;
        }
        match text.strip_prefix(self.shown.as_str()) {
            Some(suffix) => self.write_out(suffix),
            None => {
                // Not an extension of what is on screen; start over on a new line
                self.write_out("\n");
                self.write_out(text);
            }
        }
        self.shown.clear();
        self.shown.push_str(text);
    }

    fn on_done(&mut self) {
        if !self.shown.ends_with('\n') {
            self.write_out("\n");
        }
    }

    fn on_failed(&mut self, message: &str) {
        if !self.shown.is_empty() && !self.shown.ends_with('\n') {
            self.write_out("\n");
        }
        self.write_err(&format!("[stream failed] {message}\n"));
    }
}

/// Open a body with `open` and decode it straight to the terminal
pub async fn stream_to_terminal<F>(
    mode: StreamMode,
    open: F,
    cancel: CancellationToken,
) -> StreamOutcome
where
    F: Future<Output = Result<ByteStream, TransportError>>,
{
    run_stream(mode, TerminalObserver::stdio(), open, cancel).await
}

/// Open and drive one stream. `cancel` also aborts while waiting for the
/// response headers.
pub async fn run_stream<O, F>(
    mode: StreamMode,
    observer: O,
    open: F,
    cancel: CancellationToken,
) -> StreamOutcome
where
    O: StreamObserver,
    F: Future<Output = Result<ByteStream, TransportError>>,
{
    let mut controller = StreamController::new(mode, observer);
    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        body = open => Some(body),
    };

    match opened {
        Some(Ok(body)) => drive_stream(&mut controller, body, cancel).await,
        Some(Err(e)) => {
            controller.on_error(&e);
            StreamOutcome::of(controller.session())
        }
        None => {
            debug!("Cancelled before the response arrived");
            controller.cancel();
            StreamOutcome::of(controller.session())
        }
    }
}

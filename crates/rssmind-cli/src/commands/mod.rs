//! Subcommand implementations
//!
//! Each returns whether the stream completed, which becomes the exit code.

pub mod chat;
pub mod replay;
pub mod summarize;

use std::sync::Arc;

use parking_lot::Mutex;
use rssmind_core::stream::{StreamOutcome, StreamStatus};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What a Ctrl-C press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interrupt {
    /// Cancelled the stream in flight
    Cancelled,
    /// Nothing was streaming; the command should stop
    Quit,
}

#[derive(Default)]
struct InterruptState {
    /// Token of the stream in flight, if any
    current: Mutex<Option<CancellationToken>>,
    quit: CancellationToken,
}

impl InterruptState {
    fn interrupt(&self) -> Interrupt {
        match self.current.lock().take() {
            Some(token) => {
                token.cancel();
                Interrupt::Cancelled
            }
            None => {
                self.quit.cancel();
                Interrupt::Quit
            }
        }
    }
}

/// Process-wide Ctrl-C handling.
///
/// Once tokio installs its SIGINT handler the default one is gone for good,
/// so a single listener lives for the whole command and routes each press.
pub(crate) struct CtrlC {
    state: Arc<InterruptState>,
    listener: Option<JoinHandle<()>>,
}

impl CtrlC {
    /// Start listening for Ctrl-C
    pub fn listen() -> Self {
        let state = Arc::new(InterruptState::default());
        let routed = Arc::clone(&state);
        let listener = tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                let action = routed.interrupt();
                debug!("Ctrl-C received: {:?}", action);
                if action == Interrupt::Quit {
                    break;
                }
            }
        });
        Self {
            state,
            listener: Some(listener),
        }
    }

    /// Route Ctrl-C to `token` until the guard is dropped
    pub fn arm(&self, token: CancellationToken) -> ArmedStream<'_> {
        *self.state.current.lock() = Some(token);
        ArmedStream { ctrl_c: self }
    }

    /// Resolves once Ctrl-C is pressed with nothing streaming
    pub async fn quit_requested(&self) {
        self.state.quit.cancelled().await
    }

    #[cfg(test)]
    fn detached() -> Self {
        Self {
            state: Arc::new(InterruptState::default()),
            listener: None,
        }
    }

    #[cfg(test)]
    fn press(&self) -> Interrupt {
        self.state.interrupt()
    }
}

impl Drop for CtrlC {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

/// Keeps a stream registered with [`CtrlC`]
pub(crate) struct ArmedStream<'a> {
    ctrl_c: &'a CtrlC,
}

impl Drop for ArmedStream<'_> {
    fn drop(&mut self) {
        self.ctrl_c.state.current.lock().take();
    }
}

pub(crate) fn report(outcome: &StreamOutcome) -> bool {
    match outcome.status {
        StreamStatus::Completed => true,
        StreamStatus::Cancelled => {
            eprintln!("[cancelled]");
            false
        }
        StreamStatus::Failed | StreamStatus::Active => false,
    }
}

//! Async pump from a transport byte stream into a [`StreamController`]

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::controller::{StreamController, StreamObserver};
use super::session::{StreamSession, StreamStatus};

/// Final state of a driven stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    pub status: StreamStatus,
    pub text: String,
    pub failure: Option<String>,
}

impl StreamOutcome {
    /// Current state of `session`
    pub fn of(session: &StreamSession) -> Self {
        Self {
            status: session.status(),
            text: session.snapshot().to_string(),
            failure: session.failure().map(str::to_string),
        }
    }
}

/// Read `body` to the end, one chunk at a time, feeding `controller`.
///
/// Chunks are awaited in order so the session never sees concurrent input.
/// If `cancel` fires first the session is cancelled and its snapshot frozen;
/// closing the connection is left to whoever owns `body` (dropping it is
/// enough for reqwest).
pub async fn drive_stream<O, S, B, E>(
    controller: &mut StreamController<O>,
    body: S,
    cancel: CancellationToken,
) -> StreamOutcome
where
    O: StreamObserver,
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut body = std::pin::pin!(body);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let session = controller.session();
                info!(
                    session = %session.id(),
                    mode = ?session.mode(),
                    "Stream cancelled by caller"
                );
                controller.cancel();
                break;
            }
            next = body.next() => match next {
                Some(Ok(chunk)) => controller.on_chunk(chunk.as_ref()),
                Some(Err(e)) => {
                    controller.on_error(format!("stream error: {e}"));
                    break;
                }
                None => {
                    controller.on_end();
                    break;
                }
            }
        }
    }

    StreamOutcome::of(controller.session())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{ChannelObserver, StreamEvent, StreamMode};
    use bytes::Bytes;

    fn chunks(parts: &[&'static [u8]]) -> impl Stream<Item = Result<Bytes, String>> {
        futures::stream::iter(
            parts
                .iter()
                .copied()
                .map(|p| Ok::<_, String>(Bytes::from_static(p)))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_drive_framed_stream_to_completion() {
        let (observer, mut rx) = ChannelObserver::channel();
        let mut controller = StreamController::new(StreamMode::Framed, observer);
        let body = chunks(&[b"data:", b"aGVsbG8=\n", b"data:[DONE]\n"]);

        let outcome = drive_stream(&mut controller, body, CancellationToken::new()).await;
        assert_eq!(outcome.status, StreamStatus::Completed);
        assert_eq!(outcome.text, "hello");
        drop(controller);

        let mut done = 0;
        while let Some(event) = rx.recv().await {
            if event == StreamEvent::Done {
                done += 1;
            }
        }
        assert_eq!(done, 1);
    }

    #[tokio::test]
    async fn test_drive_stream_error_keeps_partial() {
        let (observer, _rx) = ChannelObserver::channel();
        let mut controller = StreamController::new(StreamMode::Raw, observer);
        let body = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"first ")),
            Err("connection reset".to_string()),
            Ok(Bytes::from_static(b"never")),
        ]);

        let outcome = drive_stream(&mut controller, body, CancellationToken::new()).await;
        assert_eq!(outcome.status, StreamStatus::Failed);
        assert_eq!(outcome.text, "first ");
        assert_eq!(
            outcome.failure.as_deref(),
            Some("stream error: connection reset")
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (observer, _rx) = ChannelObserver::channel();
        let mut controller = StreamController::new(StreamMode::Raw, observer);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = drive_stream(&mut controller, chunks(&[b"abc"]), cancel).await;
        assert_eq!(outcome.status, StreamStatus::Cancelled);
        assert_eq!(outcome.text, "");
    }
}

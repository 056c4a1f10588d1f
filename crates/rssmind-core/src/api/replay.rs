//! Captured response bodies replayed from disk

use std::path::Path;

use bytes::Bytes;
use tracing::info;

use super::client::ByteStream;
use super::error::TransportError;

/// Open `path` as a body stream cut into chunks of exactly `chunk_size` bytes
/// (the last one may be shorter).
///
/// Cuts ignore character boundaries, like a real network read.
pub async fn open_replay(path: &Path, chunk_size: usize) -> Result<ByteStream, TransportError> {
    let body = Bytes::from(tokio::fs::read(path).await?);
    let chunk_size = chunk_size.max(1);
    info!(
        "Replaying {:?}: {} bytes in chunks of {}",
        path,
        body.len(),
        chunk_size
    );

    let chunks: Vec<Result<Bytes, TransportError>> = (0..body.len())
        .step_by(chunk_size)
        .map(|start| Ok(body.slice(start..(start + chunk_size).min(body.len()))))
        .collect();
    Ok(Box::pin(futures::stream::iter(chunks)))
}

//! Offline decoding of a captured response body

use std::path::Path;

use anyhow::Result;
use rssmind_core::api::open_replay;
use rssmind_core::stream::StreamMode;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{report, CtrlC};
use crate::render::stream_to_terminal;

pub async fn run(mode: StreamMode, file: &Path, chunk_size: usize) -> Result<bool> {
    let cancel = CancellationToken::new();
    let ctrl_c = CtrlC::listen();
    let _armed = ctrl_c.arm(cancel.clone());

    let outcome = stream_to_terminal(mode, open_replay(file, chunk_size), cancel).await;
    info!(
        "Replay of {:?} finished: {:?}, {} chars",
        file,
        outcome.status,
        outcome.text.chars().count()
    );
    Ok(report(&outcome))
}

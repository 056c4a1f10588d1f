//! One-shot article summary

use anyhow::{Context, Result};
use rssmind_core::api::{BackendClient, SummaryRequest};
use rssmind_core::session::{SlotKey, SlotRegistry};
use rssmind_core::stream::StreamMode;
use rssmind_core::ClientConfig;
use tracing::debug;

use super::{report, CtrlC};
use crate::render::stream_to_terminal;

pub async fn run(config: &ClientConfig, url: String, article_id: Option<String>) -> Result<bool> {
    let client = BackendClient::new(config).context("Failed to create backend client")?;
    let slots = SlotRegistry::new();

    let key = SlotKey::summary(article_id.as_deref().unwrap_or(url.as_str()));
    let lease = slots.claim(key);
    debug!("Summary from {} streaming into {}", client.base_url(), lease.key());
    let ctrl_c = CtrlC::listen();
    let _armed = ctrl_c.arm(lease.token());

    let request = SummaryRequest { article_id, url };
    let outcome =
        stream_to_terminal(StreamMode::Raw, client.open_summary(&request), lease.token()).await;
    slots.release(&lease);

    Ok(report(&outcome))
}

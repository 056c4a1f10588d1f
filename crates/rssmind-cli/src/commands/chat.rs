//! Interactive chat

use std::io::Write;

use anyhow::{Context, Result};
use rssmind_core::api::{BackendClient, ChatRequest};
use rssmind_core::session::{SlotKey, SlotRegistry};
use rssmind_core::stream::{StreamMode, StreamStatus};
use rssmind_core::{ClientConfig, Conversation};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::{report, CtrlC};
use crate::render::stream_to_terminal;

const THREAD: &str = "main";

pub async fn run(config: &ClientConfig) -> Result<bool> {
    let client = BackendClient::new(config).context("Failed to create backend client")?;
    let slots = SlotRegistry::new();
    let mut conversation = Conversation::new();
    let ctrl_c = CtrlC::listen();

    eprintln!(
        "Chatting with {} at {} (temperature {:.1}). Ctrl-C stops a reply or exits at the prompt.",
        config.model,
        client.base_url(),
        config.temperature
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        std::io::stderr().flush().ok();

        let line = tokio::select! {
            _ = ctrl_c.quit_requested() => {
                eprintln!();
                break;
            }
            line = lines.next_line() => line.context("Failed to read stdin")?,
        };
        let Some(line) = line else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let history = conversation.push_user(input);
        let request = ChatRequest::new(&config.model, history, config.temperature);
        let reply_id = conversation.begin_reply();

        let lease = slots.claim(SlotKey::chat(THREAD));
        debug!("Reply #{} streaming into {}", lease.generation(), lease.key());
        let outcome = {
            let _armed = ctrl_c.arm(lease.token());
            stream_to_terminal(StreamMode::Framed, client.open_chat(&request), lease.token())
                .await
        };
        slots.release(&lease);

        conversation.apply_snapshot(reply_id, &outcome.text);
        if outcome.status == StreamStatus::Failed {
            let message = outcome.failure.as_deref().unwrap_or("unknown error");
            conversation.record_failure(message);
        }
        report(&outcome);
        info!(
            "Conversation {:?}: {} messages",
            conversation.title(),
            conversation.messages().len()
        );
    }

    slots.cancel_all();
    Ok(true)
}

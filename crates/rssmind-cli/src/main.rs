//! rssmind - terminal front-end for the reader's chat assistant and article summaries

mod cli;
mod commands;
mod render;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "rssmind=warn,rssmind_core=warn",
        1 => "rssmind=info,rssmind_core=info",
        _ => "rssmind=debug,rssmind_core=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // stdout carries streamed text only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the subcommand. Only backend commands load and validate configuration.
async fn dispatch(cli: &Cli) -> Result<bool> {
    match &cli.command {
        Command::Chat => commands::chat::run(&cli.resolve_config()?).await,
        Command::Summarize { url, article_id } => {
            let config = cli.resolve_config()?;
            commands::summarize::run(&config, url.clone(), article_id.clone()).await
        }
        Command::Replay {
            mode,
            file,
            chunk_size,
        } => commands::replay::run((*mode).into(), file, *chunk_size).await,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    Ok(if dispatch(&cli).await? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

//! Command-line arguments

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rssmind_core::stream::StreamMode;
use rssmind_core::ClientConfig;

#[derive(Debug, Parser)]
#[command(name = "rssmind", version, about = "Chat and article summaries from your reader backend")]
pub struct Cli {
    /// Config file (defaults to <config dir>/rssmind/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Chat model
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 - 1.0)
    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chat with the assistant; one message per line, Ctrl-C stops a reply
    Chat,

    /// Stream an AI summary of an article
    Summarize {
        /// Article link
        #[arg(long)]
        url: String,

        /// Article id known to the backend
        #[arg(long)]
        article_id: Option<String>,
    },

    /// Decode a captured response body from a file
    Replay {
        /// Wire convention of the capture
        #[arg(long, value_enum)]
        mode: ModeArg,

        /// Captured body
        file: PathBuf,

        /// Bytes per simulated network chunk
        #[arg(long, default_value_t = 64)]
        chunk_size: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Raw,
    Framed,
}

impl From<ModeArg> for StreamMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Raw => StreamMode::Raw,
            ModeArg::Framed => StreamMode::Framed,
        }
    }
}

impl Cli {
    /// File/env config with command-line overrides applied
    pub fn resolve_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = ClientConfig::load_from(path)
                    .with_context(|| format!("Failed to load config {:?}", path))?;
                config.apply_env(|key| std::env::var(key).ok());
                config
            }
            None => ClientConfig::load().context("Failed to load config")?,
        };

        if let Some(url) = &self.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model = \"from-file\"").unwrap();
        writeln!(file, "temperature = 0.1").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let cli = Cli::parse_from([
            "rssmind",
            "--config",
            path.as_str(),
            "--temperature",
            "0.9",
            "summarize",
            "--url",
            "https://example.com",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.temperature, 0.9);
        assert!(matches!(cli.command, Command::Summarize { .. }));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().to_string();
        let cli = Cli::parse_from([
            "rssmind",
            "--config",
            path.as_str(),
            "--temperature",
            "3",
            "chat",
        ]);
        assert!(cli.resolve_config().is_err());
    }

    #[test]
    fn test_replay_args() {
        let cli = Cli::parse_from(["rssmind", "replay", "--mode", "framed", "body.txt"]);
        match cli.command {
            Command::Replay {
                mode, chunk_size, ..
            } => {
                assert_eq!(StreamMode::from(mode), StreamMode::Framed);
                assert_eq!(chunk_size, 64);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

//! Client configuration
//!
//! Loaded from `<config dir>/rssmind/config.toml`, then overridden by
//! `RSSMIND_BACKEND_URL` / `RSSMIND_MODEL`. A missing file means defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const ENV_BACKEND_URL: &str = "RSSMIND_BACKEND_URL";
pub const ENV_MODEL: &str = "RSSMIND_MODEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the reader backend
    pub backend_url: String,
    /// Chat model requested from the backend
    pub model: String,
    /// Sampling temperature, 0.0 (precise) to 1.0 (creative)
    pub temperature: f32,
    /// TCP connect timeout for backend requests
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            model: "qwen-plus-latest".to_string(),
            temperature: 0.7,
            connect_timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rssmind").join("config.toml"))
    }

    /// Load from the default location plus environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a specific file (no environment overrides)
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process environment)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.is_empty()) {
            debug!("Backend URL overridden by {}", ENV_BACKEND_URL);
            self.backend_url = url;
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.is_empty()) {
            self.model = model;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.backend_url)
            .map_err(|e| ConfigError::Invalid(format!("backend_url {:?}: {e}", self.backend_url)))?;
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} outside 0.0..=1.0",
                self.temperature
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model, "qwen-plus-latest");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ClientConfig::parse("model = \"gpt-4\"\n").unwrap();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.temperature, 0.7);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ClientConfig::parse("temperature = 1.5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ClientConfig::parse("backend_url = \"not a url\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ClientConfig::parse("temperature = \"hot\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend_url = \"https://reader.example.com/api\"").unwrap();
        writeln!(file, "temperature = 0.2").unwrap();

        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(config.backend_url, "https://reader.example.com/api");
        assert_eq!(config.temperature, 0.2);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClientConfig::load_from(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ClientConfig::default();
        config.apply_env(|key| match key {
            ENV_BACKEND_URL => Some("http://10.0.0.2:9000".to_string()),
            ENV_MODEL => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.backend_url, "http://10.0.0.2:9000");
        assert_eq!(config.model, "qwen-plus-latest");
    }
}

//! Configuration management for the goll client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default API base URL (can be overridden at compile time via GOLL_API_URL).
pub const DEFAULT_API_BASE_URL: &str = match option_env!("GOLL_API_URL") {
    Some(url) => url,
    None => "https://api.goll.gg/api",
};

/// Default live-update stream URL (can be overridden at compile time via GOLL_STREAM_URL).
pub const DEFAULT_STREAM_URL: &str = match option_env!("GOLL_STREAM_URL") {
    Some(url) => url,
    None => "wss://api.goll.gg/stream",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Which transport backs the request layer.
///
/// Selected at configuration time so the coordinator stays
/// transport-agnostic; `Memory` runs against the seeded in-process fake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Http,
    Memory,
}

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// REST API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Live-update stream base URL.
    #[serde(default = "default_stream_url")]
    pub stream_url: String,
    /// Transport selection (http or memory).
    #[serde(default)]
    pub transport: TransportKind,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_stream_url() -> String {
    DEFAULT_STREAM_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            stream_url: DEFAULT_STREAM_URL.to_string(),
            transport: TransportKind::default(),
        }
    }
}

impl Config {
    /// Load configuration from the config file, falling back to defaults.
    /// Environment variables override values from the file.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn load_from_env(&mut self) {
        if let Ok(url) = std::env::var("GOLL_API_URL") {
            if !url.is_empty() {
                self.api_base_url = url;
            }
        }
        if let Ok(url) = std::env::var("GOLL_STREAM_URL") {
            if !url.is_empty() {
                self.stream_url = url;
            }
        }
        if let Ok(level) = std::env::var("GOLL_LOG_LEVEL") {
            if !level.is_empty() {
                self.log_level = level;
            }
        }
        if let Ok(kind) = std::env::var("GOLL_TRANSPORT") {
            match kind.to_ascii_lowercase().as_str() {
                "memory" => self.transport = TransportKind::Memory,
                "http" => self.transport = TransportKind::Http,
                "" => {}
                other => {
                    tracing::warn!(transport = %other, "Unknown GOLL_TRANSPORT value, keeping current");
                }
            }
        }
    }

    /// Validate that configured endpoints are well-formed URLs.
    pub fn validate(&self) -> CoreResult<()> {
        Url::parse(&self.api_base_url)
            .map_err(|e| CoreError::Config(format!("api_base_url: {}", e)))?;
        Url::parse(&self.stream_url)
            .map_err(|e| CoreError::Config(format!("stream_url: {}", e)))?;
        Ok(())
    }

    /// Persist the configuration to the config file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_base_dir()?;
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Paths;
    use std::sync::Mutex;

    // Tests that read or write GOLL_* variables must not interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.transport, TransportKind::Http);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let _env = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        let config = Config::load(&paths).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_save_and_reload() {
        let _env = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let mut config = Config::default();
        config.api_base_url = "https://staging.goll.gg/api".to_string();
        config.transport = TransportKind::Memory;
        config.save(&paths).unwrap();

        let reloaded = Config::load(&paths).unwrap();
        assert_eq!(reloaded.api_base_url, "https://staging.goll.gg/api");
        assert_eq!(reloaded.transport, TransportKind::Memory);
    }

    #[test]
    fn test_env_overrides() {
        let _env = ENV_LOCK.lock().unwrap();
        std::env::set_var("GOLL_API_URL", "https://env.goll.gg/api");
        std::env::set_var("GOLL_TRANSPORT", "memory");

        let mut config = Config::default();
        config.load_from_env();
        std::env::remove_var("GOLL_API_URL");
        std::env::remove_var("GOLL_TRANSPORT");

        assert_eq!(config.api_base_url, "https://env.goll.gg/api");
        assert_eq!(config.transport, TransportKind::Memory);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let config = Config {
            api_base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}

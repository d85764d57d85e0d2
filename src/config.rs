//! Configuration file parser for ~/.config/episodic/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as warnings, since they are
//! usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::feed::{FeedError, FeedType};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file backing the creator store. Defaults to
    /// `episodic.db` next to the config file.
    pub database_path: Option<PathBuf>,

    /// JSON catalog export consulted before the built-in seed catalog.
    pub catalog_path: Option<PathBuf>,

    /// Budget for one upstream catalog call before falling back to the mock.
    pub upstream_timeout_ms: u64,

    /// Feed type shown when `episodic feed` is run without one.
    pub default_feed: String,

    /// Column width titles are truncated to in CLI listings.
    pub title_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            catalog_path: None,
            upstream_timeout_ms: 6_000,
            default_feed: FeedType::New.as_str().to_string(),
            title_width: 48,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "database_path",
        "catalog_path",
        "upstream_timeout_ms",
        "default_feed",
        "title_width",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            default_feed = %config.default_feed,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }

    /// The configured default feed type.
    pub fn default_feed_type(&self) -> Result<FeedType, FeedError> {
        self.default_feed.parse()
    }

    /// Database location, resolved against the config directory.
    pub fn database_path_in(&self, config_dir: &Path) -> PathBuf {
        match &self.database_path {
            Some(path) => resolve_in(config_dir, path),
            None => config_dir.join("episodic.db"),
        }
    }

    /// Catalog export location, if configured.
    pub fn catalog_path_in(&self, config_dir: &Path) -> Option<PathBuf> {
        self.catalog_path
            .as_deref()
            .map(|path| resolve_in(config_dir, path))
    }
}

fn resolve_in(config_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        config_dir.join(path)
    }
}

// ============================================================================
// Tests
// ============================================================================

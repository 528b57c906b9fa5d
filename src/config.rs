//! Configuration loading for Rehearse.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.rehearse/config.toml`)
//! 3. User config (`~/.rehearse/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! The struct is built once at startup and passed explicitly to whatever
//! needs it; nothing reads the environment after loading.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RehearseError, Result};

/// Main configuration struct for Rehearse.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Result submission gateway configuration.
    pub gateway: GatewayConfig,
    /// Review flow configuration.
    pub review: ReviewConfig,
}

/// Result submission gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Which gateway to use: "practice" (in-memory, offline).
    pub mode: String,
    /// Scheduler API base URL, for transport-backed gateways.
    pub base_url: String,
    /// API key, when the scheduler requires one.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u32,
}

/// Valid values for the gateway mode field.
pub const VALID_GATEWAY_MODES: &[&str] = &["practice"];

/// Minimum valid timeout (a timeout of 0 would fail every request).
pub const MIN_TIMEOUT_SECONDS: u32 = 1;

impl GatewayConfig {
    /// Check if a gateway mode value is valid.
    pub fn is_valid_mode(value: &str) -> bool {
        VALID_GATEWAY_MODES.contains(&value)
    }

    /// Check if a timeout value is valid (must be >= 1).
    pub fn is_valid_timeout(value: u32) -> bool {
        value >= MIN_TIMEOUT_SECONDS
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: "practice".to_string(),
            base_url: "https://api.founderos.example/v1".to_string(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

/// Review flow configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReviewConfig {
    /// Maximum items reviewed per run (a daily-cap style limit).
    pub max_items_per_run: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_items_per_run: 20,
        }
    }
}

impl Config {
    /// Load configuration with the full precedence chain.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();
        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }
        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }
        config.apply_env_overrides();
        config
    }

    /// Load user config from `~/.rehearse/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = rehearse_home()?;
        Self::load_from_file(&home.join("config.toml")).ok()
    }

    /// Load project config from `.rehearse/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_from_file(&cwd.join(".rehearse").join("config.toml")).ok()
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content =
            fs::read_to_string(path).map_err(|e| RehearseError::config(e.to_string()))?;
        toml::from_str(&content).map_err(|e| RehearseError::config(e.to_string()))
    }

    /// Merge another config over this one: each field that differs from
    /// its default in `other` wins.
    fn merge(mut self, other: Config) -> Self {
        let default_gateway = GatewayConfig::default();
        if other.gateway.mode != default_gateway.mode {
            self.gateway.mode = other.gateway.mode;
        }
        if other.gateway.base_url != default_gateway.base_url {
            self.gateway.base_url = other.gateway.base_url;
        }
        if other.gateway.api_key.is_some() {
            self.gateway.api_key = other.gateway.api_key;
        }
        if other.gateway.timeout_seconds != default_gateway.timeout_seconds {
            self.gateway.timeout_seconds = other.gateway.timeout_seconds;
        }

        let default_review = ReviewConfig::default();
        if other.review.max_items_per_run != default_review.max_items_per_run {
            self.review.max_items_per_run = other.review.max_items_per_run;
        }

        self
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("REHEARSE_GATEWAY_MODE") {
            if GatewayConfig::is_valid_mode(&val) {
                self.gateway.mode = val;
            } else {
                eprintln!(
                    "Warning: Invalid REHEARSE_GATEWAY_MODE value '{}'. \
                    Valid values: {:?}. Using '{}'.",
                    val, VALID_GATEWAY_MODES, self.gateway.mode
                );
            }
        }

        if let Ok(val) = env::var("REHEARSE_BASE_URL") {
            if val.is_empty() {
                eprintln!("Warning: REHEARSE_BASE_URL is empty, keeping current value.");
            } else {
                self.gateway.base_url = val;
            }
        }

        if let Ok(val) = env::var("REHEARSE_API_KEY") {
            if !val.is_empty() {
                self.gateway.api_key = Some(val);
            }
        }

        if let Ok(val) = env::var("REHEARSE_TIMEOUT_SECONDS") {
            match val.parse::<u32>() {
                Ok(n) if GatewayConfig::is_valid_timeout(n) => {
                    self.gateway.timeout_seconds = n;
                }
                Ok(n) => eprintln!(
                    "Warning: Invalid REHEARSE_TIMEOUT_SECONDS value '{}'. \
                    Must be >= {}. Using '{}'.",
                    n, MIN_TIMEOUT_SECONDS, self.gateway.timeout_seconds
                ),
                Err(_) => eprintln!(
                    "Warning: Invalid REHEARSE_TIMEOUT_SECONDS value '{}'. \
                    Expected a positive integer. Using '{}'.",
                    val, self.gateway.timeout_seconds
                ),
            }
        }

        if let Ok(val) = env::var("REHEARSE_MAX_ITEMS") {
            match val.parse::<u32>() {
                Ok(n) if n >= 1 => self.review.max_items_per_run = n,
                _ => eprintln!(
                    "Warning: Invalid REHEARSE_MAX_ITEMS value '{}'. \
                    Expected a positive integer. Using '{}'.",
                    val, self.review.max_items_per_run
                ),
            }
        }
    }
}

/// Resolve the Rehearse home directory.
///
/// `REHEARSE_HOME` overrides the default `~/.rehearse`. An empty override
/// is ignored with a warning.
pub fn rehearse_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("REHEARSE_HOME") {
        if home.is_empty() {
            tracing::warn!("REHEARSE_HOME is empty, using default");
        } else {
            return Some(PathBuf::from(home));
        }
    }
    dirs::home_dir().map(|home| home.join(".rehearse"))
}

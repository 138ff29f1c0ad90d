//! Layered Configuration
//!
//! Defaults, then an optional TOML file, then `CHURN__SECTION__KEY`
//! environment variables.

use crate::rate_limit::RateLimitConfig;
use crate::session::DEFAULT_SESSION_TTL_MINUTES;
use ::config::{Config, ConfigError, Environment, File};
use inference_engine::{ArtifactPaths, DEFAULT_DECISION_THRESHOLD};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use storage::DEFAULT_BCRYPT_COST;

/// Config file looked up in the working directory when none is given
const DEFAULT_CONFIG_FILE: &str = "churn-dashboard";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub data: DataConfig,
    pub artifacts: ArtifactsConfig,
    pub logging: LoggingConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Minutes before a login session stops authenticating
    pub session_ttl_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
        }
    }
}

/// SQLite account and customer database
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    /// bcrypt work factor for new accounts
    pub bcrypt_cost: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "users.db".to_string(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

/// Source CSVs for the `load-data` command
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub csv_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_dir: PathBuf::from("data"),
        }
    }
}

/// Trained model artifacts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub dir: PathBuf,
    pub model_file: String,
    pub columns_file: String,
    pub encoders_file: String,
    pub scaler_file: Option<String>,
    pub decision_threshold: f64,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts"),
            model_file: "model.onnx".to_string(),
            columns_file: "model_features.json".to_string(),
            encoders_file: "label_encoders.json".to_string(),
            scaler_file: None,
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
        }
    }
}

impl ArtifactsConfig {
    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(
            &self.dir,
            &self.model_file,
            &self.columns_file,
            &self.encoders_file,
            self.scaler_file.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration. Without an explicit path, `churn-dashboard.toml`
    /// in the working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("CHURN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

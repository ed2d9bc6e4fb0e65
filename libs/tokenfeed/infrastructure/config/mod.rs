//! Configuration
//!
//! `DashboardConfig` is read from YAML with `.env` and environment
//! overrides. `MockFeedConfig` and `MockApiConfig` come from the
//! environment only.

use crate::domain::VolumeModel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Default location of the dashboard config
pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.yaml";

const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnvVar { name: String, value: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

fn validate_log_level(level: &str) -> Result<()> {
    if !VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "log_level must be one of: {}",
            VALID_LOG_LEVELS.join(", ")
        )));
    }
    Ok(())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn parse_var<T: std::str::FromStr>(name: &str, value: String) -> Result<T> {
    value.parse().map_err(|_| ConfigError::InvalidEnvVar {
        name: name.to_string(),
        value,
    })
}

// =============================================================================
// DashboardConfig
// =============================================================================

/// Dashboard and feed monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Notes from `load`, reported by `log` once tracing is up
    #[serde(skip)]
    notes: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            feed: FeedConfig::default(),
            simulation: SimulationConfig::default(),
            log_level: default_log_level(),
            notes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Local snapshot used instead of the API when set
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            fixture_path: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub ws_url: String,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
}

fn default_reconnect_delay_ms() -> u64 {
    3_000
}

fn default_max_reconnect_attempts() -> u32 {
    10
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:4001".to_string(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
        }
    }
}

/// How unreported volume evolves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeModelKind {
    #[default]
    Hold,
    Jitter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub volume_model: VolumeModelKind,
    #[serde(default = "default_jitter_fraction")]
    pub jitter_fraction: f64,
}

fn default_jitter_fraction() -> f64 {
    crate::domain::normalizer::DEFAULT_JITTER_FRACTION
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            volume_model: VolumeModelKind::Hold,
            jitter_fraction: default_jitter_fraction(),
        }
    }
}

impl SimulationConfig {
    pub fn volume_model(&self) -> VolumeModel {
        match self.volume_model {
            VolumeModelKind::Hold => VolumeModel::Hold,
            VolumeModelKind::Jitter => VolumeModel::jitter(self.jitter_fraction),
        }
    }
}

impl DashboardConfig {
    /// Load from YAML, falling back to defaults when the file is missing
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok();
        Self::load_with(config_path, |name| std::env::var(name).ok())
    }

    /// `load` with an explicit variable lookup and no `.env` read
    pub fn load_with<F>(config_path: impl AsRef<Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = config_path.as_ref();

        let mut config = if path.exists() {
            let yaml_content = std::fs::read_to_string(path)?;
            Self::from_yaml(&yaml_content)?
        } else {
            let mut config = DashboardConfig::default();
            config
                .notes
                .push(format!("Config file {} not found, using defaults", path.display()));
            config
        };

        let overridden = config.apply_env_overrides(lookup);
        config.notes.extend(
            overridden
                .into_iter()
                .map(|name| format!("Overridden from environment: {}", name)),
        );
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply `TOKEN_API_URL`, `TOKEN_WS_URL` and `TOKEN_FIXTURE_PATH`
    ///
    /// Returns the names of the variables that were applied.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Vec<&'static str>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = Vec::new();
        if let Some(url) = lookup("TOKEN_API_URL") {
            self.api.base_url = url;
            applied.push("TOKEN_API_URL");
        }
        if let Some(url) = lookup("TOKEN_WS_URL") {
            self.feed.ws_url = url;
            applied.push("TOKEN_WS_URL");
        }
        if let Some(path) = lookup("TOKEN_FIXTURE_PATH") {
            self.api.fixture_path = Some(PathBuf::from(path));
            applied.push("TOKEN_FIXTURE_PATH");
        }
        applied
    }

    /// Notes collected while loading
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.fixture_path.is_none() && self.api.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url cannot be empty without a fixture_path".to_string(),
            ));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !(self.feed.ws_url.starts_with("ws://") || self.feed.ws_url.starts_with("wss://")) {
            return Err(ConfigError::ValidationError(
                "feed.ws_url must start with ws:// or wss://".to_string(),
            ));
        }
        if self.feed.max_reconnect_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "feed.max_reconnect_attempts must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.simulation.jitter_fraction) {
            return Err(ConfigError::ValidationError(
                "simulation.jitter_fraction must be between 0 and 1".to_string(),
            ));
        }
        validate_log_level(&self.log_level)
    }

    /// Log configuration summary
    pub fn log(&self) {
        for note in &self.notes {
            info!("{}", note);
        }
        info!("Configuration loaded:");
        match &self.api.fixture_path {
            Some(path) => info!("  Snapshot: fixture {}", path.display()),
            None => info!("  Snapshot: {}/tokens", self.api.base_url),
        }
        info!("  Feed URL: {}", self.feed.ws_url);
        info!(
            "  Reconnect: {}ms delay, {} attempts",
            self.feed.reconnect_delay_ms, self.feed.max_reconnect_attempts
        );
        info!("  Volume model: {:?}", self.simulation.volume_model);
        info!("  Log level: {}", self.log_level);
    }
}

// =============================================================================
// MockFeedConfig
// =============================================================================

/// Mock feed server settings
#[derive(Debug, Clone, PartialEq)]
pub struct MockFeedConfig {
    pub port: u16,
    pub update_interval_ms: u64,
    pub snapshot_path: PathBuf,
    pub log_level: String,
}

impl Default for MockFeedConfig {
    fn default() -> Self {
        Self {
            port: 4001,
            update_interval_ms: 2_000,
            snapshot_path: PathBuf::from("data/mock_tokens.json"),
            log_level: default_log_level(),
        }
    }
}

impl MockFeedConfig {
    /// Read `PORT`, `UPDATE_INTERVAL_MS`, `MOCK_DATA_PATH` and `LOG_LEVEL`
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("PORT") {
            config.port = parse_var("PORT", value)?;
        }
        if let Some(value) = lookup("UPDATE_INTERVAL_MS") {
            config.update_interval_ms = parse_var("UPDATE_INTERVAL_MS", value)?;
        }
        if let Some(path) = lookup("MOCK_DATA_PATH") {
            config.snapshot_path = PathBuf::from(path);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.update_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "UPDATE_INTERVAL_MS must be greater than 0".to_string(),
            ));
        }
        validate_log_level(&self.log_level)
    }
}

// =============================================================================
// MockApiConfig
// =============================================================================

/// Mock REST API settings
#[derive(Debug, Clone, PartialEq)]
pub struct MockApiConfig {
    pub port: u16,
    pub snapshot_path: PathBuf,
    /// Artificial response delay range for `/tokens`, in milliseconds
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    pub log_level: String,
}

impl Default for MockApiConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            snapshot_path: PathBuf::from("data/mock_tokens.json"),
            min_latency_ms: 300,
            max_latency_ms: 800,
            log_level: default_log_level(),
        }
    }
}

impl MockApiConfig {
    /// Read `PORT`, `MOCK_DATA_PATH`, `MIN_LATENCY_MS`, `MAX_LATENCY_MS`
    /// and `LOG_LEVEL`
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("PORT") {
            config.port = parse_var("PORT", value)?;
        }
        if let Some(path) = lookup("MOCK_DATA_PATH") {
            config.snapshot_path = PathBuf::from(path);
        }
        if let Some(value) = lookup("MIN_LATENCY_MS") {
            config.min_latency_ms = parse_var("MIN_LATENCY_MS", value)?;
        }
        if let Some(value) = lookup("MAX_LATENCY_MS") {
            config.max_latency_ms = parse_var("MAX_LATENCY_MS", value)?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ConfigError::ValidationError(
                "PORT must be greater than 0".to_string(),
            ));
        }
        if self.min_latency_ms > self.max_latency_ms {
            return Err(ConfigError::ValidationError(
                "MIN_LATENCY_MS cannot exceed MAX_LATENCY_MS".to_string(),
            ));
        }
        validate_log_level(&self.log_level)
    }
}

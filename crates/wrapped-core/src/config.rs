use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::TimeRange;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Web API endpoints. Overridable so tests and proxies can point elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Application credentials registered with the streaming service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Windows requested for top tracks / top artists, in output order.
    #[serde(default = "default_time_ranges")]
    pub time_ranges: Vec<TimeRange>,
    #[serde(default = "default_top_limit")]
    pub top_limit: u32,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,
    /// How many times a rate-limited request is retried after waiting.
    #[serde(default = "default_rate_limit_retries")]
    pub rate_limit_retries: u32,
    /// Wait used when a 429 carries no usable `Retry-After` header.
    #[serde(default = "default_retry_after_secs")]
    pub default_retry_after_secs: u64,
}

/// Where each stage reads and writes its flat files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,
    #[serde(default = "default_curated_dir")]
    pub curated_dir: PathBuf,
    #[serde(default = "default_exports_dir")]
    pub exports_dir: PathBuf,
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            time_ranges: default_time_ranges(),
            top_limit: default_top_limit(),
            recent_limit: default_recent_limit(),
            rate_limit_retries: default_rate_limit_retries(),
            default_retry_after_secs: default_retry_after_secs(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            curated_dir: default_curated_dir(),
            exports_dir: default_exports_dir(),
            credentials_file: default_credentials_file(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl FetchConfig {
    pub fn default_retry_after(&self) -> Duration {
        Duration::from_secs(self.default_retry_after_secs)
    }
}

impl PathsConfig {
    /// Re-root every data path under `dir`, keeping the default file names.
    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            raw_dir: dir.join("raw"),
            curated_dir: dir.join("curated"),
            exports_dir: dir.join("exports"),
            credentials_file: dir.join("credentials.toml"),
        }
    }
}

fn default_base_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_authorize_url() -> String {
    "https://accounts.spotify.com/authorize".to_string()
}

fn default_token_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_redirect_uri() -> String {
    "http://localhost:8888/callback".to_string()
}

fn default_time_ranges() -> Vec<TimeRange> {
    TimeRange::ALL.to_vec()
}

fn default_top_limit() -> u32 {
    50
}

fn default_recent_limit() -> u32 {
    50
}

fn default_rate_limit_retries() -> u32 {
    1
}

fn default_retry_after_secs() -> u64 {
    2
}

fn default_raw_dir() -> PathBuf {
    platform::data_dir().join("raw")
}

fn default_curated_dir() -> PathBuf {
    platform::data_dir().join("curated")
}

fn default_exports_dir() -> PathBuf {
    platform::data_dir().join("exports")
}

fn default_credentials_file() -> PathBuf {
    platform::data_dir().join("credentials.toml")
}

impl Config {
    /// Load the config file, writing defaults on first run, then apply the
    /// `SPOTIFY_*` environment overrides once.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        let mut config = if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            config
        } else {
            Self::load_from(&config_path)?
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Overlay non-empty `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET` and
    /// `SPOTIFY_REDIRECT_URI` values onto `[auth]`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty("SPOTIFY_CLIENT_ID") {
            self.auth.client_id = v;
        }
        if let Some(v) = non_empty("SPOTIFY_CLIENT_SECRET") {
            self.auth.client_secret = v;
        }
        if let Some(v) = non_empty("SPOTIFY_REDIRECT_URI") {
            self.auth.redirect_uri = v;
        }
    }
}

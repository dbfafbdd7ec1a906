use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API endpoint (a self-hosted Firecrawl instance)
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3002";

/// Main configuration structure for Firestash
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Scrape/crawl service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the service, without the `/v1` suffix
    #[serde(rename = "base-url", default = "default_api_base_url")]
    pub base_url: String,

    /// Bearer token for hosted deployments
    #[serde(rename = "api-key", default)]
    pub api_key: Option<String>,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Crawl job polling cadence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    /// Fixed delay between status queries (milliseconds)
    #[serde(rename = "interval-ms", default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Hard ceiling on the number of status queries
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Which relational backend receives persisted documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// PostgREST / Supabase REST endpoint
    #[default]
    Rest,
    /// Local SQLite file
    Sqlite,
}

/// Persistence configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Project URL of the REST backend (e.g. `https://xyz.supabase.co`)
    #[serde(rename = "rest-url", default)]
    pub rest_url: Option<String>,

    /// Anon or service key of the REST backend
    #[serde(rename = "rest-key", default)]
    pub rest_key: Option<String>,

    /// Path to the SQLite database file
    #[serde(rename = "sqlite-path", default = "default_sqlite_path")]
    pub sqlite_path: String,
}

/// Export configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Directory that receives exported JSON files
    #[serde(default = "default_export_directory")]
    pub directory: String,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            api_key: None,
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            rest_url: None,
            rest_key: None,
            sqlite_path: default_sqlite_path(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_max_attempts() -> u32 {
    30
}

fn default_sqlite_path() -> String {
    "./firestash.db".to_string()
}

fn default_export_directory() -> String {
    ".".to_string()
}

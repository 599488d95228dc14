use std::path::Path;
use std::sync::OnceLock;

use anyhow::Context;
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const CONFIG_PATH_ENV: &str = "SKYWATCH_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Catalog JSON served by `GET /catalog`
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    #[serde(default)]
    pub pool: PoolConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub endpoints: EndpointConfig,
}

/// Bounds on outstanding collaborator calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    #[serde(default = "default_collaborator_timeout_secs")]
    pub collaborator_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    #[serde(default = "default_window_hours")]
    pub window_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Observation instants are rounded down to this many minutes
    #[serde(default = "default_bucket_minutes")]
    pub bucket_minutes: i64,

    /// Observer coordinates are rounded to this grid, in degrees
    #[serde(default = "default_location_precision_deg")]
    pub location_precision_deg: f64,

    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,

    #[serde(default = "default_prune_interval_minutes")]
    pub prune_interval_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_sesame_url")]
    pub sesame_url: String,

    #[serde(default = "default_horizons_url")]
    pub horizons_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_catalog_path() -> String {
    "data/catalog.json".to_string()
}

fn default_worker_pool_size() -> usize {
    5
}

fn default_collaborator_timeout_secs() -> u64 {
    30
}

fn default_sample_count() -> usize {
    1400
}

fn default_window_hours() -> f64 {
    24.0
}

fn default_bucket_minutes() -> i64 {
    10
}

fn default_location_precision_deg() -> f64 {
    0.1
}

fn default_retention_hours() -> u64 {
    24
}

fn default_prune_interval_minutes() -> u64 {
    60
}

fn default_sesame_url() -> String {
    "https://cds.unistra.fr/cgi-bin/nph-sesame/-oI/S".to_string()
}

fn default_horizons_url() -> String {
    "https://ssd.jpl.nasa.gov/api/horizons.api".to_string()
}

fn default_user_agent() -> String {
    concat!("skywatch/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: default_worker_pool_size(),
            collaborator_timeout_secs: default_collaborator_timeout_secs(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            window_hours: default_window_hours(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            bucket_minutes: default_bucket_minutes(),
            location_precision_deg: default_location_precision_deg(),
            retention_hours: default_retention_hours(),
            prune_interval_minutes: default_prune_interval_minutes(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            sesame_url: default_sesame_url(),
            horizons_url: default_horizons_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            catalog_path: default_catalog_path(),
            pool: PoolConfig::default(),
            observability: ObservabilityConfig::default(),
            cache: CacheConfig::default(),
            endpoints: EndpointConfig::default(),
        }
    }
}

impl BackendConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: BackendConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.pool.worker_pool_size == 0 {
            anyhow::bail!("pool.worker_pool_size must be at least 1");
        }
        if self.pool.collaborator_timeout_secs == 0 {
            anyhow::bail!("pool.collaborator_timeout_secs must be at least 1");
        }
        if self.observability.sample_count < 2 {
            anyhow::bail!("observability.sample_count must be at least 2");
        }
        if !(self.observability.window_hours > 0.0) {
            anyhow::bail!("observability.window_hours must be positive");
        }
        if self.cache.bucket_minutes < 1 {
            anyhow::bail!("cache.bucket_minutes must be at least 1");
        }
        if !(self.cache.location_precision_deg > 0.0) {
            anyhow::bail!("cache.location_precision_deg must be positive");
        }
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub static CONFIG: OnceLock<BackendConfig> = OnceLock::new();

/// Config file location: `$SKYWATCH_CONFIG`, else `config.toml`.
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Load the config file into [`CONFIG`]. A missing file yields the defaults;
/// an unreadable or invalid one is an error.
pub fn read_config() -> anyhow::Result<&'static BackendConfig> {
    let path = config_path();
    let config = if Path::new(&path).exists() {
        BackendConfig::from_file(&path)?
    } else {
        BackendConfig::default()
    };

    Ok(CONFIG.get_or_init(|| config))
}

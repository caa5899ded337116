//! Configuration model loaded from external sources.

#[cfg(feature = "server")]
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::list::filters::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Clone, Debug, Deserialize)]
/// Settings shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    pub secret: String,
    /// Admin GraphQL endpoint of the host platform.
    pub admin_api_url: String,
    #[serde(default)]
    pub admin_api_token: Option<String>,
    #[serde(default = "default_cache_stale_secs")]
    pub cache_stale_secs: u64,
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "max_page_size")]
    pub max_page_size: usize,
}

fn default_cache_stale_secs() -> u64 {
    30
}

fn default_cache_max_entries() -> usize {
    256
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn max_page_size() -> usize {
    MAX_PAGE_SIZE
}

impl ServerConfig {
    pub fn cache_stale_time(&self) -> Duration {
        Duration::from_secs(self.cache_stale_secs)
    }

    /// Layers `{config_dir}/default.yaml`, the optional `{config_dir}/{app_env}.yaml`
    /// and `APP_*` environment variables, later sources winning.
    #[cfg(feature = "server")]
    pub fn load(config_dir: &Path, app_env: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(config_dir.join("default")))
            .add_source(config::File::from(config_dir.join(app_env)).required(false))
            .add_source(config::Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }
}

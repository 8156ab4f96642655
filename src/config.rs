use std::time::Duration;

use serde::Deserialize;

use crate::cache::RefreshPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub broker: BrokerConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub beaches: BeachesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    pub url: String,
    #[serde(default = "default_tenant")]
    pub tenant: String,
    /// Entities requested per page (NGSI-LD `limit`).
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_tenant() -> String {
    "default".into()
}

fn default_page_size() -> usize {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_success_interval_secs")]
    pub success_interval_secs: u64,
    #[serde(default = "default_failure_interval_secs")]
    pub failure_interval_secs: u64,
}

fn default_success_interval_secs() -> u64 {
    300
}

fn default_failure_interval_secs() -> u64 {
    10
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            success_interval_secs: default_success_interval_secs(),
            failure_interval_secs: default_failure_interval_secs(),
        }
    }
}

impl RefreshConfig {
    pub fn policy(&self) -> RefreshPolicy {
        RefreshPolicy::new(
            Duration::from_secs(self.success_interval_secs),
            Duration::from_secs(self.failure_interval_secs),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BeachesConfig {
    /// Radius (metres) around a beach centroid searched for water quality sensors.
    #[serde(default = "default_max_water_quality_distance_m")]
    pub max_water_quality_distance_m: u32,
    /// Readings older than this are not attached to a beach.
    #[serde(default = "default_water_quality_max_age_hours")]
    pub water_quality_max_age_hours: u32,
}

fn default_max_water_quality_distance_m() -> u32 {
    1000
}

fn default_water_quality_max_age_hours() -> u32 {
    24
}

impl Default for BeachesConfig {
    fn default() -> Self {
        Self {
            max_water_quality_distance_m: default_max_water_quality_distance_m(),
            water_quality_max_age_hours: default_water_quality_max_age_hours(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        let mut config: AppConfig = toml::from_str(&s)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `CONTEXT_BROKER_URL` / `CONTEXT_BROKER_TENANT` from `lookup`.
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("CONTEXT_BROKER_URL").filter(|v| !v.is_empty()) {
            self.broker.url = url;
        }
        if let Some(tenant) = lookup("CONTEXT_BROKER_TENANT").filter(|v| !v.is_empty()) {
            self.broker.tenant = tenant;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.broker.url.trim().is_empty(),
            "broker.url must be non-empty"
        );
        anyhow::ensure!(
            self.broker.url.starts_with("http://") || self.broker.url.starts_with("https://"),
            "broker.url must be an http(s) URL, got {}",
            self.broker.url
        );
        anyhow::ensure!(
            self.broker.page_size > 0,
            "broker.page_size must be > 0, got {}",
            self.broker.page_size
        );
        anyhow::ensure!(
            self.broker.request_timeout_secs > 0,
            "broker.request_timeout_secs must be > 0, got {}",
            self.broker.request_timeout_secs
        );
        anyhow::ensure!(
            self.refresh.success_interval_secs > 0,
            "refresh.success_interval_secs must be > 0, got {}",
            self.refresh.success_interval_secs
        );
        anyhow::ensure!(
            self.refresh.failure_interval_secs > 0,
            "refresh.failure_interval_secs must be > 0, got {}",
            self.refresh.failure_interval_secs
        );
        anyhow::ensure!(
            self.beaches.max_water_quality_distance_m > 0,
            "beaches.max_water_quality_distance_m must be > 0, got {}",
            self.beaches.max_water_quality_distance_m
        );
        anyhow::ensure!(
            self.beaches.water_quality_max_age_hours > 0,
            "beaches.water_quality_max_age_hours must be > 0, got {}",
            self.beaches.water_quality_max_age_hours
        );
        Ok(())
    }
}

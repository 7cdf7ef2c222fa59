use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use showroom_core::{
    constants::DEFAULT_FRESHNESS_WINDOW_SECS,
    vehicles::{ReloadFailurePolicy, StoreConfig},
};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub data_path: PathBuf,
    pub cache_ttl: Duration,
    pub serve_stale_on_error: bool,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("SHOWROOM_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid SHOWROOM_LISTEN_ADDR")?;
        let data_path = PathBuf::from(env_or("SHOWROOM_DATA_PATH", "public/data.csv"));
        let ttl_secs: u64 = env_or(
            "SHOWROOM_CACHE_TTL_SECS",
            &DEFAULT_FRESHNESS_WINDOW_SECS.to_string(),
        )
        .parse()
        .context("Invalid SHOWROOM_CACHE_TTL_SECS")?;
        let serve_stale_on_error = parse_bool(&env_or("SHOWROOM_SERVE_STALE_ON_ERROR", "false"))
            .context("Invalid SHOWROOM_SERVE_STALE_ON_ERROR")?;
        let cors_allow = env_or("SHOWROOM_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_or("SHOWROOM_REQUEST_TIMEOUT_MS", "30000")
            .parse()
            .context("Invalid SHOWROOM_REQUEST_TIMEOUT_MS")?;
        let static_dir = env_or("SHOWROOM_STATIC_DIR", "dist");
        Ok(Self {
            listen_addr,
            data_path,
            cache_ttl: Duration::from_secs(ttl_secs),
            serve_stale_on_error,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            static_dir,
        })
    }

    /// Defaults for everything but the dataset location.
    pub fn with_data_path(data_path: impl Into<PathBuf>) -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            data_path: data_path.into(),
            cache_ttl: Duration::from_secs(DEFAULT_FRESHNESS_WINDOW_SECS as u64),
            serve_stale_on_error: false,
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            static_dir: "dist".to_string(),
        }
    }

    pub fn store_config(&self) -> anyhow::Result<StoreConfig> {
        let freshness_window =
            chrono::Duration::from_std(self.cache_ttl).context("Cache TTL is out of range")?;
        let failure_policy = if self.serve_stale_on_error {
            ReloadFailurePolicy::ServeStale
        } else {
            ReloadFailurePolicy::Surface
        };
        Ok(StoreConfig {
            freshness_window,
            failure_policy,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}

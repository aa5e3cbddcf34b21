use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::http::response::SERVER_NAME;

/// Default idle window for a session waiting on its next request.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 50;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Seconds a connection may stay silent before its session closes it.
    pub idle_timeout_secs: u64,
    /// Worker threads for the runtime; at least one is always used.
    pub workers: usize,
    /// Value of the `Server` header on responses the server synthesizes.
    pub server_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            workers: crate::server::runtime::default_workers(),
            server_name: SERVER_NAME.to_string(),
        }
    }
}

impl Config {
    /// Reads the configuration from the environment.
    ///
    /// `LISTEN`, `IDLE_TIMEOUT`, `WORKERS` and `SERVER_NAME` override the
    /// defaults; values that do not parse are ignored.
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(addr) = std::env::var("LISTEN") {
            cfg.listen_addr = addr;
        }
        if let Some(secs) = env_parse("IDLE_TIMEOUT") {
            cfg.idle_timeout_secs = secs;
        }
        if let Some(workers) = env_parse("WORKERS") {
            cfg.workers = workers;
        }
        if let Ok(name) = std::env::var("SERVER_NAME") {
            cfg.server_name = name;
        }

        cfg
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("invalid server configuration")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

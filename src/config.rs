//! Service configuration.
//!
//! Settings are resolved in three layers, later layers winning:
//! 1. built-in defaults
//! 2. a TOML file named by `KUBEBOARD_CONFIG`
//! 3. individual `KUBEBOARD_*` environment variables
//!
//! Only [`EngineConfig`] reaches the control-plane engine; the rest belongs to
//! the HTTP service around it.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::ResourceQuota;
use crate::storage::audit_log::DEFAULT_AUDIT_CAPACITY;

pub const CONFIG_PATH_ENV: &str = "KUBEBOARD_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Knobs for the state engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of retained audit events.
    pub audit_capacity: usize,
    /// Worker nodes seeded into a new cluster unless the request says otherwise.
    pub default_worker_nodes: u32,
    pub default_version: String,
    pub default_quota: ResourceQuota,
    /// Replicas made available per controller tick.
    pub rollout_step: u32,
    /// 0 disables the background rollout controller.
    pub reconcile_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            default_worker_nodes: 2,
            default_version: "v1.30.5".to_string(),
            default_quota: ResourceQuota::default(),
            rollout_step: 1,
            reconcile_interval_secs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
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

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("KUBEBOARD_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("KUBEBOARD_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("KUBEBOARD_PORT is not a valid port: {}", port))?;
        }
        if let Ok(capacity) = std::env::var("KUBEBOARD_AUDIT_CAPACITY") {
            self.engine.audit_capacity = capacity
                .parse()
                .with_context(|| format!("KUBEBOARD_AUDIT_CAPACITY is not a number: {}", capacity))?;
        }
        if let Ok(level) = std::env::var("KUBEBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

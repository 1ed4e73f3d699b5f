use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const CONFIG_DIR_ENV: &str = "CATALOG_SYNC_CONFIG_DIR";
const CONFIG_FILE: &str = "catalog-sync.toml";
const ENV_PREFIX: &str = "CATALOG_SYNC";

/// Top-level configuration loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub remote: RemoteSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub runtime: RuntimeSettings,
}

impl Settings {
    /// Layers `config/catalog-sync.toml` (optional) under `CATALOG_SYNC__*` variables.
    pub fn load() -> anyhow::Result<Self> {
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };
        Self::load_from(config_dir.join(CONFIG_FILE))
    }

    pub fn load_from(path: PathBuf) -> anyhow::Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::from(path.clone()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to build configuration from {}", path.display()))?;

        cfg.try_deserialize()
            .with_context(|| "failed to deserialize configuration")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSettings {
    #[serde(default = "RemoteSettings::default_base_url")]
    pub base_url: String,
    #[serde(default = "RemoteSettings::default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "RemoteSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl RemoteSettings {
    fn default_base_url() -> String {
        "http://127.0.0.1:8000/api".to_string()
    }

    fn default_probe_timeout_ms() -> u64 {
        5000
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            probe_timeout_ms: Self::default_probe_timeout_ms(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Nothing survives the process.
    Memory,
    /// One JSON file per collection under `data_dir`.
    #[default]
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "StorageSettings::default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub backend: StorageBackend,
}

impl StorageSettings {
    fn default_data_dir() -> PathBuf {
        PathBuf::from(".catalog-sync")
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            backend: StorageBackend::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeSettings {
    /// Request buffer of each store actor.
    #[serde(default = "RuntimeSettings::default_channel_buffer")]
    pub channel_buffer: usize,
    #[serde(default = "RuntimeSettings::default_notification_capacity")]
    pub notification_capacity: usize,
}

impl RuntimeSettings {
    fn default_channel_buffer() -> usize {
        32
    }

    fn default_notification_capacity() -> usize {
        16
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            channel_buffer: Self::default_channel_buffer(),
            notification_capacity: Self::default_notification_capacity(),
        }
    }
}

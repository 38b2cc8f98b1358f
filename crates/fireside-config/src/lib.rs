//! Configuration for the fireside client.
//!
//! TOML settings layered with `FIRESIDE_*` environment variables, the
//! platform data directory for device storage, and the OS keychain
//! implementation of [`fireside_core::SecureStore`]. The access token is
//! never part of [`Config`].

mod keyring_store;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fireside_api::{TlsMode, TransportConfig};
use fireside_core::DEFAULT_MAX_AGE_HOURS;

pub use keyring_store::{KEYRING_SERVICE, KeyringSecureStore};

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "FIRESIDE_CONFIG";
const ENV_PREFIX: &str = "FIRESIDE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Server used by `login` when no URL is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    /// Per-request timeout.
    pub timeout_secs: u64,

    /// Age after which cached collections are reported stale.
    pub cache_max_age_hours: u64,

    /// Device storage location; the platform data directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Accept any TLS certificate.
    pub insecure: bool,

    /// Extra CA certificate (PEM) for self-hosted servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Default output format: "table" or "json".
    pub output: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            timeout_secs: 30,
            cache_max_age_hours: DEFAULT_MAX_AGE_HOURS,
            data_dir: None,
            insecure: false,
            ca_cert: None,
            output: "table".into(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref raw) = self.endpoint_url {
            let url = url::Url::parse(raw).map_err(|e| ConfigError::Validation {
                field: "endpoint_url".into(),
                reason: format!("{raw}: {e}"),
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::Validation {
                    field: "endpoint_url".into(),
                    reason: format!("expected http or https, got '{}'", url.scheme()),
                });
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        if !matches!(self.output.as_str(), "table" | "json") {
            return Err(ConfigError::Validation {
                field: "output".into(),
                reason: format!("expected 'table' or 'json', got '{}'", self.output),
            });
        }
        Ok(())
    }

    /// Transport settings for every client built from this config.
    pub fn transport(&self) -> TransportConfig {
        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca) = self.ca_cert {
            TlsMode::CustomCa(ca.clone())
        } else {
            TlsMode::System
        };
        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "fireside", "fireside")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    for part in parts {
        p.push(part);
    }
    p
}

/// Resolve the config file path: `FIRESIDE_CONFIG`, else platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || home_fallback(&[".config", "fireside", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding the store snapshot and the offline cache.
pub fn data_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.data_dir {
        return dir.clone();
    }
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "fireside"]),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Defaults, then `path` (if it exists), then `FIRESIDE_*` variables.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
        .extract()?;
    config.validate()?;
    Ok(config)
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, falling back to defaults when it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config unreadable, using defaults");
        Config::default()
    })
}

// ── Saving ──────────────────────────────────────────────────────────

pub fn save_config_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(config)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    save_config_to(config, &config_path())
}

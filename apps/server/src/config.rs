//! Server configuration.
//!
//! Loaded in priority order:
//!
//! ```text
//! environment (OPTICA_*)  >  optica.toml  >  built-in defaults
//! ```
//!
//! The TOML file is read from `OPTICA_CONFIG` when set, otherwise from
//! `optica.toml` in the platform config directory. A missing file is not an
//! error; a malformed one is.

use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::FixedOffset;
use optica_core::schedule::utc_offset;

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
    pub db_max_connections: u32,
    /// Shop-local offset from UTC, in minutes (São Paulo: −180).
    pub utc_offset_minutes: i32,
}

/// The optional TOML file; every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    bind_addr: Option<IpAddr>,
    port: Option<u16>,
    database_path: Option<PathBuf>,
    db_max_connections: Option<u32>,
    utc_offset_minutes: Option<i32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            database_path: default_database_path(),
            db_max_connections: 5,
            utc_offset_minutes: -180,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment and config file.
    pub fn load() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_sources(&vars, config_file_path(&vars).as_deref())
    }

    /// Resolves configuration from explicit sources.
    ///
    /// `file` is optional and may point at a path that doesn't exist.
    pub fn from_sources(
        vars: &HashMap<String, String>,
        file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let file_config = match file {
            Some(path) if path.exists() => read_file(path)?,
            _ => FileConfig::default(),
        };

        let defaults = AppConfig::default();

        let config = AppConfig {
            bind_addr: env_value(vars, "OPTICA_BIND_ADDR")?
                .or(file_config.bind_addr)
                .unwrap_or(defaults.bind_addr),
            port: env_value(vars, "OPTICA_PORT")?
                .or(file_config.port)
                .unwrap_or(defaults.port),
            database_path: env_value(vars, "OPTICA_DB_PATH")?
                .or(file_config.database_path)
                .unwrap_or(defaults.database_path),
            db_max_connections: env_value(vars, "OPTICA_DB_MAX_CONNECTIONS")?
                .or(file_config.db_max_connections)
                .unwrap_or(defaults.db_max_connections),
            utc_offset_minutes: env_value(vars, "OPTICA_UTC_OFFSET_MINUTES")?
                .or(file_config.utc_offset_minutes)
                .unwrap_or(defaults.utc_offset_minutes),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("db_max_connections".to_string()));
        }
        config.utc_offset()?;

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// The shop's fixed UTC offset for day boundaries and agenda slots.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        utc_offset(self.utc_offset_minutes)
            .map_err(|_| ConfigError::InvalidValue("utc_offset_minutes".to_string()))
    }
}

fn env_value<T: FromStr>(
    vars: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(None),
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("br", "optica", "optica")
}

fn config_file_path(vars: &HashMap<String, String>) -> Option<PathBuf> {
    if let Some(path) = vars.get("OPTICA_CONFIG") {
        return Some(PathBuf::from(path));
    }
    project_dirs().map(|dirs| dirs.config_dir().join("optica.toml"))
}

/// Platform data directory, falling back to the working directory.
fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("optica.db"))
        .unwrap_or_else(|| PathBuf::from("optica.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

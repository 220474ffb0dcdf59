//! Layered configuration.
//!
//! Settings resolve in priority order: values passed to constructors beat
//! `GBCHECK_*` environment variables, which beat the local JSON config file
//! (`config.local.json` by default). Everything external is optional — the
//! service starts without a registry or retrieval endpoint and degrades the
//! corresponding verdicts to `unknown`.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default local config file consulted after the environment.
pub const DEFAULT_CONFIG_FILE: &str = "config.local.json";

/// Default on-disk location of the standards verification cache.
pub const DEFAULT_CACHE_PATH: &str = "./.data/standards_cache.json";

/// Service configuration.
///
/// Use [`Config::from_env`] to resolve `GBCHECK_*` overrides and the local
/// config file on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Standards-registry JSON-RPC endpoint. Unset disables standards
    /// verification (results become `unknown`).
    pub registry_url: Option<String>,

    /// Retrieval service base URL. Unset disables compliance reconciliation.
    pub retrieval_url: Option<String>,

    /// Bearer token for the retrieval service.
    pub retrieval_api_key: Option<String>,

    /// Dataset ids holding the inspection rules documents.
    pub rules_dataset_ids: Vec<String>,

    /// Dataset ids holding the residue-limit standards.
    pub gb_dataset_ids: Vec<String>,

    /// Path of the standards verification cache file.
    pub cache_path: PathBuf,

    /// Directory for downloaded standard documents. Unset disables the
    /// best-effort document capture.
    pub artifacts_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            registry_url: None,
            retrieval_url: None,
            retrieval_api_key: None,
            rules_dataset_ids: Vec::new(),
            gb_dataset_ids: Vec::new(),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            artifacts_dir: None,
        }
    }
}

/// Shape of the local JSON config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    port: Option<u16>,
    bind_addr: Option<String>,
    registry_url: Option<String>,
    retrieval_url: Option<String>,
    retrieval_api_key: Option<String>,
    rules_dataset_ids: Option<Vec<String>>,
    gb_dataset_ids: Option<Vec<String>>,
    cache_path: Option<String>,
    artifacts_dir: Option<String>,
}

impl Config {
    const ENV_PORT: &'static str = "GBCHECK_PORT";
    const ENV_BIND_ADDR: &'static str = "GBCHECK_BIND_ADDR";
    const ENV_REGISTRY_URL: &'static str = "GBCHECK_REGISTRY_URL";
    const ENV_RETRIEVAL_URL: &'static str = "GBCHECK_RETRIEVAL_URL";
    const ENV_RETRIEVAL_API_KEY: &'static str = "GBCHECK_RETRIEVAL_API_KEY";
    const ENV_RULES_DATASET_IDS: &'static str = "GBCHECK_RULES_DATASET_IDS";
    const ENV_GB_DATASET_IDS: &'static str = "GBCHECK_GB_DATASET_IDS";
    const ENV_CACHE_PATH: &'static str = "GBCHECK_CACHE_PATH";
    const ENV_ARTIFACTS_DIR: &'static str = "GBCHECK_ARTIFACTS_DIR";
    const ENV_CONFIG_FILE: &'static str = "GBCHECK_CONFIG_FILE";

    /// Loads configuration: environment first, then the local config file,
    /// then defaults. The file path itself can be moved with
    /// `GBCHECK_CONFIG_FILE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let file_path = env::var(Self::ENV_CONFIG_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::from_env_and_file(&file_path)
    }

    /// Loads configuration from the environment and one config file.
    pub fn from_env_and_file(file_path: &Path) -> Result<Self, ConfigError> {
        let file = Self::read_file(file_path)?;
        let defaults = Self::default();

        let port = Self::parse_port_from_env(file.port.unwrap_or(defaults.port))?;
        let bind_addr = Self::parse_bind_addr_from_env(match file.bind_addr {
            Some(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e })?,
            None => defaults.bind_addr,
        })?;

        Ok(Self {
            port,
            bind_addr,
            registry_url: Self::parse_optional_from_env(Self::ENV_REGISTRY_URL)
                .or(file.registry_url),
            retrieval_url: Self::parse_optional_from_env(Self::ENV_RETRIEVAL_URL)
                .or(file.retrieval_url),
            retrieval_api_key: Self::parse_optional_from_env(Self::ENV_RETRIEVAL_API_KEY)
                .or(file.retrieval_api_key),
            rules_dataset_ids: Self::parse_list_from_env(Self::ENV_RULES_DATASET_IDS)
                .or(file.rules_dataset_ids)
                .unwrap_or_default(),
            gb_dataset_ids: Self::parse_list_from_env(Self::ENV_GB_DATASET_IDS)
                .or(file.gb_dataset_ids)
                .unwrap_or_default(),
            cache_path: Self::parse_optional_from_env(Self::ENV_CACHE_PATH)
                .or(file.cache_path)
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_path),
            artifacts_dir: Self::parse_optional_from_env(Self::ENV_ARTIFACTS_DIR)
                .or(file.artifacts_dir)
                .map(PathBuf::from),
        })
    }

    /// Validates basic invariants (does not create anything on disk).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_path.exists() && self.cache_path.is_dir() {
            return Err(ConfigError::NotAFile {
                path: self.cache_path.clone(),
            });
        }
        if self.retrieval_url.is_some() && self.retrieval_api_key.is_none() {
            return Err(ConfigError::MissingRetrievalKey);
        }
        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| ConfigError::FileParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(ConfigError::FileRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;
                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }
                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Comma-separated list.
    fn parse_list_from_env(var_name: &str) -> Option<Vec<String>> {
        Self::parse_optional_from_env(var_name).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order; the first hit wins:
//!
//! 1. `--config <path>` (fatal if unreadable)
//! 2. `$REFGATE_CONFIG` (fatal if unreadable)
//! 3. `<repository>/refgate.toml`
//! 4. `$XDG_CONFIG_HOME/refgate/config.toml` (via the platform config dir)
//!
//! A hook with no config file at all runs with built-in permissive
//! defaults; an explicitly requested file that is missing or unparsable is
//! fatal. The git server installs hooks long before anyone writes a
//! config, and a missing file must not brick pushes.

pub mod schema;

pub use schema::{HookConfig, PolicyConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "REFGATE_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: HookConfig,
    /// Where it came from, if any file was read.
    pub path: Option<PathBuf>,
}

/// Load configuration.
///
/// `explicit` is the `--config` flag; when present (or when
/// `$REFGATE_CONFIG` is set) the file must exist and parse. Otherwise the
/// repository-local and user-level locations are probed and defaults apply
/// when nothing is found.
///
/// # Errors
///
/// `ReadError`/`ParseError` for an explicit file that is missing or
/// malformed, or for any discovered file that fails to parse;
/// `InvalidValue` when validation rejects a parsed value.
pub fn load(
    explicit: Option<&Path>,
    repository: Option<&Path>,
) -> Result<ConfigLoadResult, ConfigError> {
    if let Some(path) = explicit {
        return read_file(path).map(|config| ConfigLoadResult {
            config,
            path: Some(path.to_path_buf()),
        });
    }
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(env_path);
        return read_file(&path).map(|config| ConfigLoadResult {
            config,
            path: Some(path),
        });
    }

    let mut candidates = Vec::new();
    if let Some(repo) = repository {
        candidates.push(repo.join("refgate.toml"));
    }
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("refgate").join("config.toml"));
    }

    for path in candidates {
        if path.is_file() {
            let config = read_file(&path)?;
            return Ok(ConfigLoadResult {
                config,
                path: Some(path),
            });
        }
    }

    Ok(ConfigLoadResult {
        config: HookConfig::default(),
        path: None,
    })
}

fn read_file(path: &Path) -> Result<HookConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let config: HookConfig = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

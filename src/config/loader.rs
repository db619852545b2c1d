//! Configuration file loading with precedence handling.

use crate::collector::exceptions::DEFAULT_MAX_CHAIN_DEPTH;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TRACEBAR_CONFIG";

/// Environment variable overriding the editor link template.
pub const EDITOR_LINK_ENV: &str = "TRACEBAR_EDITOR_LINK";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/tracebar/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Name of the message collector.
    #[serde(default)]
    pub messages_name: Option<String>,

    /// Name of the exception collector.
    #[serde(default)]
    pub exceptions_name: Option<String>,

    /// Capture each error's cause chain as separate records.
    #[serde(default)]
    pub chain_unroll: Option<bool>,

    /// Bound on records per chain-unrolled capture.
    #[serde(default)]
    pub max_chain_depth: Option<usize>,

    /// Editor link template with `%f`/`%l` placeholders.
    #[serde(default)]
    pub editor_link: Option<String>,

    /// Path prefix rewrites applied to editor links.
    ///
    /// ```toml
    /// [path_mappings]
    /// "/srv/app" = "/home/me/app"
    /// ```
    #[serde(default)]
    pub path_mappings: Option<BTreeMap<String, String>>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Name of the message collector.
    pub messages_name: String,
    /// Name of the exception collector.
    pub exceptions_name: String,
    /// Capture each error's cause chain as separate records.
    pub chain_unroll: bool,
    /// Bound on records per chain-unrolled capture.
    pub max_chain_depth: usize,
    /// Editor link template, if links are enabled.
    pub editor_link: Option<String>,
    /// Path prefix rewrites applied to editor links.
    pub path_mappings: BTreeMap<String, String>,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            messages_name: "messages".to_string(),
            exceptions_name: "exceptions".to_string(),
            chain_unroll: false,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            editor_link: None,
            path_mappings: BTreeMap::new(),
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/tracebar/tracebar.log` on Unix-like systems,
/// or the platform's state directory elsewhere.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("tracebar").join("tracebar.log")
    } else {
        PathBuf::from("tracebar.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/tracebar/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tracebar").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `TRACEBAR_CONFIG` environment variable
/// 3. Default path `~/.config/tracebar/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed,
/// or if `TRACEBAR_CONFIG` is set to a non-UTF-8 value.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    match std::env::var(CONFIG_ENV) {
        Ok(env_path) => return load_config_file(PathBuf::from(env_path)),
        Err(std::env::VarError::NotUnicode(raw)) => {
            return Err(ConfigError::InvalidPath(raw.to_string_lossy().into_owned()));
        }
        Err(std::env::VarError::NotPresent) => {}
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `TRACEBAR_EDITOR_LINK`: Override the editor link template
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(template) = std::env::var(EDITOR_LINK_ENV) {
        config.editor_link = Some(template);
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        messages_name: config.messages_name.unwrap_or(defaults.messages_name),
        exceptions_name: config.exceptions_name.unwrap_or(defaults.exceptions_name),
        chain_unroll: config.chain_unroll.unwrap_or(defaults.chain_unroll),
        max_chain_depth: config.max_chain_depth.unwrap_or(defaults.max_chain_depth),
        editor_link: config.editor_link.or(defaults.editor_link),
        path_mappings: config.path_mappings.unwrap_or(defaults.path_mappings),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    editor_link_override: Option<String>,
    chain_override: Option<bool>,
    log_file_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(template) = editor_link_override {
        config.editor_link = Some(template);
    }

    if let Some(chain) = chain_override {
        config.chain_unroll = chain;
    }

    if let Some(path) = log_file_override {
        config.log_file_path = path;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

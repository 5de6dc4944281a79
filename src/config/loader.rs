//! Configuration file loading with precedence handling.

use crate::integration::AnalysisOptions;
use crate::join::JoinOptions;
use crate::source::default_projects_dir;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
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
/// Corresponds to `~/.config/ccrec/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Only reconstruct files under this path prefix.
    #[serde(default)]
    pub project_root: Option<String>,

    /// Where Claude Code keeps per-project session logs.
    #[serde(default)]
    pub claude_projects_dir: Option<PathBuf>,

    /// Strip line-number prefixes and reminders from Read output.
    #[serde(default)]
    pub normalize_read_output: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Only files under this prefix are reconstructed.
    pub project_root: Option<String>,
    /// Root holding one log directory per project.
    pub claude_projects_dir: PathBuf,
    /// Strip line-number prefixes and reminders from Read output.
    pub normalize_read_output: bool,
    /// Where tracing output goes.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            project_root: None,
            claude_projects_dir: default_projects_dir()
                .unwrap_or_else(|| PathBuf::from(".claude").join("projects")),
            normalize_read_output: true,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Pipeline options implied by this configuration.
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            join: JoinOptions {
                normalize_read_output: self.normalize_read_output,
            },
            path_prefix: self.project_root.clone(),
            cancellation: None,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/ccrec/ccrec.log` on Unix-like systems, falling
/// back to the current directory when no state directory is known.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("ccrec").join("ccrec.log")
    } else {
        PathBuf::from("ccrec.log")
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
/// Returns `~/.config/ccrec/config.toml` on Unix, appropriate path on other platforms.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ccrec").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CCREC_CONFIG` environment variable
/// 3. Default path `~/.config/ccrec/config.toml`
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("CCREC_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks `CCREC_PROJECT_ROOT`; an empty value clears the prefix.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(root) = std::env::var("CCREC_PROJECT_ROOT") {
        config.project_root = Some(root).filter(|r| !r.is_empty());
    }

    config
}

/// Merge config file into defaults to create resolved config.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        project_root: config.project_root.or(defaults.project_root),
        claude_projects_dir: config
            .claude_projects_dir
            .unwrap_or(defaults.claude_projects_dir),
        normalize_read_output: config
            .normalize_read_output
            .unwrap_or(defaults.normalize_read_output),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    project_root_override: Option<String>,
) -> ResolvedConfig {
    if let Some(root) = project_root_override {
        config.project_root = Some(root);
    }

    config
}

/// Run the whole precedence chain.
///
/// # Errors
///
/// Returns error if a config file exists but cannot be read or parsed.
pub fn resolve_config(
    config_path: Option<PathBuf>,
    project_root_override: Option<String>,
) -> Result<ResolvedConfig, ConfigError> {
    let file = load_config_with_precedence(config_path)?;
    let config = apply_env_overrides(merge_config(file));
    Ok(apply_cli_overrides(config, project_root_override))
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

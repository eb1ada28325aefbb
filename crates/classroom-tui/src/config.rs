// Configuration loading and parsing (classroom.toml).
//
// Every key has a default, so a missing file or a partial file is valid.
// Lookup order: ./config/classroom.toml, then the platform config directory,
// then built-in defaults.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use classroom_core::session::SessionSettings;
use classroom_core::spin::SpinTiming;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "classroom.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub draw: DrawConfig,
    pub groups: GroupsConfig,
    pub export: ExportConfig,
    pub random: RandomConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    pub allow_repeats: bool,
    pub spin_duration_ms: u64,
    pub spin_interval_ms: u64,
    pub slowdown_step_ms: u64,
    /// Fraction of the spin after which the pointer starts to slow down.
    pub slowdown_after: f64,
}

impl Default for DrawConfig {
    fn default() -> Self {
        DrawConfig {
            allow_repeats: false,
            spin_duration_ms: 3000,
            spin_interval_ms: 50,
            slowdown_step_ms: 20,
            slowdown_after: 0.7,
        }
    }
}

impl DrawConfig {
    pub fn spin_timing(&self) -> SpinTiming {
        SpinTiming {
            total: Duration::from_millis(self.spin_duration_ms),
            interval: Duration::from_millis(self.spin_interval_ms),
            slowdown_step: Duration::from_millis(self.slowdown_step_ms),
            slowdown_after: self.slowdown_after,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GroupsConfig {
    pub default_size: usize,
    pub shuffle_delay_ms: u64,
}

impl Default for GroupsConfig {
    fn default() -> Self {
        GroupsConfig {
            default_size: 3,
            shuffle_delay_ms: 600,
        }
    }
}

impl GroupsConfig {
    pub fn shuffle_delay(&self) -> Duration {
        Duration::from_millis(self.shuffle_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            directory: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    /// Fixed seed for reproducible draws and groups.
    pub seed: Option<u64>,
}

impl Config {
    /// Initial settings for a new session.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            allow_repeats: self.draw.allow_repeats,
            group_size: NonZeroUsize::new(self.groups.default_size).unwrap_or(NonZeroUsize::MIN),
            seed: self.random.seed,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Platform directories for this application, when a home directory exists.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "classroom")
}

/// Parse config text. `path` is only used for error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load and validate a specific config file.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    parse_config(&text, path)
}

/// Find the first existing config file, searching `base_dir/config/` and
/// then the platform config directory.
pub fn find_config_file(base_dir: &Path) -> Option<PathBuf> {
    let local = base_dir.join("config").join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    project_dirs()
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .filter(|p| p.is_file())
}

/// Convenience wrapper: loads config relative to the current working
/// directory, falling back to defaults when no file exists. Returns the path
/// that was loaded, if any.
pub fn load_config() -> Result<(Config, Option<PathBuf>), ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    match find_config_file(&cwd) {
        Some(path) => Ok((load_config_from(&path)?, Some(path))),
        None => Ok((Config::default(), None)),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let draw = &config.draw;
    let positive: &[(&str, u64)] = &[
        ("draw.spin_duration_ms", draw.spin_duration_ms),
        ("draw.spin_interval_ms", draw.spin_interval_ms),
    ];
    for (name, val) in positive {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    let frac = draw.slowdown_after;
    if !(0.0..=1.0).contains(&frac) {
        return Err(ConfigError::ValidationError {
            field: "draw.slowdown_after".into(),
            message: format!("must be between 0.0 and 1.0 inclusive, got {frac}"),
        });
    }

    if config.groups.default_size == 0 {
        return Err(ConfigError::ValidationError {
            field: "groups.default_size".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

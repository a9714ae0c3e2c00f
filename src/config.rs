//! Configuration for the cross shell.
//!
//! The configuration file is `~/.cross/config.toml`, or the file named by the
//! `CROSS_CONFIG` environment variable. Every key is optional:
//!
//! ```toml
//! [shell]
//! title = "Cross Interactive Command-Line Compiler Shell"
//! clear_screen = "auto"      # auto, always, never
//! detach_delay_ms = 0
//! pause_after_batch = true
//!
//! [repl]
//! max_line_len = 4096
//!
//! [diagnostics]
//! color = "auto"             # auto, always, never
//! fatal_exit_code = 0
//!
//! [loader]
//! placeholder_module = "test.cross"
//!
//! [log]
//! level = "debug"
//! file = "/tmp/cross.log"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::ui::banner;

/// Environment variable naming an alternate config file
pub const CONFIG_ENV: &str = "CROSS_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shell: ShellConfig,
    pub repl: ReplConfig,
    pub diagnostics: DiagnosticsConfig,
    pub loader: LoaderConfig,
    pub log: LogConfig,
}

/// Tri-state switch for terminal features
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Switch {
    /// On when the stream is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl Switch {
    pub fn resolve(self, is_terminal: bool) -> bool {
        match self {
            Switch::Auto => is_terminal,
            Switch::Always => true,
            Switch::Never => false,
        }
    }
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub title: String,
    pub clear_screen: Switch,
    /// Pause between the two clears on detach
    pub detach_delay_ms: u64,
    pub pause_after_batch: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            title: banner::TITLE.to_string(),
            clear_screen: Switch::Auto,
            detach_delay_ms: 0,
            pause_after_batch: true,
        }
    }
}

/// REPL settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// Bytes read per input line, newline included
    pub max_line_len: usize,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self { max_line_len: 4096 }
    }
}

/// Diagnostic output settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub color: Switch,
    /// Process exit status after a fatal diagnostic
    pub fatal_exit_code: i32,
}

/// Module loader settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Load this fixed module in batch mode instead of the one given
    pub placeholder_module: Option<String>,
}

/// Log file settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, e.g. `debug` or `cross=trace`
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        let level = if cfg!(debug_assertions) { "debug" } else { "off" };
        Self {
            level: level.to_string(),
            file: None,
        }
    }
}

impl LogConfig {
    /// Log file path, defaulting to `~/.cross/cross.log`
    pub fn file_path(&self) -> PathBuf {
        self.file.clone().unwrap_or_else(|| {
            home_dir()
                .map(|h| h.join(".cross").join("cross.log"))
                .unwrap_or_else(|| PathBuf::from("cross.log"))
        })
    }
}

impl Config {
    /// Load from the default location; a missing file means defaults
    pub fn load() -> Result<Self, ConfigError> {
        match Self::get_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        home_dir().map(|home| home.join(".cross").join("config.toml"))
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

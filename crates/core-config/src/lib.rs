//! Configuration loading and parsing.
//!
//! Parses `expando.toml` (or an override path supplied by the host):
//!
//! * `[trigger] prefix` – the marker character every trigger starts with.
//! * `[terminators]` – which terminator signals may complete a trigger.
//! * `[registry] path` – optional JSON file backing the record store.
//! * `[logging]` – default filter directive and optional log file location.
//!
//! Unknown fields are ignored so older hosts tolerate newer files. A file
//! that fails to parse falls back to defaults rather than disabling expansion.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const DEFAULT_PREFIX: char = '/';
pub const CONFIG_FILE_NAME: &str = "expando.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TriggerConfig {
    #[serde(default = "TriggerConfig::default_prefix")]
    pub prefix: char,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            prefix: Self::default_prefix(),
        }
    }
}

impl TriggerConfig {
    const fn default_prefix() -> char {
        DEFAULT_PREFIX
    }
}

/// Which terminator signals complete a trigger. Every field defaults to `true`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TerminatorConfig {
    #[serde(default = "enabled")]
    pub space: bool,
    #[serde(default = "enabled")]
    pub enter: bool,
    /// Tab expands with an empty terminator instead of only moving focus.
    #[serde(default = "enabled")]
    pub tab: bool,
}

impl Default for TerminatorConfig {
    fn default() -> Self {
        Self {
            space: true,
            enter: true,
            tab: true,
        }
    }
}

const fn enabled() -> bool {
    true
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "LoggingConfig::default_filter")]
    pub filter: String,
    /// Directory for the log file. Logs go to stderr when absent.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "LoggingConfig::default_file_name")]
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
            directory: None,
            file_name: Self::default_file_name(),
        }
    }
}

impl LoggingConfig {
    fn default_filter() -> String {
        "info".to_string()
    }
    fn default_file_name() -> String {
        "expando.log".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub terminators: TerminatorConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("expando").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(target: "config", path = %path.display(), "config_loaded");
                Ok(Config {
                    raw: Some(content),
                    file,
                })
            }
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

impl Config {
    /// Build a config in memory with the given trigger prefix and defaults elsewhere.
    pub fn with_prefix(prefix: char) -> Self {
        let mut cfg = Self::default();
        cfg.file.trigger.prefix = prefix;
        cfg
    }

    /// Prefix the matcher should use. A whitespace prefix can never begin a
    /// whitespace-free token, so it is rejected in favour of the default.
    pub fn effective_prefix(&self) -> char {
        let raw = self.file.trigger.prefix;
        if raw.is_whitespace() || raw.is_control() {
            warn!(
                target: "config",
                raw = raw as u32,
                fallback = %DEFAULT_PREFIX,
                "trigger_prefix_rejected"
            );
            return DEFAULT_PREFIX;
        }
        raw
    }

    pub fn terminators(&self) -> TerminatorConfig {
        self.file.terminators
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.file.logging
    }

    pub fn registry_path(&self) -> Option<&PathBuf> {
        self.file.registry.path.as_ref()
    }
}

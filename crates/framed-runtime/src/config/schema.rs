//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FramedConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Global and per-platform default prefixes.
    #[serde(default)]
    pub prefix: PrefixConfig,

    /// Discord identity and bypass lists.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Per-place prefixes, keyed by place id.
    #[serde(default)]
    pub places: HashMap<String, String>,

    /// Raw per-plugin sections, keyed by plugin id.
    #[serde(default)]
    pub plugins: HashMap<String, serde_json::Value>,
}

// =============================================================================
// Prefixes
// =============================================================================

/// Default prefixes for places without a configured one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefixConfig {
    /// Global default, always accepted.
    #[serde(default = "default_prefix")]
    pub default: String,

    /// Default for Discord places.
    #[serde(default)]
    pub discord: Option<String>,

    /// Default for Twitch channels.
    #[serde(default)]
    pub twitch: Option<String>,
}

impl Default for PrefixConfig {
    fn default() -> Self {
        Self {
            default: default_prefix(),
            discord: None,
            twitch: None,
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

// =============================================================================
// Discord
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiscordConfig {
    /// The bot's own user id. Enables `<@id>` and `<@!id>` as prefixes.
    #[serde(default)]
    pub bot_user_id: Option<String>,

    /// Users that pass every permission check.
    #[serde(default)]
    pub owners: Vec<String>,

    /// Users that pass every permission check on Discord.
    #[serde(default)]
    pub admins: Vec<String>,
}

// =============================================================================
// Logging
// =============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Requires `file_path`.
    File,
}

/// How often the log file rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub rotation: LogRotation,

    /// Rotated files to keep.
    #[serde(default = "default_max_files")]
    pub max_files: u32,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include file and line of the log call.
    #[serde(default)]
    pub file_location: bool,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Per-module levels, e.g. `framed_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            rotation: LogRotation::default(),
            max_files: default_max_files(),
            thread_ids: false,
            file_location: false,
            span_events: SpanEventConfig::default(),
            filters: HashMap::new(),
        }
    }
}

fn default_max_files() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FramedConfig::default();
        assert_eq!(config.prefix.default, "!");
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.max_files, 5);
        assert!(config.places.is_empty());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: FramedConfig = serde_json::from_value(serde_json::json!({
            "prefix": { "discord": "?" },
            "logging": { "level": "debug", "filters": { "framed_framework": "trace" } },
            "places": { "1234": "$" },
            "plugins": { "default.bot.fun": { "sides": 20 } }
        }))
        .unwrap();

        assert_eq!(config.prefix.default, "!");
        assert_eq!(config.prefix.discord.as_deref(), Some("?"));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.filters["framed_framework"], LogLevel::Trace);
        assert_eq!(config.places["1234"], "$");
        assert_eq!(config.plugins["default.bot.fun"]["sides"], 20);
    }
}

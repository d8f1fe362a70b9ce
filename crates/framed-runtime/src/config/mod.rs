//! Configuration loading and validation.
//!
//! [`FramedConfig`] holds logging settings, default prefixes, Discord bypass
//! lists, per-place prefixes and the raw per-plugin sections handed to each
//! plugin's register function.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    DiscordConfig, FramedConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig,
    PrefixConfig, SpanEventConfig,
};
pub use validation::validate_config;

//! Configuration loader using figment.
//!
//! Sources are layered, later ones overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. Profile-specific config file (`framed.{profile}.toml`)
//! 3. Main config file (`framed.toml` / `config.toml`)
//! 4. Programmatic overrides ([`ConfigLoader::merge`])
//! 5. Environment variables (`FRAMED_*`)
//!
//! # Feature Flags
//!
//! - `toml-config`: TOML files (`framed.toml`, `config.toml`)
//! - `yaml-config`: YAML files (`framed.yaml`, `framed.yml`, `config.yaml`, `config.yml`)
//!
//! # Environment Variable Mapping
//!
//! Variables use the `FRAMED_` prefix with `__` as the nesting separator:
//!
//! - `FRAMED_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `FRAMED_PREFIX__DEFAULT=?` → `prefix.default = "?"`
//! - `FRAMED_LOGGING__THREAD_IDS=true` → `logging.thread_ids = true`
//!
//! # Example
//!
//! ```rust,ignore
//! use framed_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./config/framed.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::FramedConfig;

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `FRAMED_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var("FRAMED_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    figment: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Specific file to load; disables the search.
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a search path. Without any, the current directory and the user
    /// config directory (`<config_dir>/framed`) are searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    pub fn with_user_config_dir(self) -> Self {
        match dirs::config_dir() {
            Some(dir) => self.search_path(dir.join("framed")),
            None => self,
        }
    }

    /// Loads exactly this file. Fails with [`ConfigError::FileNotFound`] if
    /// it does not exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges configuration programmatically. Takes precedence over files
    /// but not over environment variables.
    pub fn merge(mut self, config: FramedConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<FramedConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: FramedConfig = figment.extract()?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            places = config.places.len(),
            plugins = config.plugins.len(),
            "Configuration loaded"
        );

        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(FramedConfig::default()));

        match self.config_file.take() {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound(path));
                }
                let format = FileFormat::from_path(&path).ok_or_else(|| {
                    ConfigError::Parse(format!(
                        "Unsupported or disabled configuration file format: {}",
                        path.display()
                    ))
                })?;
                info!(path = %path.display(), "Loading configuration file");
                figment = format.merge(figment, &path);
            }
            None => figment = self.merge_found_files(figment),
        }

        figment = figment.merge(std::mem::take(&mut self.figment));

        if self.load_env {
            trace!("Loading environment variables with FRAMED_ prefix");
            figment = figment.merge(Env::prefixed("FRAMED_").ignore(&["PROFILE"]).split("__"));
        }

        Ok(figment)
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join("framed")))
            .collect()
    }

    /// For each enabled format, merges the first base file found along the
    /// search paths, preceded by its profile variant (`framed.production.toml`)
    /// when one sits next to it.
    fn merge_found_files(&self, mut figment: Figment) -> Figment {
        let search_paths = self.resolve_search_paths();
        let mut found = false;

        for format in FileFormat::ENABLED {
            let base = search_paths.iter().find_map(|dir| {
                format
                    .file_names()
                    .iter()
                    .map(|name| dir.join(name))
                    .find(|path| path.exists())
            });
            let Some(base) = base else {
                continue;
            };

            if let Some(profiled) = profile_variant(&base, &self.profile)
                && profiled.exists()
            {
                debug!(path = %profiled.display(), "Loading profile-specific config");
                figment = format.merge(figment, &profiled);
            }
            info!(path = %base.display(), "Loading configuration file");
            figment = format.merge(figment, &base);
            found = true;
        }

        if !found {
            warn!(paths = ?search_paths, "No configuration file found, using defaults");
        }
        figment
    }
}

/// `dir/framed.toml` → `dir/framed.{profile}.toml`.
fn profile_variant(base: &Path, profile: &Profile) -> Option<PathBuf> {
    let stem = base.file_stem()?.to_str()?;
    let ext = base.extension()?.to_str()?;
    Some(base.with_file_name(format!("{stem}.{profile}.{ext}")))
}

// =============================================================================
// File formats
// =============================================================================

/// Configuration file formats enabled by cargo features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    #[cfg(feature = "toml-config")]
    Toml,
    #[cfg(feature = "yaml-config")]
    Yaml,
}

impl FileFormat {
    const ENABLED: &'static [FileFormat] = &[
        #[cfg(feature = "toml-config")]
        FileFormat::Toml,
        #[cfg(feature = "yaml-config")]
        FileFormat::Yaml,
    ];

    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ENABLED
            .iter()
            .copied()
            .find(|format| format.extensions().contains(&ext))
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => &["toml"],
            #[cfg(feature = "yaml-config")]
            Self::Yaml => &["yaml", "yml"],
        }
    }

    /// Searched names, in priority order.
    fn file_names(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => &["framed.toml", "config.toml"],
            #[cfg(feature = "yaml-config")]
            Self::Yaml => &["framed.yaml", "framed.yml", "config.yaml", "config.yml"],
        }
    }

    #[allow(unused_variables)]
    fn merge(self, figment: Figment, path: &Path) -> Figment {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => figment.merge(figment::providers::Toml::file(path)),
            #[cfg(feature = "yaml-config")]
            Self::Yaml => figment.merge(figment::providers::Yaml::file(path)),
        }
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<FramedConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from one file, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<FramedConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogLevel;

    #[test]
    fn test_default_config() {
        figment::Jail::expect_with(|jail| {
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level.as_str(), "info");
            assert_eq!(config.prefix.default, "!");
            Ok(())
        });
    }

    #[test]
    fn test_profile_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("FRAMED_PROFILE", "prod");
            assert_eq!(Profile::from_env(), Profile::Production);
            jail.set_env("FRAMED_PROFILE", "staging");
            assert_eq!(Profile::from_env(), Profile::Custom("staging".into()));
            Ok(())
        });
    }

    #[test]
    fn test_profile_variant() {
        let path = profile_variant(Path::new("/etc/framed/framed.toml"), &Profile::Production);
        assert_eq!(
            path.as_deref(),
            Some(Path::new("/etc/framed/framed.production.toml"))
        );
        assert_eq!(profile_variant(Path::new("framed"), &Profile::Development), None);
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::new()
            .without_env()
            .file("/nonexistent/framed.toml")
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_file_env_and_profile_layers() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "framed.toml",
                r#"
                [prefix]
                default = "?"
                twitch = "~"

                [places]
                "1234" = "$"

                [plugins."default.bot.fun"]
                sides = 20
                "#,
            )?;
            jail.create_file(
                "framed.production.toml",
                r#"
                [logging]
                level = "warn"
                "#,
            )?;
            jail.set_env("FRAMED_LOGGING__THREAD_IDS", "true");
            jail.set_env("FRAMED_PREFIX__DEFAULT", "%");

            let config = ConfigLoader::new()
                .profile("production")
                .search_path(jail.directory())
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.prefix.default, "%");
            assert_eq!(config.prefix.twitch.as_deref(), Some("~"));
            assert_eq!(config.places["1234"], "$");
            assert_eq!(config.plugins["default.bot.fun"]["sides"], 20);
            assert!(config.logging.thread_ids);
            assert_eq!(config.logging.level, LogLevel::Warn);
            Ok(())
        });
    }

    #[test]
    fn test_programmatic_merge() {
        figment::Jail::expect_with(|jail| {
            let mut overrides = FramedConfig::default();
            overrides.prefix.discord = Some("?".into());

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .merge(overrides)
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.prefix.discord.as_deref(), Some("?"));
            Ok(())
        });
    }
}

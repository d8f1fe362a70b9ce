//! Runtime orchestration.
//!
//! [`FramedRuntime`] wires configuration into the command core: it seeds the
//! place prefix provider, builds the permission evaluator and prefix defaults,
//! owns the [`PluginManager`] and hands inbound messages to the [`Dispatcher`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use framed_runtime::FramedRuntime;
//!
//! // Loads framed.toml from the current or user config directory
//! let runtime = FramedRuntime::new()?;
//! runtime.register_manifest();
//! runtime.start();
//!
//! runtime.handle(&inbound).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use framed_core::{DefaultPermissionEvaluator, InboundMessage, MemoryPrefixProvider};
use framed_framework::{
    Dispatcher, LoadSummary, PluginDescriptor, PluginManager, PrefixDefaults, RegistryHandle,
};
use tracing::{info, warn};

use crate::config::{ConfigLoader, FramedConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// Counts describing the currently published registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Plugins in the current snapshot.
    pub plugins: usize,
    /// Root commands in the current snapshot.
    pub commands: usize,
}

/// The Framed runtime.
pub struct FramedRuntime {
    config: FramedConfig,
    prefixes: Arc<MemoryPrefixProvider>,
    dispatcher: Dispatcher,
    manager: PluginManager,
    started: AtomicBool,
}

impl FramedRuntime {
    /// Loads configuration from the default locations and builds a runtime.
    pub fn new() -> RuntimeResult<Self> {
        Self::builder().build()
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Builds a runtime from an already loaded configuration.
    ///
    /// Validates the configuration and initializes logging from it, unless a
    /// subscriber is already installed.
    pub fn from_config(config: FramedConfig) -> RuntimeResult<Self> {
        validate_config(&config)?;
        logging::init_from_config(&config.logging);

        let prefixes = Arc::new(MemoryPrefixProvider::from_entries(
            config
                .places
                .iter()
                .map(|(place, prefix)| (place.clone(), prefix.clone())),
        ));

        let permissions = DefaultPermissionEvaluator::new()
            .with_owners(config.discord.owners.iter().cloned())
            .with_admins(config.discord.admins.iter().cloned());

        let defaults = PrefixDefaults {
            default: config.prefix.default.clone(),
            discord: config.prefix.discord.clone(),
            twitch: config.prefix.twitch.clone(),
            bot_user_id: config.discord.bot_user_id.clone(),
        };

        let registry = RegistryHandle::default();
        let dispatcher = Dispatcher::new(registry.clone())
            .with_prefix_provider(prefixes.clone())
            .with_permissions(permissions)
            .with_prefix_defaults(defaults);
        let manager = PluginManager::new(registry, config.plugins.clone());

        info!(
            log_level = %config.logging.level,
            default_prefix = %config.prefix.default,
            places = config.places.len(),
            "Runtime initialized from configuration"
        );

        Ok(Self {
            config,
            prefixes,
            dispatcher,
            manager,
            started: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &FramedConfig {
        &self.config
    }

    // =========================================================================
    // Plugins
    // =========================================================================

    /// Registers a plugin. Its commands are published by the next
    /// [`start`](Self::start) or [`reload`](Self::reload).
    pub fn register_plugin(&self, plugin: PluginDescriptor) {
        self.manager.register_plugin(plugin);
    }

    /// Registers every plugin submitted with `submit_plugin!`.
    pub fn register_manifest(&self) -> usize {
        self.manager.register_manifest()
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.manager
    }

    /// Loads every registered plugin and publishes the registry.
    pub fn start(&self) -> LoadSummary {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("Runtime is already started, reloading instead");
            return self.manager.reload();
        }
        info!("Starting Framed runtime");
        let summary = self.manager.load_all();
        info!(
            plugins = summary.plugins,
            commands = summary.commands,
            "Runtime started"
        );
        summary
    }

    /// Rebuilds the registry from the registered plugins.
    pub fn reload(&self) -> LoadSummary {
        self.manager.reload()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatches one inbound message. Returns whether a handler ran and
    /// succeeded.
    pub async fn handle(&self, inbound: &InboundMessage) -> bool {
        self.dispatcher.handle(inbound).await
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The place prefix provider seeded from `places`. Changes apply to the
    /// next message.
    pub fn prefixes(&self) -> &Arc<MemoryPrefixProvider> {
        &self.prefixes
    }

    pub fn stats(&self) -> RuntimeStats {
        let snapshot = self.dispatcher.registry().load();
        RuntimeStats {
            plugins: snapshot.plugin_count(),
            commands: snapshot.command_count(),
        }
    }
}

impl std::fmt::Debug for FramedRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramedRuntime")
            .field("started", &self.is_started())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`FramedRuntime`] with custom configuration sources.
///
/// ```rust,ignore
/// let runtime = FramedRuntime::builder()
///     .config_file("config/framed.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    pub fn config_file(mut self, path: impl AsRef<std::path::Path>) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn search_path(mut self, path: impl AsRef<std::path::Path>) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration programmatically on top of files.
    pub fn merge(mut self, config: FramedConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    pub fn build(self) -> RuntimeResult<FramedRuntime> {
        let config = self.config_loader.load()?;
        FramedRuntime::from_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::error::RuntimeError;
    use framed_core::{DiscordMessage, PlatformMessage, TwitchMessage};
    use framed_framework::{CommandBuilder, CommandContext, PluginRegistrar, define_plugin};
    use std::sync::atomic::AtomicUsize;

    static ROLLS: AtomicUsize = AtomicUsize::new(0);

    async fn roll(ctx: CommandContext) -> Result<(), String> {
        let sides: usize = ctx
            .args()
            .first()
            .map(|s| s.parse().map_err(|_| format!("not a number: {s}")))
            .transpose()?
            .unwrap_or(6);
        ROLLS.fetch_add(sides, Ordering::SeqCst);
        Ok(())
    }

    fn register_dice(r: &mut PluginRegistrar) {
        r.command(CommandBuilder::new("roll").alias("r").handler(roll));
    }

    const DICE: PluginDescriptor = define_plugin! {
        id: "default.bot.dice",
        name: "Dice",
        register: register_dice,
    };

    fn config() -> FramedConfig {
        let mut config = FramedConfig::default();
        config.prefix.discord = Some("?".into());
        config.prefix.twitch = Some("~".into());
        config.discord.bot_user_id = Some("42".into());
        config.places.insert("guild-1".into(), "$".into());
        config
    }

    fn discord(guild: &str, content: &str) -> InboundMessage {
        let msg = DiscordMessage::builder()
            .channel_id("chan")
            .author_id("user")
            .guild_id(guild)
            .build()
            .unwrap();
        InboundMessage::new(content, PlatformMessage::Discord(msg))
    }

    #[tokio::test]
    async fn test_prefixes_from_config() {
        let runtime = FramedRuntime::from_config(config()).unwrap();
        runtime.register_plugin(DICE);
        assert_eq!(runtime.start().plugins, 1);

        let before = ROLLS.load(Ordering::SeqCst);
        // Place prefix, global default and mention prefix.
        assert!(runtime.handle(&discord("guild-1", "$roll 1")).await);
        assert!(runtime.handle(&discord("guild-1", "!r 10")).await);
        assert!(runtime.handle(&discord("guild-1", "<@42> roll 100")).await);
        // The Discord default only applies to places without their own prefix.
        assert!(!runtime.handle(&discord("guild-1", "?roll 1000")).await);
        assert!(runtime.handle(&discord("guild-2", "?roll 1000")).await);
        assert!(ROLLS.load(Ordering::SeqCst) - before >= 1111);

        let twitch = TwitchMessage::new("#chan", "user").unwrap();
        assert!(
            runtime
                .handle(&InboundMessage::new("~roll", PlatformMessage::Twitch(twitch)))
                .await
        );
    }

    #[tokio::test]
    async fn test_prefix_provider_changes_apply() {
        let runtime = FramedRuntime::from_config(config()).unwrap();
        runtime.register_plugin(DICE);
        runtime.start();

        assert!(!runtime.handle(&discord("guild-3", "&roll")).await);
        runtime.prefixes().set("guild-3", "&");
        assert!(runtime.handle(&discord("guild-3", "&roll")).await);
    }

    #[tokio::test]
    async fn test_handler_error_is_reported() {
        let runtime = FramedRuntime::from_config(config()).unwrap();
        runtime.register_plugin(DICE);
        runtime.start();

        assert!(!runtime.handle(&discord("guild-1", "$roll lots")).await);
    }

    #[test]
    fn test_stats_and_restart() {
        let runtime = FramedRuntime::from_config(FramedConfig::default()).unwrap();
        assert_eq!(runtime.stats(), RuntimeStats::default());

        runtime.register_plugin(DICE);
        runtime.start();
        assert!(runtime.is_started());
        assert_eq!(
            runtime.stats(),
            RuntimeStats {
                plugins: 1,
                commands: 1
            }
        );

        let generation = runtime.dispatcher().registry().load().generation();
        runtime.start();
        assert!(runtime.dispatcher().registry().load().generation() > generation);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = FramedConfig::default();
        config.prefix.default = "two words".into();
        let err = FramedRuntime::from_config(config).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Config(ConfigError::Validation { .. })
        ));
    }
}

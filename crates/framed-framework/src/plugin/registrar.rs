//! [`PluginRegistrar`]: the mutable stage a plugin registers its commands into.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::descriptor::PluginDescriptor;
use crate::command::{CommandBuilder, CommandRegistry};
use crate::error::RegistryResult;

/// Handed to a plugin's `register` function during a load pass.
///
/// Registration errors are logged by the registry and the offending entry is
/// skipped; the rest of the plugin keeps loading.
///
/// ```rust,ignore
/// fn register(r: &mut PluginRegistrar) {
///     r.command(CommandBuilder::new("ping").handler(ping));
///     r.command(
///         CommandBuilder::new("group")
///             .subcommand(CommandBuilder::new("add").handler(group_add)),
///     );
///     let _ = r.register_alias("pong", "ping");
/// }
/// ```
pub struct PluginRegistrar {
    descriptor: PluginDescriptor,
    registry: CommandRegistry,
    config: Arc<Value>,
}

impl PluginRegistrar {
    pub(crate) fn new(descriptor: PluginDescriptor, config: Arc<Value>) -> Self {
        Self {
            registry: CommandRegistry::new(descriptor.id),
            descriptor,
            config,
        }
    }

    pub fn plugin(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    pub fn plugin_id(&self) -> &'static str {
        self.descriptor.id
    }

    /// The plugin's raw config section (`Value::Null` when absent).
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Deserializes the plugin's config section, falling back to
    /// `T::default()` when it is absent or malformed.
    pub fn config_as<T: DeserializeOwned + Default>(&self) -> T {
        if self.config.is_null() {
            return T::default();
        }
        serde_json::from_value((*self.config).clone()).unwrap_or_else(|e| {
            warn!(plugin = %self.descriptor.id, "Invalid plugin config, using defaults: {e}");
            T::default()
        })
    }

    /// Registers a command, logging and skipping it on collision.
    pub fn command(&mut self, builder: CommandBuilder) -> &mut Self {
        let _ = self.register_command(builder);
        self
    }

    /// Registers a command. Commands without a group inherit the plugin's.
    pub fn register_command(&mut self, builder: CommandBuilder) -> RegistryResult<()> {
        let builder = builder.default_group(self.descriptor.group);
        self.registry.register_command(builder.build())
    }

    /// Registers an extra alias for one of this plugin's commands.
    pub fn register_alias(&mut self, alias: &str, id: &str) -> RegistryResult<()> {
        self.registry.register_alias(alias, id)
    }

    /// Commands registered so far.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub(crate) fn finish(self) -> CommandRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::plugin::FRAMED_PLUGIN_API_VERSION;
    use serde::Deserialize;

    fn noop(_: &mut PluginRegistrar) {}

    const PLUGIN: PluginDescriptor = PluginDescriptor {
        api_version: FRAMED_PLUGIN_API_VERSION,
        id: "default.bot.fun",
        name: "Fun",
        version: "1.0.0",
        description: None,
        group: Some("Fun"),
        group_emote: None,
        register: noop,
    };

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct FunConfig {
        #[serde(default)]
        sides: u32,
    }

    #[test]
    fn test_group_inherited_and_collisions_skipped() {
        let mut r = PluginRegistrar::new(PLUGIN, Arc::new(Value::Null));
        r.command(CommandBuilder::new("roll"))
            .command(CommandBuilder::new("flip").group("Games"))
            .command(CommandBuilder::new("ROLL"));

        assert_eq!(
            r.register_alias("dice", "nope"),
            Err(RegistryError::UnknownCommand {
                scope: "default.bot.fun".into(),
                id: "nope".into()
            })
        );
        r.register_alias("dice", "roll").unwrap();

        let reg = r.finish();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.lookup("roll").unwrap().group(), Some("Fun"));
        assert_eq!(reg.lookup("flip").unwrap().group(), Some("Games"));
        assert_eq!(reg.lookup("dice").unwrap().id(), "roll");
    }

    #[test]
    fn test_config_as() {
        let r = PluginRegistrar::new(PLUGIN, Arc::new(serde_json::json!({ "sides": 20 })));
        assert_eq!(r.config_as::<FunConfig>(), FunConfig { sides: 20 });

        let r = PluginRegistrar::new(PLUGIN, Arc::new(serde_json::json!({ "sides": "x" })));
        assert_eq!(r.config_as::<FunConfig>(), FunConfig::default());

        let r = PluginRegistrar::new(PLUGIN, Arc::new(Value::Null));
        assert_eq!(r.config_as::<FunConfig>(), FunConfig::default());
    }
}

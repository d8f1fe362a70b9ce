//! Command registries.
//!
//! A [`CommandTable`] is one identifier scope: the id map plus the alias map.
//! It is used both at plugin level (inside [`CommandRegistry`]) and for every
//! descriptor's subcommands. All identifiers are normalized to lowercase
//! before they are compared or stored, and every identifier is unique within
//! its scope: an id may not equal an existing id or alias, and an alias may not
//! equal an existing id or alias.
//!
//! Collisions are logged at `error` level and the offending registration is
//! skipped; the caller gets the error back but the rest of the load continues.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::descriptor::CommandDescriptor;
use super::resolve::MAX_SUBCOMMAND_DEPTH;
use crate::error::{RegistryError, RegistryResult};

/// Canonical form used for every identifier comparison.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

// ============================================================================
// CommandTable
// ============================================================================

/// A single identifier scope mapping ids and aliases to descriptors.
#[derive(Default)]
pub struct CommandTable {
    scope: String,
    ids: HashMap<String, Arc<CommandDescriptor>>,
    aliases: HashMap<String, Arc<CommandDescriptor>>,
    /// Ids in registration order.
    order: Vec<String>,
}

impl CommandTable {
    /// Creates an empty table; `scope` names it in diagnostics.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..Default::default()
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Returns `true` if `name` is already taken by an id or alias.
    pub fn contains(&self, name: &str) -> bool {
        let name = normalize(name);
        self.ids.contains_key(&name) || self.aliases.contains_key(&name)
    }

    /// Registers a descriptor under its id, then each of its declared aliases.
    ///
    /// Fails with [`RegistryError::DuplicateId`] when the id is taken; the
    /// table is left untouched in that case. A colliding alias is logged and
    /// dropped from the descriptor without failing the registration.
    pub fn register_command(&mut self, mut descriptor: CommandDescriptor) -> RegistryResult<()> {
        let id = normalize(descriptor.id());
        if self.contains(&id) {
            let err = RegistryError::DuplicateId {
                scope: self.scope.clone(),
                id,
            };
            error!(scope = %self.scope, "{err}");
            return Err(err);
        }

        let mut accepted: Vec<String> = Vec::new();
        for alias in std::mem::take(descriptor.aliases_mut()) {
            let alias = normalize(&alias);
            if alias == id || accepted.contains(&alias) || self.contains(&alias) {
                self.report_alias_collision(alias, &id);
            } else {
                accepted.push(alias);
            }
        }
        *descriptor.aliases_mut() = accepted;

        let descriptor = Arc::new(descriptor);
        self.ids.insert(id.clone(), Arc::clone(&descriptor));
        self.order.push(id.clone());
        for alias in descriptor.aliases() {
            self.aliases.insert(alias.clone(), Arc::clone(&descriptor));
        }

        debug!(scope = %self.scope, command = %id, "Registered command");
        Ok(())
    }

    /// Registers `alias` for the descriptor registered under `id`.
    ///
    /// The alias resolves through this table only; the descriptor's own
    /// [`aliases`](CommandDescriptor::aliases) list is frozen.
    pub fn register_alias(&mut self, alias: &str, id: &str) -> RegistryResult<()> {
        let id = normalize(id);
        let Some(target) = self.ids.get(&id).cloned() else {
            let err = RegistryError::UnknownCommand {
                scope: self.scope.clone(),
                id,
            };
            error!(scope = %self.scope, "{err}");
            return Err(err);
        };

        let alias = normalize(alias);
        if self.contains(&alias) {
            return Err(self.report_alias_collision(alias, &id));
        }
        self.aliases.insert(alias, target);
        Ok(())
    }

    fn report_alias_collision(&self, alias: String, command: &str) -> RegistryError {
        let err = RegistryError::DuplicateAlias {
            scope: self.scope.clone(),
            alias,
        };
        error!(scope = %self.scope, command, "{err}");
        err
    }

    /// Looks `name` up in the id map, then in the alias map.
    pub fn lookup(&self, name: &str) -> Option<&Arc<CommandDescriptor>> {
        let name = normalize(name);
        self.ids.get(&name).or_else(|| self.aliases.get(&name))
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CommandDescriptor>> {
        self.order.iter().filter_map(|id| self.ids.get(id))
    }

    /// Ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Registered alias names (unordered).
    pub fn alias_names(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    /// Number of registered ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// ============================================================================
// CommandRegistry
// ============================================================================

/// The plugin-level command scope.
///
/// Built during plugin load, read-only once it is placed into a
/// [`RegistrySnapshot`](super::snapshot::RegistrySnapshot).
pub struct CommandRegistry {
    plugin_id: Arc<str>,
    table: CommandTable,
}

impl CommandRegistry {
    pub fn new(plugin_id: impl Into<Arc<str>>) -> Self {
        let plugin_id = plugin_id.into();
        Self {
            table: CommandTable::new(plugin_id.to_string()),
            plugin_id,
        }
    }

    pub fn plugin_id(&self) -> &Arc<str> {
        &self.plugin_id
    }

    /// Registers a root command. See [`CommandTable::register_command`].
    ///
    /// Subcommand trees deeper than [`MAX_SUBCOMMAND_DEPTH`] are accepted but
    /// warned about: levels below the cap are never dispatched to.
    pub fn register_command(&mut self, descriptor: CommandDescriptor) -> RegistryResult<()> {
        let depth = descriptor.nesting_depth();
        if depth > MAX_SUBCOMMAND_DEPTH {
            warn!(
                plugin = %self.plugin_id,
                command = %descriptor.id(),
                depth,
                max = MAX_SUBCOMMAND_DEPTH,
                "Subcommands nested deeper than the maximum will never run"
            );
        }
        self.table.register_command(descriptor)
    }

    /// Registers an extra alias for a root command.
    pub fn register_alias(&mut self, alias: &str, id: &str) -> RegistryResult<()> {
        self.table.register_alias(alias, id)
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<CommandDescriptor>> {
        self.table.lookup(name)
    }

    /// `"{plugin}.command.{id}"`.
    pub fn full_id(&self, command: &CommandDescriptor) -> String {
        format!("{}.command.{}", self.plugin_id, command.id())
    }

    pub fn commands(&self) -> impl Iterator<Item = &Arc<CommandDescriptor>> {
        self.table.iter()
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::descriptor::CommandBuilder;

    fn cmd(id: &str) -> CommandDescriptor {
        CommandBuilder::new(id).build()
    }

    #[test]
    fn test_duplicate_id_any_case() {
        let mut reg = CommandRegistry::new("core");
        reg.register_command(cmd("ping")).unwrap();

        let err = reg
            .register_command(CommandBuilder::new("PING").alias("p").build())
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateId {
                scope: "core".into(),
                id: "ping".into()
            }
        );

        // State unchanged: still one command, and the rejected alias is absent.
        assert_eq!(reg.len(), 1);
        assert!(reg.lookup("p").is_none());
        assert_eq!(reg.table().alias_names().count(), 0);
    }

    #[test]
    fn test_alias_colliding_with_id() {
        let mut reg = CommandRegistry::new("core");
        reg.register_command(cmd("x")).unwrap();
        reg.register_command(cmd("y")).unwrap();
        assert_eq!(
            reg.register_alias("X", "y"),
            Err(RegistryError::DuplicateAlias {
                scope: "core".into(),
                alias: "x".into()
            })
        );
        assert_eq!(reg.lookup("x").unwrap().id(), "x");
    }

    #[test]
    fn test_alias_colliding_with_alias() {
        let mut reg = CommandRegistry::new("core");
        reg.register_command(CommandBuilder::new("a").alias("shared").build())
            .unwrap();
        // Declared alias collides: the command still registers, the alias is skipped.
        reg.register_command(CommandBuilder::new("b").alias("shared").build())
            .unwrap();
        assert_eq!(reg.lookup("shared").unwrap().id(), "a");
        assert_eq!(reg.lookup("b").unwrap().id(), "b");
        assert!(reg.lookup("b").unwrap().aliases().is_empty());
        assert_eq!(reg.lookup("a").unwrap().aliases(), ["shared"]);
    }

    #[test]
    fn test_rejected_aliases_are_dropped_from_descriptor() {
        let mut reg = CommandRegistry::new("core");
        reg.register_command(cmd("x")).unwrap();
        reg.register_command(
            CommandBuilder::new("y")
                .aliases(["X", "why", "y", "WHY", "yy"])
                .build(),
        )
        .unwrap();
        assert_eq!(reg.lookup("y").unwrap().aliases(), ["why", "yy"]);
        assert_eq!(reg.table().alias_names().count(), 2);
    }

    #[test]
    fn test_id_colliding_with_alias() {
        let mut reg = CommandRegistry::new("core");
        reg.register_command(CommandBuilder::new("a").alias("b").build())
            .unwrap();
        assert!(matches!(
            reg.register_command(cmd("b")),
            Err(RegistryError::DuplicateId { .. })
        ));
    }

    #[test]
    fn test_alias_for_unknown_command() {
        let mut reg = CommandRegistry::new("core");
        assert_eq!(
            reg.register_alias("p", "ping"),
            Err(RegistryError::UnknownCommand {
                scope: "core".into(),
                id: "ping".into()
            })
        );
    }

    #[test]
    fn test_lookup_checks_ids_then_aliases() {
        let mut reg = CommandRegistry::new("core");
        reg.register_command(CommandBuilder::new("help").alias("h").build())
            .unwrap();
        reg.register_alias("commands", "help").unwrap();
        assert_eq!(reg.lookup("HELP").unwrap().id(), "help");
        assert_eq!(reg.lookup("h").unwrap().id(), "help");
        assert_eq!(reg.lookup("commands").unwrap().id(), "help");
        assert!(reg.lookup("nope").is_none());
    }

    #[test]
    fn test_registration_order_and_full_id() {
        let mut reg = CommandRegistry::new("default.bot.info");
        for id in ["zeta", "alpha", "mid"] {
            reg.register_command(cmd(id)).unwrap();
        }
        let ids: Vec<_> = reg.table().ids().collect();
        assert_eq!(ids, ["zeta", "alpha", "mid"]);

        let alpha = reg.lookup("alpha").unwrap();
        assert_eq!(reg.full_id(alpha), "default.bot.info.command.alpha");
    }

    #[test]
    fn test_too_deep_tree_still_registers() {
        let deep = CommandBuilder::new("a")
            .subcommand(CommandBuilder::new("b").subcommand(
                CommandBuilder::new("c").subcommand(
                    CommandBuilder::new("d").subcommand(CommandBuilder::new("e")),
                ),
            ))
            .build();
        assert_eq!(deep.nesting_depth(), 4);

        let mut reg = CommandRegistry::new("core");
        reg.register_command(deep).unwrap();
        assert!(reg.lookup("a").is_some());
    }
}

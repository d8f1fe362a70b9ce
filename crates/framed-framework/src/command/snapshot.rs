//! Frozen registry snapshots.
//!
//! Plugin load writes into per-plugin [`CommandRegistry`] builders. Once a load
//! pass is complete they are frozen into a [`RegistrySnapshot`] and published
//! through a [`RegistryHandle`]. Dispatch only ever reads an
//! `Arc<RegistrySnapshot>`; a reload builds a new snapshot and swaps the
//! reference, so in-flight dispatches keep the generation they started with.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, error};

use super::descriptor::CommandDescriptor;
use super::prefix::PrefixCandidates;
use super::registry::CommandRegistry;
use crate::error::{RegistryError, RegistryResult};

/// A root command together with the plugin that owns it.
#[derive(Debug, Clone)]
pub struct CommandMatch {
    pub plugin_id: Arc<str>,
    pub command: Arc<CommandDescriptor>,
}

/// Read-only view over every loaded plugin's commands.
#[derive(Default)]
pub struct RegistrySnapshot {
    generation: u64,
    plugins: Vec<CommandRegistry>,
    override_prefixes: Vec<String>,
}

impl RegistrySnapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// A snapshot with no plugins.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Increases by one on every [`RegistryHandle::store`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Looks a root command up across plugins in load order.
    ///
    /// The first plugin that knows `name` (by id or alias) wins.
    pub fn lookup(&self, name: &str) -> Option<CommandMatch> {
        let mut hits = self
            .plugins
            .iter()
            .filter_map(|reg| reg.lookup(name).map(|cmd| (reg.plugin_id(), cmd)));

        let (plugin_id, command) = hits.next()?;
        for (shadowed, _) in hits {
            debug!(
                command = %name,
                plugin = %plugin_id,
                shadowed = %shadowed,
                "Command name is shadowed by an earlier plugin"
            );
        }

        Some(CommandMatch {
            plugin_id: Arc::clone(plugin_id),
            command: Arc::clone(command),
        })
    }

    /// Per-command override prefixes of every root command, deduplicated, in
    /// load order.
    pub fn override_prefixes(&self) -> &[String] {
        &self.override_prefixes
    }

    pub fn plugin(&self, plugin_id: &str) -> Option<&CommandRegistry> {
        self.plugins
            .iter()
            .find(|reg| &**reg.plugin_id() == plugin_id)
    }

    pub fn plugins(&self) -> impl Iterator<Item = &CommandRegistry> {
        self.plugins.iter()
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Number of root commands over all plugins.
    pub fn command_count(&self) -> usize {
        self.plugins.iter().map(CommandRegistry::len).sum()
    }
}

impl std::fmt::Debug for RegistrySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrySnapshot")
            .field("generation", &self.generation)
            .field(
                "plugins",
                &self.plugins.iter().map(|r| r.plugin_id()).collect::<Vec<_>>(),
            )
            .field("commands", &self.command_count())
            .finish()
    }
}

/// Collects plugin registries for one load pass.
#[derive(Default)]
pub struct SnapshotBuilder {
    plugins: Vec<CommandRegistry>,
}

impl SnapshotBuilder {
    /// Adds a plugin's registry. A second registry with the same plugin id is
    /// rejected with [`RegistryError::DuplicatePlugin`].
    pub fn add(&mut self, registry: CommandRegistry) -> RegistryResult<()> {
        if self
            .plugins
            .iter()
            .any(|r| r.plugin_id() == registry.plugin_id())
        {
            let err = RegistryError::DuplicatePlugin {
                id: registry.plugin_id().to_string(),
            };
            error!("{err}");
            return Err(err);
        }
        self.plugins.push(registry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn build(self) -> RegistrySnapshot {
        let override_prefixes = self
            .plugins
            .iter()
            .flat_map(CommandRegistry::commands)
            .flat_map(|cmd| cmd.prefixes().iter().cloned())
            .fold(PrefixCandidates::new(), |mut acc, p| {
                acc.push(p);
                acc
            })
            .into_iter()
            .collect();

        RegistrySnapshot {
            generation: 0,
            plugins: self.plugins,
            override_prefixes,
        }
    }
}

/// Shared, swappable reference to the current snapshot.
#[derive(Clone)]
pub struct RegistryHandle {
    current: Arc<RwLock<Arc<RegistrySnapshot>>>,
    generation: Arc<AtomicU64>,
}

impl RegistryHandle {
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The snapshot visible to new dispatches.
    pub fn load(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Publishes `snapshot` and returns the one it replaced.
    pub fn store(&self, mut snapshot: RegistrySnapshot) -> Arc<RegistrySnapshot> {
        snapshot.generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            generation = snapshot.generation,
            plugins = snapshot.plugin_count(),
            commands = snapshot.command_count(),
            "Registry snapshot swapped"
        );
        std::mem::replace(&mut *self.current.write(), Arc::new(snapshot))
    }
}

impl Default for RegistryHandle {
    fn default() -> Self {
        Self::new(RegistrySnapshot::empty())
    }
}

impl std::fmt::Debug for RegistryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RegistryHandle").field(&self.load()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandBuilder;

    fn registry(plugin: &str, commands: &[(&str, &[&str])]) -> CommandRegistry {
        let mut reg = CommandRegistry::new(plugin);
        for (id, prefixes) in commands {
            let mut builder = CommandBuilder::new(id);
            for p in *prefixes {
                builder = builder.prefix(*p);
            }
            reg.register_command(builder.build()).unwrap();
        }
        reg
    }

    #[test]
    fn test_lookup_first_plugin_wins() {
        let mut builder = RegistrySnapshot::builder();
        builder.add(registry("a", &[("help", &[])])).unwrap();
        builder.add(registry("b", &[("help", &[]), ("ping", &[])])).unwrap();
        let snap = builder.build();

        assert_eq!(&*snap.lookup("HELP").unwrap().plugin_id, "a");
        assert_eq!(&*snap.lookup("ping").unwrap().plugin_id, "b");
        assert!(snap.lookup("nope").is_none());
        assert_eq!(snap.command_count(), 3);
    }

    #[test]
    fn test_duplicate_plugin() {
        let mut builder = RegistrySnapshot::builder();
        builder.add(registry("a", &[])).unwrap();
        assert_eq!(
            builder.add(registry("a", &[("x", &[])])),
            Err(RegistryError::DuplicatePlugin { id: "a".into() })
        );
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_override_prefixes_dedup_in_order() {
        let mut builder = RegistrySnapshot::builder();
        builder
            .add(registry("a", &[("x", &["$", "%"]), ("y", &["$"])]))
            .unwrap();
        builder.add(registry("b", &[("z", &["&", "%"])])).unwrap();
        assert_eq!(builder.build().override_prefixes(), ["$", "%", "&"]);
    }

    #[test]
    fn test_handle_swap_keeps_old_snapshot_alive() {
        let handle = RegistryHandle::default();
        let before = handle.load();
        assert_eq!(before.generation(), 0);

        let mut builder = RegistrySnapshot::builder();
        builder.add(registry("a", &[("ping", &[])])).unwrap();
        let replaced = handle.store(builder.build());

        assert!(Arc::ptr_eq(&before, &replaced));
        assert!(before.lookup("ping").is_none());
        let after = handle.load();
        assert_eq!(after.generation(), 1);
        assert!(after.lookup("ping").is_some());
    }
}

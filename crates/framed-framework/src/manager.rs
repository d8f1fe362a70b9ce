//! Plugin registration and registry (re)building.
//!
//! [`PluginManager`] owns the list of registered plugins. It:
//!
//! - Accepts [`PluginDescriptor`]s, either one by one or from the build-time
//!   [`PLUGIN_MANIFEST`].
//! - On [`load_all`](PluginManager::load_all), runs every plugin's `register`
//!   function into a fresh [`RegistrySnapshot`] and swaps it into the shared
//!   [`RegistryHandle`]. Dispatchers holding the handle see the new commands
//!   on their next message.
//! - Serializes load passes: two concurrent reloads never interleave.
//!
//! A plugin whose `register` function panics, or whose id duplicates an
//! earlier plugin, is marked [`PluginLoadState::Failed`] and left out of the
//! snapshot. The remaining plugins still load.
//!
//! # Example
//!
//! ```rust,ignore
//! let manager = PluginManager::new(registry.clone(), HashMap::new());
//! manager.register_plugin(INFO);
//! manager.register_manifest();
//! manager.load_all();
//! ```

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{error, info, info_span, warn};

use crate::command::{RegistryHandle, RegistrySnapshot};
use crate::plugin::{FRAMED_PLUGIN_API_VERSION, PLUGIN_MANIFEST, PluginDescriptor, PluginRegistrar};

/// Load state of a registered plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginLoadState {
    /// Registered but not part of any load pass yet.
    Registered,
    /// Commands are in the current snapshot.
    Loaded,
    /// The last load pass skipped this plugin.
    Failed,
}

struct PluginEntry {
    descriptor: PluginDescriptor,
    state: PluginLoadState,
}

/// Counts from one load pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub plugins: usize,
    pub commands: usize,
    pub failed: usize,
}

/// Registers plugins and publishes their commands.
pub struct PluginManager {
    plugins: Mutex<Vec<PluginEntry>>,
    /// Per-plugin config sections, keyed by plugin id.
    plugin_configs: HashMap<String, Arc<Value>>,
    registry: RegistryHandle,
}

impl PluginManager {
    /// Creates a manager publishing into `registry`.
    pub fn new(registry: RegistryHandle, plugin_configs: HashMap<String, Value>) -> Self {
        Self {
            plugins: Mutex::new(Vec::new()),
            plugin_configs: plugin_configs
                .into_iter()
                .map(|(k, v)| (k, Arc::new(v)))
                .collect(),
            registry,
        }
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    // ─── Plugin registration ─────────────────────────────────────────────────

    /// Registers a plugin. It contributes commands from the next
    /// [`load_all`](Self::load_all) on.
    ///
    /// Logs a warning when the API version does not match, but continues.
    pub fn register_plugin(&self, desc: PluginDescriptor) {
        if !desc.is_compatible() {
            warn!(
                plugin = %desc.id,
                descriptor_version = %format!("{}.{}", desc.api_version >> 16, desc.api_version & 0xFFFF),
                host_version = %format!(
                    "{}.{}",
                    FRAMED_PLUGIN_API_VERSION >> 16,
                    FRAMED_PLUGIN_API_VERSION & 0xFFFF
                ),
                "Plugin API version mismatch, registering anyway"
            );
        }
        self.plugins.lock().push(PluginEntry {
            descriptor: desc,
            state: PluginLoadState::Registered,
        });
        info!(plugin = %desc.id, "Plugin registered");
    }

    /// Registers every plugin in [`PLUGIN_MANIFEST`]. Returns how many.
    pub fn register_manifest(&self) -> usize {
        for desc in PLUGIN_MANIFEST {
            self.register_plugin(**desc);
        }
        PLUGIN_MANIFEST.len()
    }

    /// Removes every plugin with id `id`. Takes effect on the next load pass.
    pub fn remove_plugin(&self, id: &str) -> bool {
        let mut plugins = self.plugins.lock();
        let before = plugins.len();
        plugins.retain(|e| e.descriptor.id != id);
        let removed = plugins.len() != before;
        if removed {
            info!(plugin = %id, "Plugin removed");
        }
        removed
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.lock().len()
    }

    /// State of the first plugin with id `id`.
    pub fn plugin_state(&self, id: &str) -> Option<PluginLoadState> {
        self.plugins
            .lock()
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| e.state)
    }

    /// Registered descriptors in registration order.
    pub fn plugins(&self) -> Vec<PluginDescriptor> {
        self.plugins.lock().iter().map(|e| e.descriptor).collect()
    }

    // ─── Load passes ─────────────────────────────────────────────────────────

    /// Builds a new snapshot from every registered plugin and publishes it.
    pub fn load_all(&self) -> LoadSummary {
        let span = info_span!("load_plugins");
        let _enter = span.enter();

        let mut plugins = self.plugins.lock();
        let mut builder = RegistrySnapshot::builder();
        let mut summary = LoadSummary::default();

        for entry in plugins.iter_mut() {
            let desc = entry.descriptor;
            let config = self
                .plugin_configs
                .get(desc.id)
                .cloned()
                .unwrap_or_else(|| Arc::new(Value::Null));
            let mut registrar = PluginRegistrar::new(desc, config);

            if catch_unwind(AssertUnwindSafe(|| (desc.register)(&mut registrar))).is_err() {
                error!(plugin = %desc.id, "Plugin register function panicked; skipping");
                entry.state = PluginLoadState::Failed;
                summary.failed += 1;
                continue;
            }

            let registry = registrar.finish();
            let commands = registry.len();
            match builder.add(registry) {
                Ok(()) => {
                    entry.state = PluginLoadState::Loaded;
                    summary.plugins += 1;
                    summary.commands += commands;
                    info!(plugin = %desc.id, commands, "Plugin loaded");
                }
                Err(_) => {
                    entry.state = PluginLoadState::Failed;
                    summary.failed += 1;
                }
            }
        }

        self.registry.store(builder.build());
        drop(plugins);

        info!(
            plugins = summary.plugins,
            commands = summary.commands,
            failed = summary.failed,
            "Plugins loaded"
        );
        summary
    }

    /// Rebuilds the registry from scratch. In-flight dispatches finish on the
    /// snapshot they started with.
    pub fn reload(&self) -> LoadSummary {
        info!("Reloading plugins");
        self.load_all()
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("plugins", &self.plugin_count())
            .finish_non_exhaustive()
    }
}

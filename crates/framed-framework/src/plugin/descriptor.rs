//! Plugin descriptor: the static, `Copy` handle to a plugin.

use linkme::distributed_slice;

use super::registrar::PluginRegistrar;

// ─── API versioning ─────────────────────────────────────────────────────────────

/// Current plugin API version (1.0).
pub const FRAMED_PLUGIN_API_VERSION: u32 = 0x0001_0000;

// ─── PluginDescriptor ───────────────────────────────────────────────────────────

/// A static, `Copy` descriptor identifying a plugin and its registration
/// function.
///
/// Use [`define_plugin!`](crate::define_plugin) to create one.
#[derive(Debug, Clone, Copy)]
pub struct PluginDescriptor {
    /// Plugin API version this descriptor was compiled against.
    pub api_version: u32,

    /// Unique plugin id, e.g. `"default.bot.info"`. Also the key of the
    /// plugin's config section and the first segment of its commands' full ids.
    pub id: &'static str,

    /// Human-readable name.
    pub name: &'static str,

    pub version: &'static str,

    pub description: Option<&'static str>,

    /// Help group for commands that don't set their own.
    pub group: Option<&'static str>,

    pub group_emote: Option<&'static str>,

    /// Registers the plugin's commands.
    pub register: fn(&mut PluginRegistrar),
}

impl PluginDescriptor {
    /// Returns `true` if this descriptor's API version is compatible with the
    /// running framework.
    ///
    /// The major part must match exactly; the descriptor's minor part must be
    /// ≤ the host's minor part.
    pub fn is_compatible(&self) -> bool {
        let host_major = FRAMED_PLUGIN_API_VERSION >> 16;
        let host_minor = FRAMED_PLUGIN_API_VERSION & 0xFFFF;
        let desc_major = self.api_version >> 16;
        let desc_minor = self.api_version & 0xFFFF;
        desc_major == host_major && desc_minor <= host_minor
    }
}

// ─── Build-time manifest ────────────────────────────────────────────────────────

/// Plugins submitted with [`submit_plugin!`](crate::submit_plugin).
///
/// [`PluginManager::register_manifest`](crate::manager::PluginManager::register_manifest)
/// registers every entry.
#[distributed_slice]
pub static PLUGIN_MANIFEST: [&'static PluginDescriptor];

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut PluginRegistrar) {}

    fn descriptor(api_version: u32) -> PluginDescriptor {
        PluginDescriptor {
            api_version,
            id: "test",
            name: "Test",
            version: "0.0.0",
            description: None,
            group: None,
            group_emote: None,
            register: noop,
        }
    }

    #[test]
    fn test_api_compatibility() {
        assert!(descriptor(FRAMED_PLUGIN_API_VERSION).is_compatible());
        assert!(descriptor(0x0001_0000).is_compatible());
        assert!(!descriptor(0x0001_0001).is_compatible());
        assert!(!descriptor(0x0002_0000).is_compatible());
    }
}

//! Plugins.
//!
//! A plugin is a static [`PluginDescriptor`] whose `register` function adds
//! commands to a [`PluginRegistrar`]. Plugins are registered with the
//! [`PluginManager`](crate::manager::PluginManager) explicitly, or collected
//! at build time through [`PLUGIN_MANIFEST`] with
//! [`submit_plugin!`](crate::submit_plugin).

pub mod descriptor;
mod macros;
pub mod registrar;

pub use descriptor::{FRAMED_PLUGIN_API_VERSION, PLUGIN_MANIFEST, PluginDescriptor};
pub use registrar::PluginRegistrar;

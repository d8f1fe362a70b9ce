//! # Framed Framework
//!
//! The command core of the Framed bot framework.
//!
//! This layer provides:
//! - A quote- and code-block-aware tokenizer
//! - Prefix resolution over an explicit, ordered candidate list
//! - Plugin-scoped command registries with case-insensitive collision detection
//! - Subcommand chain resolution (up to three levels)
//! - The [`Dispatcher`] tying it together, with a permission gate and handler
//!   invocation
//! - Static plugin descriptors and the [`PluginManager`] that builds and swaps
//!   registry snapshots
//! - Optional clap argument parsing (with the `clap` feature)

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod manager;
pub mod plugin;

pub use command::{
    CommandBuilder, CommandDescriptor, CommandRegistry, ParsedMessage, PrefixCandidates,
    RegistryHandle, RegistrySnapshot, ResolveDiagnostic, SubcommandChain, resolve_prefix,
    resolve_subcommand_chain, tokenize,
};
pub use dispatcher::{DenialHook, Dispatcher, LogDenial, PrefixDefaults};
pub use error::{HandlerError, RegistryError, RegistryResult};
pub use handler::{BoxedHandler, CommandContext, CommandHandler, HandlerFn, IntoOutcome};
pub use manager::{LoadSummary, PluginLoadState, PluginManager};
pub use plugin::{PluginDescriptor, PluginRegistrar};

#[cfg(feature = "clap")]
pub use command::CommandArgs;

#[doc(hidden)]
pub mod __private {
    pub use linkme;
}

//! # Framed
//!
//! A message-driven command framework for chat bots.
//!
//! ## Overview
//!
//! A platform adapter turns whatever it receives into an [`InboundMessage`]
//! and hands it to the runtime. The command core does the rest:
//!
//! ```text
//! ┌──────────┐   ┌────────────────┐   ┌──────────┐   ┌─────────────────┐   ┌─────────┐
//! │ Adapter  │──▶│ Prefix resolve │──▶│ Tokenize │──▶│ Registry lookup │──▶│ Handler │
//! └──────────┘   └────────────────┘   └──────────┘   │ + subcommands   │   └─────────┘
//!                                                    │ + permissions   │
//!                                                    └─────────────────┘
//! ```
//!
//! - **Core**: messages, places, permission specs and the prefix provider
//! - **Framework**: tokenizer, prefix candidates, registries, the dispatcher and plugins
//! - **Runtime**: configuration, logging and bootstrap
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use framed::prelude::*;
//!
//! async fn ping(ctx: CommandContext) -> bool {
//!     tracing::info!(args = ?ctx.args(), "pong");
//!     true
//! }
//!
//! fn register(r: &mut PluginRegistrar) {
//!     r.command(CommandBuilder::new("ping").alias("p").handler(ping));
//! }
//!
//! pub static INFO: PluginDescriptor = define_plugin! {
//!     id: "default.bot.info",
//!     name: "Info",
//!     register: register,
//! };
//! submit_plugin!(INFO);
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = FramedRuntime::new()?;
//!     runtime.register_manifest();
//!     runtime.start();
//!     // runtime.handle(&inbound).await for every message
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output
//! - `clap`: typed argument parsing with [`ParsedMessage::parse_args`](framework::ParsedMessage)

pub use framed_core as core;
pub use framed_framework as framework;
pub use framed_runtime as runtime;

pub use framed_core::InboundMessage;

// Macros expand to `$crate::...` paths inside framed-framework.
pub use framed_framework::{define_plugin, submit_plugin};

/// Commonly used types for writing plugins and bots.
///
/// ```rust,ignore
/// use framed::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use framed_runtime::{FramedRuntime, LoggingBuilder, SpanEvents};

    // Plugins
    pub use framed_framework::plugin::{PluginDescriptor, PluginRegistrar};
    pub use framed_framework::{define_plugin, submit_plugin};

    // Commands and handlers
    pub use framed_framework::{
        CommandBuilder, CommandContext, CommandHandler, Dispatcher, HandlerError, ParsedMessage,
    };

    #[cfg(feature = "clap")]
    pub use framed_framework::CommandArgs;

    // Messages and permissions
    pub use framed_core::{
        DiscordMessage, DiscordPermissions, InboundMessage, Member, Place, Platform,
        PlatformMessage, TwitchMessage, UserPermissions,
    };
}

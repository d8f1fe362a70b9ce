//! # Framed Core
//!
//! Foundation types shared by every layer of the Framed command framework.
//!
//! This crate deliberately knows nothing about parsing or dispatch. It
//! defines what crosses the boundary between a platform adapter and the
//! command core:
//!
//! - **Messages**: [`InboundMessage`] and the tagged [`PlatformMessage`]
//!   identity variants, with builders that refuse to invent missing data.
//! - **Places**: [`Place`] and [`Platform`], the scope a prefix is configured for.
//! - **Permissions**: [`UserPermissions`] specs and the [`PermissionEvaluator`]
//!   contract, plus [`DefaultPermissionEvaluator`].
//! - **Providers**: the [`PrefixProvider`] collaborator and an in-memory
//!   implementation.

pub mod error;
pub mod message;
pub mod permission;
pub mod provider;

pub use error::{MessageError, MessageResult};
pub use message::{
    DiscordMessage, DiscordMessageBuilder, InboundMessage, Member, Place, PlainMessage, Platform,
    PlatformMessage, TwitchMessage,
};
pub use permission::{
    DefaultPermissionEvaluator, DiscordPermissions, PermissionEvaluator, UserPermissions,
};
pub use provider::{MemoryPrefixProvider, PrefixProvider};

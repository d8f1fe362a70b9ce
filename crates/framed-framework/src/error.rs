//! Error types for the Framed framework.

use thiserror::Error;

/// Boxed error returned by command handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while registering commands, aliases and plugins.
///
/// These are reported to the log and the offending registration is skipped;
/// they never abort the rest of a load pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A command or subcommand with this id (case-insensitive) already exists.
    #[error("{scope}: id '{id}' already exists")]
    DuplicateId {
        /// The scope the registration targeted (plugin id or parent full id).
        scope: String,
        /// The normalized id.
        id: String,
    },

    /// The alias collides with an existing id or alias in the same scope.
    #[error("{scope}: alias '{alias}' collides with an existing id or alias")]
    DuplicateAlias {
        /// The scope the registration targeted.
        scope: String,
        /// The normalized alias.
        alias: String,
    },

    /// An alias was registered for an id that does not exist in the scope.
    #[error("{scope}: cannot alias unknown id '{id}'")]
    UnknownCommand {
        /// The scope the registration targeted.
        scope: String,
        /// The id the alias pointed at.
        id: String,
    },

    /// Two plugins with the same id were registered in one load pass.
    #[error("plugin '{id}' already exists")]
    DuplicatePlugin {
        /// The plugin id.
        id: String,
    },
}

/// Result type for registration operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

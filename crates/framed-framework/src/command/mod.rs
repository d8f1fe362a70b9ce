//! Command parsing and resolution.
//!
//! The pieces compose strictly forward:
//!
//! ```text
//! raw text ─ resolve_prefix ─ tokenize ─ ParsedMessage
//!          ─ RegistrySnapshot::lookup ─ resolve_subcommand_chain ─ handler
//! ```
//!
//! Tokenization, prefix matching and chain resolution are pure and
//! synchronous; only handler invocation may suspend.

pub mod descriptor;
pub mod parsed;
pub mod prefix;
pub mod registry;
pub mod resolve;
pub mod snapshot;
pub mod split;

pub use descriptor::{CommandBuilder, CommandDescriptor};
#[cfg(feature = "clap")]
pub use parsed::CommandArgs;
pub use parsed::ParsedMessage;
pub use prefix::{PrefixCandidates, PrefixMatch, resolve_prefix};
pub use registry::{CommandRegistry, CommandTable, normalize};
pub use resolve::{
    MAX_SUBCOMMAND_DEPTH, ResolveDiagnostic, SubcommandChain, resolve_subcommand_chain,
};
pub use snapshot::{CommandMatch, RegistryHandle, RegistrySnapshot, SnapshotBuilder};
pub use split::{Tokenized, Unterminated, strip_quotes, tokenize, tokenize_with_diagnostics};

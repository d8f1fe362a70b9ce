//! Subcommand chain resolution.
//!
//! Starting from a root command, successive argument tokens are matched
//! against the current descriptor's subcommands (ids first, then aliases).
//! Each match is appended to the chain and becomes the new current
//! descriptor. Resolution stops at the first token that does not match.
//!
//! At most [`MAX_SUBCOMMAND_DEPTH`] subcommands are accepted. If a further
//! match exists, it is rejected with a
//! [`ResolveDiagnostic::TooManyNestedSubcommands`] warning and the deepest
//! accepted subcommand stays final.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::descriptor::CommandDescriptor;

/// Maximum number of nested subcommand levels that can be dispatched to.
pub const MAX_SUBCOMMAND_DEPTH: usize = 3;

/// Non-fatal outcome reported by [`resolve_subcommand_chain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveDiagnostic {
    /// A subcommand matched below the maximum depth and was ignored.
    TooManyNestedSubcommands {
        /// Id of the deepest accepted descriptor, which runs instead.
        deepest: String,
        /// The argument token whose match was rejected.
        rejected: String,
    },
}

impl fmt::Display for ResolveDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyNestedSubcommands { deepest, rejected } => write!(
                f,
                "too many nested subcommands (max {MAX_SUBCOMMAND_DEPTH}); \
                 '{rejected}' ignored, '{deepest}' runs instead"
            ),
        }
    }
}

/// The resolved subcommand chain.
#[derive(Debug, Clone, Default)]
pub struct SubcommandChain {
    /// Matched subcommands, outermost first. Empty if none matched.
    pub chain: Vec<Arc<CommandDescriptor>>,
    /// Index into the argument list where unconsumed arguments begin.
    pub consumed: usize,
    pub diagnostic: Option<ResolveDiagnostic>,
}

impl SubcommandChain {
    /// The deepest matched subcommand, if any.
    pub fn last(&self) -> Option<&Arc<CommandDescriptor>> {
        self.chain.last()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Ids of the matched subcommands, outermost first.
    pub fn ids(&self) -> Vec<&str> {
        self.chain.iter().map(|d| d.id()).collect()
    }
}

/// Walks `args` down `root`'s subcommand tree.
pub fn resolve_subcommand_chain<S: AsRef<str>>(
    root: &CommandDescriptor,
    args: &[S],
) -> SubcommandChain {
    let mut chain: Vec<Arc<CommandDescriptor>> = Vec::new();
    let mut diagnostic = None;
    let mut current = root;

    for depth in 0..=MAX_SUBCOMMAND_DEPTH {
        let Some(token) = args.get(depth).map(AsRef::as_ref) else {
            break;
        };
        let Some(next) = current.subcommand(token) else {
            break;
        };

        if depth == MAX_SUBCOMMAND_DEPTH {
            let deepest = chain.last().map_or(root.id(), |d| d.id()).to_string();
            let diag = ResolveDiagnostic::TooManyNestedSubcommands {
                deepest,
                rejected: token.to_string(),
            };
            warn!(command = %root.id(), "{diag}");
            diagnostic = Some(diag);
            break;
        }

        chain.push(Arc::clone(next));
        current = next;
    }

    SubcommandChain {
        consumed: chain.len(),
        chain,
        diagnostic,
    }
}

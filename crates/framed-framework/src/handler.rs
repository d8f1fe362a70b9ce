//! Command handlers.
//!
//! Handlers are async functions or closures taking a [`CommandContext`]. Their
//! return value is converted into a success/failure outcome through
//! [`IntoOutcome`]:
//!
//! - `()` always succeeds.
//! - `bool` reports success directly.
//! - `Option<T>` succeeds on `None`, otherwise defers to `T`.
//! - `Result<T, E>` defers to `T` on `Ok`; `Err` is a failure.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn ping(ctx: CommandContext) -> Result<(), HandlerError> {
//!     reply(ctx.message(), "pong").await?;
//!     Ok(())
//! }
//!
//! CommandBuilder::new("ping").handler(ping)
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use framed_core::{PermissionEvaluator, UserPermissions};

use crate::command::{CommandDescriptor, ParsedMessage};
use crate::error::HandlerError;

// ============================================================================
// IntoOutcome
// ============================================================================

/// Converts a handler return value into a dispatch outcome.
pub trait IntoOutcome: Send {
    fn into_outcome(self) -> Result<(), HandlerError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl IntoOutcome for bool {
    fn into_outcome(self) -> Result<(), HandlerError> {
        if self {
            Ok(())
        } else {
            Err("handler reported failure".into())
        }
    }
}

impl<T: IntoOutcome> IntoOutcome for Option<T> {
    fn into_outcome(self) -> Result<(), HandlerError> {
        self.map_or(Ok(()), IntoOutcome::into_outcome)
    }
}

impl<T: IntoOutcome, E: fmt::Display + Send> IntoOutcome for Result<T, E> {
    fn into_outcome(self) -> Result<(), HandlerError> {
        match self {
            Ok(t) => t.into_outcome(),
            Err(e) => Err(e.to_string().into()),
        }
    }
}

// ============================================================================
// CommandHandler
// ============================================================================

/// An invocable command handler.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn call(&self, ctx: CommandContext) -> Result<(), HandlerError>;
}

/// Type-erased handler stored on descriptors.
pub type BoxedHandler = Arc<dyn CommandHandler>;

/// Adapts an async function or closure into a [`CommandHandler`].
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut, R> CommandHandler for HandlerFn<F>
where
    F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + 'static,
{
    async fn call(&self, ctx: CommandContext) -> Result<(), HandlerError> {
        (self.f)(ctx).await.into_outcome()
    }
}

// ============================================================================
// CommandContext
// ============================================================================

/// Everything a handler gets to see about the invocation.
#[derive(Clone)]
pub struct CommandContext {
    message: Arc<ParsedMessage>,
    root: Arc<CommandDescriptor>,
    chain: Arc<[Arc<CommandDescriptor>]>,
    plugin_id: Arc<str>,
    permissions: Arc<dyn PermissionEvaluator>,
}

impl CommandContext {
    /// `message` must already be the subcommand view (see
    /// [`ParsedMessage::for_subcommand`]).
    pub fn new(
        message: ParsedMessage,
        root: Arc<CommandDescriptor>,
        chain: Vec<Arc<CommandDescriptor>>,
        plugin_id: Arc<str>,
        permissions: Arc<dyn PermissionEvaluator>,
    ) -> Self {
        Self {
            message: Arc::new(message),
            root,
            chain: chain.into(),
            plugin_id,
            permissions,
        }
    }

    pub fn message(&self) -> &ParsedMessage {
        &self.message
    }

    /// Remaining arguments after all consumed command and subcommand tokens.
    pub fn args(&self) -> &[String] {
        self.message.args()
    }

    /// The descriptor being executed: the deepest subcommand, or the root.
    pub fn command(&self) -> &Arc<CommandDescriptor> {
        self.chain.last().unwrap_or(&self.root)
    }

    pub fn root(&self) -> &Arc<CommandDescriptor> {
        &self.root
    }

    /// Matched subcommands, outermost first.
    pub fn chain(&self) -> &[Arc<CommandDescriptor>] {
        &self.chain
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// Ids from the root down to the executed descriptor.
    pub fn subcommand_path(&self) -> Vec<&str> {
        std::iter::once(self.root.id())
            .chain(self.chain.iter().map(|d| d.id()))
            .collect()
    }

    /// `{plugin}.command.{root}[.subcommand.{id}]*`
    pub fn full_id(&self) -> String {
        let mut id = format!("{}.command.{}", self.plugin_id, self.root.id());
        for sub in self.chain.iter() {
            id.push_str(".subcommand.");
            id.push_str(sub.id());
        }
        id
    }

    /// The permission spec that applies: the nearest one declared walking
    /// from the executed descriptor back to the root.
    pub fn effective_permissions(&self) -> Option<&UserPermissions> {
        self.chain
            .iter()
            .rev()
            .chain(std::iter::once(&self.root))
            .find_map(|d| d.permissions())
    }

    /// Evaluates [`effective_permissions`](Self::effective_permissions)
    /// against the message author.
    pub fn has_permission(&self) -> bool {
        self.permissions
            .has_permission(self.message.source(), self.effective_permissions())
    }

    /// Evaluates an arbitrary spec against the message author.
    pub fn has_permission_for(&self, spec: Option<&UserPermissions>) -> bool {
        self.permissions.has_permission(self.message.source(), spec)
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("plugin_id", &self.plugin_id)
            .field("path", &self.subcommand_path())
            .field("args", &self.message.args())
            .finish()
    }
}

//! Command and subcommand descriptors.
//!
//! A [`CommandDescriptor`] is created once through a [`CommandBuilder`] during
//! plugin load and never mutated afterwards. Subcommands share the same shape
//! and live in their parent's subcommand [`CommandTable`], so a subcommand
//! can own further subcommands.
//!
//! # Example
//!
//! ```rust,ignore
//! let group = CommandBuilder::new("group")
//!     .aliases(["grp"])
//!     .about("Manages custom groups.")
//!     .subcommand(
//!         CommandBuilder::new("add")
//!             .aliases(["a", "create"])
//!             .handler(group_add),
//!     )
//!     .handler(group_help)
//!     .build();
//! ```

use std::fmt;
use std::sync::Arc;

use framed_core::UserPermissions;
use tracing::trace;

use super::registry::{CommandTable, normalize};
use crate::error::RegistryResult;
use crate::handler::{BoxedHandler, CommandHandler, HandlerFn, IntoOutcome};

/// A frozen command or subcommand.
pub struct CommandDescriptor {
    id: String,
    aliases: Vec<String>,
    prefixes: Vec<String>,
    group: Option<String>,
    about: Option<String>,
    description: Option<String>,
    usage: Option<String>,
    examples: Option<String>,
    notes: Option<String>,
    hide_usage_in_help: bool,
    permissions: Option<UserPermissions>,
    handler: Option<BoxedHandler>,
    subcommands: CommandTable,
}

impl CommandDescriptor {
    /// The normalized (lowercase) id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Normalized aliases. Once the descriptor is registered, aliases that
    /// collided in its scope have been removed.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub(super) fn aliases_mut(&mut self) -> &mut Vec<String> {
        &mut self.aliases
    }

    /// Explicit per-command override prefixes.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// The help group, if one was set explicitly.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn examples(&self) -> Option<&str> {
        self.examples.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn hide_usage_in_help(&self) -> bool {
        self.hide_usage_in_help
    }

    /// The permission spec declared on this descriptor itself.
    pub fn permissions(&self) -> Option<&UserPermissions> {
        self.permissions.as_ref()
    }

    pub fn handler(&self) -> Option<&BoxedHandler> {
        self.handler.as_ref()
    }

    /// This descriptor's subcommand scope.
    pub fn subcommands(&self) -> &CommandTable {
        &self.subcommands
    }

    /// Looks up a direct subcommand by id, then by alias.
    pub fn subcommand(&self, name: &str) -> Option<&Arc<CommandDescriptor>> {
        self.subcommands.lookup(name)
    }

    /// Number of subcommand levels below this descriptor (0 if none).
    pub fn nesting_depth(&self) -> usize {
        self.subcommands
            .iter()
            .map(|sub| 1 + sub.nesting_depth())
            .max()
            .unwrap_or(0)
    }

    /// Returns `true` if the descriptor accepts `prefix` as one of its own
    /// override prefixes.
    pub fn has_override_prefix(&self, prefix: &str) -> bool {
        self.prefixes.iter().any(|p| p == prefix)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("id", &self.id)
            .field("aliases", &self.aliases)
            .field("prefixes", &self.prefixes)
            .field("has_handler", &self.handler.is_some())
            .field("subcommands", &self.subcommands.ids().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// CommandBuilder
// ============================================================================

/// Mutable builder stage for a [`CommandDescriptor`].
pub struct CommandBuilder {
    id: String,
    aliases: Vec<String>,
    prefixes: Vec<String>,
    group: Option<String>,
    about: Option<String>,
    description: Option<String>,
    usage: Option<String>,
    examples: Option<String>,
    notes: Option<String>,
    hide_usage_in_help: bool,
    permissions: Option<UserPermissions>,
    handler: Option<BoxedHandler>,
    subcommands: CommandTable,
}

impl CommandBuilder {
    /// Starts a builder. The id is normalized to lowercase.
    pub fn new(id: impl AsRef<str>) -> Self {
        let id = normalize(id.as_ref());
        Self {
            subcommands: CommandTable::new(id.clone()),
            id,
            aliases: Vec::new(),
            prefixes: Vec::new(),
            group: None,
            about: None,
            description: None,
            usage: None,
            examples: None,
            notes: None,
            hide_usage_in_help: false,
            permissions: None,
            handler: None,
        }
    }

    /// The normalized id this builder will produce.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn alias(mut self, alias: impl AsRef<str>) -> Self {
        self.aliases.push(normalize(alias.as_ref()));
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.aliases
            .extend(aliases.into_iter().map(|a| normalize(a.as_ref())));
        self
    }

    /// Adds an override prefix that triggers this command.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn examples(mut self, examples: impl Into<String>) -> Self {
        self.examples = Some(examples.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn hide_usage_in_help(mut self, hide: bool) -> Self {
        self.hide_usage_in_help = hide;
        self
    }

    pub fn permissions(mut self, permissions: UserPermissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Sets the handler from an async function or closure.
    pub fn handler<F, Fut, R>(self, f: F) -> Self
    where
        F: Fn(crate::handler::CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoOutcome + 'static,
    {
        self.handler_boxed(Arc::new(HandlerFn::new(f)))
    }

    /// Sets the handler from a [`CommandHandler`] implementation.
    pub fn handler_impl<H: CommandHandler + 'static>(self, handler: H) -> Self {
        self.handler_boxed(Arc::new(handler))
    }

    fn handler_boxed(mut self, handler: BoxedHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Adds a subcommand. Collisions are logged and the subcommand is skipped.
    pub fn subcommand(mut self, sub: CommandBuilder) -> Self {
        let _ = self.register_subcommand(sub);
        self
    }

    /// Registers a subcommand into this builder's scope.
    ///
    /// Fails with `DuplicateId` or leaves individual aliases out (logged)
    /// exactly like plugin-level registration.
    pub fn register_subcommand(&mut self, sub: CommandBuilder) -> RegistryResult<()> {
        self.subcommands.register_command(sub.build())
    }

    /// Registers an extra alias for an existing subcommand of this builder.
    pub fn register_subcommand_alias(
        &mut self,
        alias: impl AsRef<str>,
        subcommand_id: impl AsRef<str>,
    ) -> RegistryResult<()> {
        self.subcommands
            .register_alias(alias.as_ref(), subcommand_id.as_ref())
    }

    /// Freezes the builder.
    pub fn build(self) -> CommandDescriptor {
        trace!(command = %self.id, subcommands = self.subcommands.len(), "Command built");
        CommandDescriptor {
            id: self.id,
            aliases: self.aliases,
            prefixes: self.prefixes,
            group: self.group,
            about: self.about,
            description: self.description,
            usage: self.usage,
            examples: self.examples,
            notes: self.notes,
            hide_usage_in_help: self.hide_usage_in_help,
            permissions: self.permissions,
            handler: self.handler,
            subcommands: self.subcommands,
        }
    }

    /// Sets the group only if none was set explicitly.
    pub(crate) fn default_group(mut self, group: Option<&str>) -> Self {
        if self.group.is_none() {
            self.group = Some(group.unwrap_or("Other").to_string());
        }
        self
    }
}

impl fmt::Debug for CommandBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuilder")
            .field("id", &self.id)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;

    #[test]
    fn test_builder_normalizes_id_and_aliases() {
        let cmd = CommandBuilder::new("EditGrp")
            .aliases(["EditGroup", "changegrp"])
            .build();
        assert_eq!(cmd.id(), "editgrp");
        assert_eq!(cmd.aliases(), ["editgroup", "changegrp"]);
    }

    #[test]
    fn test_subcommand_lookup_by_alias() {
        let cmd = CommandBuilder::new("group")
            .subcommand(CommandBuilder::new("add").aliases(["a", "create"]))
            .build();
        assert_eq!(cmd.subcommand("add").unwrap().id(), "add");
        assert_eq!(cmd.subcommand("CREATE").unwrap().id(), "add");
        assert!(cmd.subcommand("remove").is_none());
    }

    #[test]
    fn test_duplicate_subcommand_rejected() {
        let mut builder = CommandBuilder::new("group");
        builder
            .register_subcommand(CommandBuilder::new("add"))
            .unwrap();
        let err = builder
            .register_subcommand(CommandBuilder::new("ADD").alias("plus"))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateId {
                scope: "group".into(),
                id: "add".into()
            }
        );
        let cmd = builder.build();
        assert_eq!(cmd.subcommands().len(), 1);
        assert!(cmd.subcommand("plus").is_none());
    }

    #[test]
    fn test_subcommand_alias_collision() {
        let mut builder = CommandBuilder::new("group")
            .subcommand(CommandBuilder::new("add"))
            .subcommand(CommandBuilder::new("remove"));
        assert!(matches!(
            builder.register_subcommand_alias("add", "remove"),
            Err(RegistryError::DuplicateAlias { .. })
        ));
        builder.register_subcommand_alias("rm", "remove").unwrap();
        assert_eq!(builder.build().subcommand("rm").unwrap().id(), "remove");
    }

    #[test]
    fn test_nesting_depth() {
        let cmd = CommandBuilder::new("a")
            .subcommand(
                CommandBuilder::new("b")
                    .subcommand(CommandBuilder::new("c").subcommand(CommandBuilder::new("d"))),
            )
            .subcommand(CommandBuilder::new("e"))
            .build();
        assert_eq!(cmd.nesting_depth(), 3);
        assert_eq!(CommandBuilder::new("x").build().nesting_depth(), 0);
    }

    #[test]
    fn test_default_group() {
        let cmd = CommandBuilder::new("x").default_group(None).build();
        assert_eq!(cmd.group(), Some("Other"));
        let cmd = CommandBuilder::new("x")
            .group("Fun")
            .default_group(Some("Info"))
            .build();
        assert_eq!(cmd.group(), Some("Fun"));
    }
}

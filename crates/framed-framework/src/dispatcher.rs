//! Command dispatcher.
//!
//! The [`Dispatcher`] composes prefix resolution, tokenization, registry
//! lookup and subcommand resolution, then runs the selected handler.
//!
//! For every message:
//!
//! 1. The candidate prefixes are assembled: override prefixes of all loaded
//!    commands, the place prefix (or platform default), mention forms, and the
//!    global default.
//! 2. The message is parsed and the command looked up in the current snapshot.
//! 3. The matched prefix must be one the command accepts: one of its own
//!    override prefixes or a general prefix for the place.
//! 4. The subcommand chain is resolved and the deepest match selected.
//! 5. The nearest permission spec on the chain is checked, unless it opts
//!    out of automatic checking.
//! 6. The handler runs. Errors and panics are logged and reported as `false`.
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::new(registry)
//!     .with_prefix_provider(provider)
//!     .with_permissions(DefaultPermissionEvaluator::new().with_owners(["1"]));
//!
//! let ran = dispatcher.handle(&inbound).await;
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use framed_core::{
    DefaultPermissionEvaluator, InboundMessage, MemoryPrefixProvider, PermissionEvaluator, Place,
    Platform, PrefixProvider, UserPermissions,
};
use futures::FutureExt;
use tracing::{Instrument, debug, debug_span, error, info, trace};

use crate::command::{
    ParsedMessage, PrefixCandidates, RegistryHandle, RegistrySnapshot, resolve_subcommand_chain,
};
use crate::handler::CommandContext;

// ============================================================================
// DenialHook
// ============================================================================

/// Reports that a permission check failed.
pub trait DenialHook: Send + Sync {
    fn on_denied(&self, ctx: &CommandContext, spec: &UserPermissions);
}

/// The default [`DenialHook`]: logs and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDenial;

impl DenialHook for LogDenial {
    fn on_denied(&self, ctx: &CommandContext, _spec: &UserPermissions) {
        info!(
            command = %ctx.full_id(),
            author = %ctx.message().source().author_id(),
            "Permission denied"
        );
    }
}

impl<F> DenialHook for F
where
    F: Fn(&CommandContext, &UserPermissions) + Send + Sync,
{
    fn on_denied(&self, ctx: &CommandContext, spec: &UserPermissions) {
        self(ctx, spec)
    }
}

// ============================================================================
// PrefixDefaults
// ============================================================================

/// Fallback prefixes used when a place has none configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixDefaults {
    /// Global default, always a candidate.
    pub default: String,
    pub discord: Option<String>,
    pub twitch: Option<String>,
    /// Discord bot user id; enables the `<@id>` / `<@!id>` mention prefixes.
    pub bot_user_id: Option<String>,
}

impl Default for PrefixDefaults {
    fn default() -> Self {
        Self {
            default: "!".to_string(),
            discord: None,
            twitch: None,
            bot_user_id: None,
        }
    }
}

impl PrefixDefaults {
    /// The prefix a place of `platform` uses when it has none configured.
    pub fn for_platform(&self, platform: Platform) -> &str {
        let specific = match platform {
            Platform::Discord => self.discord.as_deref(),
            Platform::Twitch => self.twitch.as_deref(),
            Platform::None => None,
        };
        specific.unwrap_or(&self.default)
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Parses inbound messages and invokes the matching command handler.
///
/// Cloning is cheap; clones share the registry handle and collaborators.
#[derive(Clone)]
pub struct Dispatcher {
    registry: RegistryHandle,
    prefixes: Arc<dyn PrefixProvider>,
    permissions: Arc<dyn PermissionEvaluator>,
    denial: Arc<dyn DenialHook>,
    defaults: PrefixDefaults,
}

impl Dispatcher {
    /// Creates a dispatcher reading from `registry`, with an empty in-memory
    /// prefix provider, the default permission evaluator and [`LogDenial`].
    pub fn new(registry: RegistryHandle) -> Self {
        Self {
            registry,
            prefixes: Arc::new(MemoryPrefixProvider::new()),
            permissions: Arc::new(DefaultPermissionEvaluator::new()),
            denial: Arc::new(LogDenial),
            defaults: PrefixDefaults::default(),
        }
    }

    pub fn with_prefix_provider(mut self, provider: Arc<dyn PrefixProvider>) -> Self {
        self.prefixes = provider;
        self
    }

    pub fn with_permissions(mut self, evaluator: impl PermissionEvaluator + 'static) -> Self {
        self.permissions = Arc::new(evaluator);
        self
    }

    pub fn with_denial_hook(mut self, hook: impl DenialHook + 'static) -> Self {
        self.denial = Arc::new(hook);
        self
    }

    pub fn with_prefix_defaults(mut self, defaults: PrefixDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn prefix_defaults(&self) -> &PrefixDefaults {
        &self.defaults
    }

    /// Publishes a new snapshot. In-flight dispatches finish on the old one.
    pub fn swap_registry(&self, snapshot: RegistrySnapshot) -> Arc<RegistrySnapshot> {
        self.registry.store(snapshot)
    }

    /// The prefixes any command accepts in `place`, in resolution order.
    pub fn general_prefixes(&self, place: &Place) -> PrefixCandidates {
        let place_prefix = self
            .prefixes
            .lookup(&place.id)
            .unwrap_or_else(|| self.defaults.for_platform(place.platform).to_string());

        let mention = match place.platform {
            Platform::Discord => self.defaults.bot_user_id.as_deref(),
            _ => None,
        };

        PrefixCandidates::new()
            .with_place(Some(place_prefix))
            .with_mention(mention)
            .with_default(self.defaults.default.as_str())
    }

    /// Every prefix candidate for `place`: command overrides first, then the
    /// general prefixes.
    pub fn candidates(&self, place: &Place) -> PrefixCandidates {
        self.candidates_in(&self.registry.load(), place)
    }

    fn candidates_in(&self, snapshot: &RegistrySnapshot, place: &Place) -> PrefixCandidates {
        let mut candidates =
            PrefixCandidates::new().with_overrides(snapshot.override_prefixes().iter().cloned());
        candidates.extend(self.general_prefixes(place));
        candidates
    }

    /// Parses `inbound` against the current candidates.
    pub fn parse(&self, inbound: &InboundMessage) -> ParsedMessage {
        let candidates = self.candidates(&inbound.place());
        ParsedMessage::parse(inbound, candidates.as_slice())
    }

    /// Parses and dispatches `inbound`.
    pub async fn handle(&self, inbound: &InboundMessage) -> bool {
        let snapshot = self.registry.load();
        let candidates = self.candidates_in(&snapshot, &inbound.place());
        let parsed = ParsedMessage::parse(inbound, candidates.as_slice());
        self.dispatch_in(&snapshot, &parsed).await
    }

    /// Dispatches an already parsed message.
    ///
    /// Returns `true` iff a handler ran and reported success.
    pub async fn dispatch(&self, msg: &ParsedMessage) -> bool {
        let snapshot = self.registry.load();
        self.dispatch_in(&snapshot, msg).await
    }

    async fn dispatch_in(&self, snapshot: &RegistrySnapshot, msg: &ParsedMessage) -> bool {
        let (Some(prefix), Some(name)) = (msg.prefix(), msg.command_name()) else {
            trace!("Not a command");
            return false;
        };

        let Some(found) = snapshot.lookup(name) else {
            debug!(command = %name, "Unknown command");
            return false;
        };
        let root = found.command;

        if !root.has_override_prefix(prefix) && !self.general_prefixes(&msg.place()).contains(prefix)
        {
            debug!(command = %name, prefix = %prefix, "Prefix not accepted by command");
            return false;
        }

        let resolved = resolve_subcommand_chain(&root, msg.args());
        let target = resolved.last().cloned().unwrap_or_else(|| Arc::clone(&root));
        let Some(handler) = target.handler().cloned() else {
            debug!(command = %target.id(), "Command has no handler");
            return false;
        };

        let ctx = CommandContext::new(
            msg.for_subcommand(resolved.consumed),
            root,
            resolved.chain,
            found.plugin_id,
            Arc::clone(&self.permissions),
        );

        if let Some(spec) = ctx.effective_permissions() {
            if spec.check_automatically && !ctx.has_permission() {
                self.denial.on_denied(&ctx, spec);
                return false;
            }
        }

        let full_id = ctx.full_id();
        let span = debug_span!("dispatch", command = %full_id);
        let outcome = AssertUnwindSafe(handler.call(ctx))
            .catch_unwind()
            .instrument(span)
            .await;

        match outcome {
            Ok(Ok(())) => {
                debug!(command = %full_id, "Command finished");
                true
            }
            Ok(Err(e)) => {
                error!(command = %full_id, "Command failed: {e}");
                false
            }
            Err(panic) => {
                error!(command = %full_id, "Command panicked: {}", panic_message(&*panic));
                false
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

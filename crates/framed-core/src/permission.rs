//! Permission specifications and evaluation.
//!
//! A command may declare a [`UserPermissions`] spec. Before its handler runs,
//! the dispatcher asks a [`PermissionEvaluator`] whether the message author
//! satisfies it. The core only depends on the boolean contract; the
//! platform-specific bypass rules live in the evaluator implementation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::message::PlatformMessage;

/// Permission requirements declared by a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissions {
    /// Whether the dispatcher checks the spec before invoking the handler.
    ///
    /// When `false` the handler is expected to call
    /// `CommandContext::has_permission` itself.
    #[serde(default = "default_check_automatically")]
    pub check_automatically: bool,

    /// Discord requirements. An empty section means only owners and admins
    /// may run the command.
    #[serde(default)]
    pub discord: Option<DiscordPermissions>,
}

fn default_check_automatically() -> bool {
    true
}

impl Default for UserPermissions {
    fn default() -> Self {
        Self {
            check_automatically: true,
            discord: None,
        }
    }
}

impl UserPermissions {
    /// Creates a spec that only the bot owners and admins satisfy.
    pub fn owner_only() -> Self {
        Self::default()
    }

    /// Creates a spec with the given Discord requirements.
    pub fn discord(discord: DiscordPermissions) -> Self {
        Self {
            discord: Some(discord),
            ..Self::default()
        }
    }

    /// Disables the automatic check.
    pub fn manual(mut self) -> Self {
        self.check_automatically = false;
        self
    }
}

/// Discord-specific allow-lists.
///
/// Checked in order: users, permissions, roles. Any hit grants access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordPermissions {
    #[serde(default)]
    pub users: Vec<String>,
    /// Permission names the member must all hold. Defaults to
    /// `ADMINISTRATOR` when empty.
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl DiscordPermissions {
    pub fn users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users.extend(users.into_iter().map(Into::into));
        self
    }

    pub fn permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }
}

// ============================================================================
// PermissionEvaluator
// ============================================================================

/// Decides whether the author of a message satisfies a permission spec.
///
/// Implementations must return `true` when `spec` is `None`.
pub trait PermissionEvaluator: Send + Sync {
    fn has_permission(&self, msg: &PlatformMessage, spec: Option<&UserPermissions>) -> bool;
}

impl<F> PermissionEvaluator for F
where
    F: Fn(&PlatformMessage, Option<&UserPermissions>) -> bool + Send + Sync,
{
    fn has_permission(&self, msg: &PlatformMessage, spec: Option<&UserPermissions>) -> bool {
        self(msg, spec)
    }
}

/// Evaluator implementing the standard owner/admin/allow-list rules.
#[derive(Debug, Clone, Default)]
pub struct DefaultPermissionEvaluator {
    owners: HashSet<String>,
    admins: HashSet<String>,
}

impl DefaultPermissionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds bot owners; owners bypass every spec.
    pub fn with_owners<I, S>(mut self, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.owners.extend(owners.into_iter().map(Into::into));
        self
    }

    /// Adds bot admins; admins bypass every spec.
    pub fn with_admins<I, S>(mut self, admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.admins.extend(admins.into_iter().map(Into::into));
        self
    }
}

impl PermissionEvaluator for DefaultPermissionEvaluator {
    fn has_permission(&self, msg: &PlatformMessage, spec: Option<&UserPermissions>) -> bool {
        let Some(spec) = spec else {
            return true;
        };

        match msg {
            PlatformMessage::Discord(discord) => {
                if self.owners.contains(discord.author_id())
                    || self.admins.contains(discord.author_id())
                {
                    return true;
                }

                let Some(required) = &spec.discord else {
                    return false;
                };

                if required.users.iter().any(|u| u == discord.author_id()) {
                    return true;
                }

                let Some(member) = discord.member() else {
                    return false;
                };

                let has_permissions = if required.permissions.is_empty() {
                    member.has_permission("ADMINISTRATOR")
                } else {
                    required
                        .permissions
                        .iter()
                        .all(|p| member.has_permission(p))
                };

                has_permissions || required.roles.iter().any(|r| member.has_role(r))
            }
            PlatformMessage::Twitch(_) => {
                warn!("Twitch permissions are not implemented; allowing");
                true
            }
            PlatformMessage::Plain(plain) => {
                self.owners.contains(plain.author_id()) || self.admins.contains(plain.author_id())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{DiscordMessage, Member, TwitchMessage};

    fn discord(author: &str, member: Option<Member>) -> PlatformMessage {
        let mut builder = DiscordMessage::builder()
            .channel_id("chan")
            .author_id(author)
            .guild_id("guild");
        if let Some(member) = member {
            builder = builder.member(member);
        }
        PlatformMessage::Discord(builder.build().unwrap())
    }

    #[test]
    fn test_absent_spec_always_allows() {
        let eval = DefaultPermissionEvaluator::new();
        assert!(eval.has_permission(&discord("1", None), None));
        assert!(eval.has_permission(&PlatformMessage::plain("c", "a").unwrap(), None));
    }

    #[test]
    fn test_owner_and_admin_bypass() {
        let eval = DefaultPermissionEvaluator::new()
            .with_owners(["owner"])
            .with_admins(["admin"]);
        let spec = UserPermissions::owner_only();
        assert!(eval.has_permission(&discord("owner", None), Some(&spec)));
        assert!(eval.has_permission(&discord("admin", None), Some(&spec)));
        assert!(!eval.has_permission(&discord("someone", None), Some(&spec)));
    }

    #[test]
    fn test_user_allow_list() {
        let eval = DefaultPermissionEvaluator::new();
        let spec = UserPermissions::discord(DiscordPermissions::default().users(["7"]));
        assert!(eval.has_permission(&discord("7", None), Some(&spec)));
        assert!(!eval.has_permission(&discord("8", None), Some(&spec)));
    }

    #[test]
    fn test_permissions_default_to_administrator() {
        let eval = DefaultPermissionEvaluator::new();
        let spec = UserPermissions::discord(DiscordPermissions::default());
        let plain_member = Member {
            roles: vec![],
            permissions: vec!["SEND_MESSAGES".into()],
        };
        let admin_member = Member {
            roles: vec![],
            permissions: vec!["ADMINISTRATOR".into()],
        };
        assert!(!eval.has_permission(&discord("1", Some(plain_member)), Some(&spec)));
        assert!(eval.has_permission(&discord("1", Some(admin_member)), Some(&spec)));
    }

    #[test]
    fn test_role_grants_when_permissions_missing() {
        let eval = DefaultPermissionEvaluator::new();
        let spec = UserPermissions::discord(
            DiscordPermissions::default()
                .permissions(["MANAGE_GUILD"])
                .roles(["mods"]),
        );
        let member = Member {
            roles: vec!["mods".into()],
            permissions: vec![],
        };
        assert!(eval.has_permission(&discord("1", Some(member)), Some(&spec)));
        assert!(!eval.has_permission(&discord("1", Some(Member::default())), Some(&spec)));
    }

    #[test]
    fn test_twitch_allows() {
        let eval = DefaultPermissionEvaluator::new();
        let msg = PlatformMessage::Twitch(TwitchMessage::new("chan", "1").unwrap());
        assert!(eval.has_permission(&msg, Some(&UserPermissions::owner_only())));
    }

    #[test]
    fn test_closure_evaluator() {
        let deny_all = |_: &PlatformMessage, spec: Option<&UserPermissions>| spec.is_none();
        let msg = PlatformMessage::plain("c", "a").unwrap();
        assert!(deny_all.has_permission(&msg, None));
        assert!(!deny_all.has_permission(&msg, Some(&UserPermissions::default())));
    }
}

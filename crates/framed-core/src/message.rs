//! Platform message types.
//!
//! Adapters translate whatever their chat platform delivers into an
//! [`InboundMessage`]: the raw text content plus a [`PlatformMessage`] that
//! carries the author/channel identity. The command core only ever reads the
//! content; the identity is handed through untouched to permission
//! evaluators and handlers, which match on the variant exhaustively.
//!
//! # Example
//!
//! ```rust
//! use framed_core::{DiscordMessage, InboundMessage, PlatformMessage};
//!
//! let source = DiscordMessage::builder()
//!     .channel_id("100")
//!     .author_id("42")
//!     .guild_id("7")
//!     .build()
//!     .unwrap();
//!
//! let msg = InboundMessage::new("!ping", PlatformMessage::Discord(source));
//! assert_eq!(msg.place().id, "7");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MessageError, MessageResult};

// ============================================================================
// Platform / Place
// ============================================================================

/// The chat platform a message originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// A Discord-like platform (guilds, members, roles).
    Discord,
    /// A Twitch-like platform (channels, chatters).
    Twitch,
    /// Any other platform, or no platform at all.
    #[default]
    None,
}

impl Platform {
    /// Returns the lowercase platform name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discord => "discord",
            Self::Twitch => "twitch",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An addressable scope that may carry its own prefix configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Place {
    /// Platform-specific identifier (guild id, channel name, ...).
    pub id: String,
    /// Platform the place lives on.
    pub platform: Platform,
}

impl Place {
    /// Creates a new place.
    pub fn new(id: impl Into<String>, platform: Platform) -> Self {
        Self {
            id: id.into(),
            platform,
        }
    }

    /// The place used when no real place can be determined.
    pub fn fallback() -> Self {
        Self::new("default", Platform::None)
    }
}

// ============================================================================
// Discord
// ============================================================================

/// Guild membership data attached to a Discord message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Member {
    /// Role ids held by the member.
    pub roles: Vec<String>,
    /// Permission names granted to the member (e.g. `"MANAGE_MESSAGES"`).
    pub permissions: Vec<String>,
}

impl Member {
    /// Returns `true` if the member holds the named permission.
    ///
    /// `ADMINISTRATOR` implies every other permission.
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p.eq_ignore_ascii_case(name) || p.eq_ignore_ascii_case("ADMINISTRATOR"))
    }

    /// Returns `true` if the member holds the given role.
    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.iter().any(|r| r == role_id)
    }
}

/// Identity data for a message received from a Discord-like platform.
///
/// Only constructible through [`DiscordMessage::builder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordMessage {
    message_id: Option<String>,
    channel_id: String,
    author_id: String,
    guild_id: Option<String>,
    member: Option<Member>,
}

impl DiscordMessage {
    /// Starts building a Discord message.
    pub fn builder() -> DiscordMessageBuilder {
        DiscordMessageBuilder::default()
    }

    /// Message id, if the adapter knows it.
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Channel the message was sent in.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// User who sent the message.
    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    /// Guild the channel belongs to; `None` for direct messages.
    pub fn guild_id(&self) -> Option<&str> {
        self.guild_id.as_deref()
    }

    /// Guild membership of the author; `None` for direct messages.
    pub fn member(&self) -> Option<&Member> {
        self.member.as_ref()
    }
}

/// Builder for [`DiscordMessage`].
///
/// `channel_id` and `author_id` are mandatory and must be non-empty;
/// [`build`](Self::build) fails with [`MessageError::MissingRequiredField`]
/// instead of inventing values.
#[derive(Debug, Clone, Default)]
pub struct DiscordMessageBuilder {
    message_id: Option<String>,
    channel_id: Option<String>,
    author_id: Option<String>,
    guild_id: Option<String>,
    member: Option<Member>,
}

impl DiscordMessageBuilder {
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn channel_id(mut self, id: impl Into<String>) -> Self {
        self.channel_id = Some(id.into());
        self
    }

    pub fn author_id(mut self, id: impl Into<String>) -> Self {
        self.author_id = Some(id.into());
        self
    }

    pub fn guild_id(mut self, id: impl Into<String>) -> Self {
        self.guild_id = Some(id.into());
        self
    }

    pub fn member(mut self, member: Member) -> Self {
        self.member = Some(member);
        self
    }

    /// Finishes the builder.
    pub fn build(self) -> MessageResult<DiscordMessage> {
        let channel_id = self
            .channel_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MessageError::missing("discord", "channel_id"))?;
        let author_id = self
            .author_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MessageError::missing("discord", "author_id"))?;

        Ok(DiscordMessage {
            message_id: self.message_id,
            channel_id,
            author_id,
            guild_id: self.guild_id,
            member: self.member,
        })
    }
}

// ============================================================================
// Twitch
// ============================================================================

/// Identity data for a message received from a Twitch-like platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwitchMessage {
    channel: String,
    user_id: String,
    user_name: Option<String>,
}

impl TwitchMessage {
    /// Creates a Twitch message, rejecting empty identity fields.
    pub fn new(channel: impl Into<String>, user_id: impl Into<String>) -> MessageResult<Self> {
        let channel = channel.into();
        let user_id = user_id.into();
        if channel.is_empty() {
            return Err(MessageError::missing("twitch", "channel"));
        }
        if user_id.is_empty() {
            return Err(MessageError::missing("twitch", "user_id"));
        }
        Ok(Self {
            channel,
            user_id,
            user_name: None,
        })
    }

    /// Sets the chatter's display name.
    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    /// Channel name the message was sent to.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Numeric user id of the chatter.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Display name of the chatter, if known.
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }
}

// ============================================================================
// Plain
// ============================================================================

/// Identity data for a platform without special permission rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainMessage {
    channel_id: String,
    author_id: String,
}

impl PlainMessage {
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }
}

// ============================================================================
// PlatformMessage / InboundMessage
// ============================================================================

/// Platform-specific identity of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformMessage {
    Discord(DiscordMessage),
    Twitch(TwitchMessage),
    /// Any platform without special permission rules.
    Plain(PlainMessage),
}

impl PlatformMessage {
    /// Creates a plain platform message, rejecting empty identity fields.
    pub fn plain(
        channel_id: impl Into<String>,
        author_id: impl Into<String>,
    ) -> MessageResult<Self> {
        let channel_id = channel_id.into();
        let author_id = author_id.into();
        if channel_id.is_empty() {
            return Err(MessageError::missing("plain", "channel_id"));
        }
        if author_id.is_empty() {
            return Err(MessageError::missing("plain", "author_id"));
        }
        Ok(Self::Plain(PlainMessage {
            channel_id,
            author_id,
        }))
    }

    /// Returns the platform of this message.
    pub fn platform(&self) -> Platform {
        match self {
            Self::Discord(_) => Platform::Discord,
            Self::Twitch(_) => Platform::Twitch,
            Self::Plain(_) => Platform::None,
        }
    }

    /// Returns the opaque author identifier.
    pub fn author_id(&self) -> &str {
        match self {
            Self::Discord(d) => &d.author_id,
            Self::Twitch(t) => &t.user_id,
            Self::Plain(p) => &p.author_id,
        }
    }

    /// Returns the opaque channel identifier.
    pub fn channel_id(&self) -> &str {
        match self {
            Self::Discord(d) => &d.channel_id,
            Self::Twitch(t) => &t.channel,
            Self::Plain(p) => &p.channel_id,
        }
    }

    /// Derives the place whose prefix configuration applies to this message.
    ///
    /// Discord guild messages map to the guild, direct messages to the
    /// channel. Twitch messages map to the channel.
    pub fn place(&self) -> Place {
        match self {
            Self::Discord(d) => Place::new(
                d.guild_id.as_deref().unwrap_or(&d.channel_id),
                Platform::Discord,
            ),
            Self::Twitch(t) => Place::new(&t.channel, Platform::Twitch),
            Self::Plain(p) => Place::new(&p.channel_id, Platform::None),
        }
    }
}

/// A message as handed to the command core by a platform adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Raw text content.
    pub content: String,
    /// Author/channel identity.
    pub source: PlatformMessage,
}

impl InboundMessage {
    /// Creates a new inbound message.
    pub fn new(content: impl Into<String>, source: PlatformMessage) -> Self {
        Self {
            content: content.into(),
            source,
        }
    }

    /// Shorthand for [`PlatformMessage::place`].
    pub fn place(&self) -> Place {
        self.source.place()
    }

    /// Shorthand for [`PlatformMessage::platform`].
    pub fn platform(&self) -> Platform {
        self.source.platform()
    }
}

//! The parsed view of an inbound message.

use framed_core::{InboundMessage, Place, Platform, PlatformMessage};
use tracing::{debug, trace};

use super::prefix::resolve_prefix;
use super::split::{Unterminated, strip_quotes, tokenize_with_diagnostics};

/// An inbound message after prefix resolution and tokenization.
///
/// If no prefix matched, [`prefix`](Self::prefix) and
/// [`command_name`](Self::command_name) are `None` and [`args`](Self::args)
/// is empty. The command token is never part of `args`.
#[derive(Debug, Clone)]
pub struct ParsedMessage {
    content: String,
    source: PlatformMessage,
    prefix: Option<String>,
    command_name: Option<String>,
    args: Vec<String>,
    /// Text after the prefix; `arg_starts` index into it.
    body: String,
    arg_starts: Vec<usize>,
    unterminated: Option<Unterminated>,
}

impl ParsedMessage {
    /// Resolves a prefix from `candidates` (first match wins) and tokenizes
    /// the rest. The first token is shifted off as the lowercase command name.
    pub fn parse<S: AsRef<str>>(inbound: &InboundMessage, candidates: &[S]) -> Self {
        let mut parsed = Self {
            content: inbound.content.clone(),
            source: inbound.source.clone(),
            prefix: None,
            command_name: None,
            args: Vec::new(),
            body: String::new(),
            arg_starts: Vec::new(),
            unterminated: None,
        };

        let Some(found) = resolve_prefix(&inbound.content, candidates) else {
            return parsed;
        };

        let tokenized = tokenize_with_diagnostics(&found.args_content, false);
        if let Some(kind) = tokenized.unterminated {
            trace!(?kind, "Auto-closed unterminated span");
        }
        debug!(args = ?tokenized.tokens, "Args");

        let mut tokens = tokenized.tokens.into_iter();
        parsed.command_name = tokens.next().map(|t| t.to_lowercase());
        parsed.args = tokens.collect();
        parsed.arg_starts = tokenized.starts.into_iter().skip(1).collect();
        parsed.unterminated = tokenized.unterminated;
        parsed.body = found.args_content;
        parsed.prefix = Some(found.prefix);
        parsed
    }

    /// The handler view for a resolved subcommand chain: the first
    /// `consumed` arguments (the subcommand tokens) are removed.
    pub fn for_subcommand(&self, consumed: usize) -> Self {
        if consumed == 0 {
            return self.clone();
        }
        Self {
            args: self.args.iter().skip(consumed).cloned().collect(),
            arg_starts: self.arg_starts.iter().skip(consumed).copied().collect(),
            ..self.clone()
        }
    }

    /// The raw message content.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source(&self) -> &PlatformMessage {
        &self.source
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The lowercase command token.
    pub fn command_name(&self) -> Option<&str> {
        self.command_name.as_deref()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Arguments with unescaped `"` characters removed.
    pub fn args_without_quotes(&self) -> Vec<String> {
        self.args.iter().map(|a| strip_quotes(a)).collect()
    }

    /// The raw text following the command (and any consumed subcommand)
    /// tokens, trimmed. Quotes and code-block markers are left untouched.
    pub fn args_content(&self) -> &str {
        self.arg_starts
            .first()
            .map_or("", |&start| self.body[start..].trim_end())
    }

    /// Set when tokenization closed a quote or code block at end of input.
    pub fn unterminated(&self) -> Option<Unterminated> {
        self.unterminated
    }

    pub fn is_command(&self) -> bool {
        self.command_name.is_some()
    }

    pub fn place(&self) -> Place {
        self.source.place()
    }

    pub fn platform(&self) -> Platform {
        self.source.platform()
    }

    /// Parses the remaining arguments into a clap command, using the command
    /// name as the binary name.
    ///
    /// ```rust,ignore
    /// #[derive(clap::Parser)]
    /// struct Roll {
    ///     #[arg(default_value_t = 6)]
    ///     sides: u32,
    /// }
    ///
    /// let roll = ctx.message().parse_args::<Roll>()?;
    /// ```
    #[cfg(feature = "clap")]
    pub fn parse_args<T: clap::Parser>(&self) -> Result<CommandArgs<T>, clap::Error> {
        let bin = self.command_name.clone().unwrap_or_default();
        T::try_parse_from(std::iter::once(bin).chain(self.args.iter().cloned())).map(CommandArgs)
    }
}

/// Arguments parsed by clap through [`ParsedMessage::parse_args`].
#[cfg(feature = "clap")]
#[derive(Debug, Clone)]
pub struct CommandArgs<T>(pub T);

#[cfg(feature = "clap")]
impl<T> CommandArgs<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(feature = "clap")]
impl<T> std::ops::Deref for CommandArgs<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound(content: &str) -> InboundMessage {
        InboundMessage::new(content, PlatformMessage::plain("chan", "user").unwrap())
    }

    #[test]
    fn test_parse_command_and_args() {
        let msg = ParsedMessage::parse(&inbound(r#"!Ping "a b" c"#), &["!"]);
        assert_eq!(msg.prefix(), Some("!"));
        assert_eq!(msg.command_name(), Some("ping"));
        assert_eq!(msg.args(), ["a b", "c"]);
        assert_eq!(msg.args_content(), r#""a b" c"#);
    }

    #[test]
    fn test_parse_without_prefix() {
        let msg = ParsedMessage::parse(&inbound("ping a b"), &["!"]);
        assert_eq!(msg.prefix(), None);
        assert_eq!(msg.command_name(), None);
        assert!(msg.args().is_empty());
        assert!(!msg.is_command());
    }

    #[test]
    fn test_prefix_only() {
        let msg = ParsedMessage::parse(&inbound("!   "), &["!"]);
        assert_eq!(msg.prefix(), Some("!"));
        assert_eq!(msg.command_name(), None);
        assert!(msg.args().is_empty());
        assert_eq!(msg.args_content(), "");
    }

    #[test]
    fn test_for_subcommand() {
        let msg = ParsedMessage::parse(&inbound("!group add  fun  stuff here"), &["!"]);
        let sub = msg.for_subcommand(1);
        assert_eq!(sub.command_name(), Some("group"));
        assert_eq!(sub.args(), ["fun", "stuff", "here"]);
        assert_eq!(sub.args_content(), "fun  stuff here");

        let all = msg.for_subcommand(4);
        assert!(all.args().is_empty());
        assert_eq!(all.args_content(), "");
    }

    #[test]
    fn test_args_content_with_quote_on_command_token() {
        let msg = ParsedMessage::parse(&inbound(r#"!say"hello world""#), &["!"]);
        assert_eq!(msg.command_name(), Some("say"));
        assert_eq!(msg.args(), ["hello world"]);
        assert_eq!(msg.args_content(), r#""hello world""#);
    }

    #[test]
    fn test_args_content_skips_quoted_subcommand_token() {
        let msg = ParsedMessage::parse(&inbound(r#"!tag "two words" rest"#), &["!"]);
        let sub = msg.for_subcommand(1);
        assert_eq!(sub.args(), ["rest"]);
        assert_eq!(sub.args_content(), "rest");

        let msg = ParsedMessage::parse(&inbound("!eval `a  b` c  "), &["!"]);
        assert_eq!(msg.args_content(), "`a  b` c");
        assert_eq!(msg.for_subcommand(1).args_content(), "c");
    }

    #[test]
    fn test_unterminated_is_recorded() {
        let msg = ParsedMessage::parse(&inbound(r#"!say "hello"#), &["!"]);
        assert_eq!(msg.args(), ["hello"]);
        assert_eq!(msg.unterminated(), Some(Unterminated::Quote));
    }

    #[test]
    fn test_args_without_quotes() {
        let msg = ParsedMessage::parse(&inbound(r#"!x a"b"#), &["!"]);
        assert_eq!(msg.args(), ["a", "b"]);
        let msg = ParsedMessage::parse(&inbound(r#"!x `say "hi"`"#), &["!"]);
        assert_eq!(msg.args_without_quotes(), ["say hi"]);
    }

    #[cfg(feature = "clap")]
    #[test]
    fn test_parse_args_with_clap() {
        #[derive(clap::Parser, Debug)]
        struct Roll {
            sides: u32,
            #[arg(long)]
            times: Option<u32>,
        }

        let msg = ParsedMessage::parse(&inbound("!roll 20 --times 2"), &["!"]);
        let roll = msg.parse_args::<Roll>().unwrap();
        assert_eq!(roll.sides, 20);
        assert_eq!(roll.times, Some(2));

        let msg = ParsedMessage::parse(&inbound("!roll nope"), &["!"]);
        assert!(msg.parse_args::<Roll>().is_err());
    }
}

//! Prefix resolution.
//!
//! [`resolve_prefix`] is a pure function over an explicit, pre-ordered list of
//! candidates: the **first** candidate that is a literal prefix of the content
//! wins. List order is the caller's contract. Callers that want
//! longest-match semantics sort with [`PrefixCandidates::longest_first`].
//!
//! [`PrefixCandidates`] assembles that list in the standard order:
//!
//! 1. per-command override prefixes
//! 2. the place prefix (or the platform default when the place has none)
//! 3. mention forms
//! 4. the global default

/// The result of a successful prefix match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatch {
    /// The candidate that matched.
    pub prefix: String,
    /// The content with the prefix removed and surrounding whitespace trimmed.
    pub args_content: String,
}

/// Returns the first candidate that `content` starts with.
///
/// Empty candidates never match.
///
/// ```rust
/// use framed_framework::command::resolve_prefix;
///
/// let found = resolve_prefix("!!ping", &["!!", "!"]).unwrap();
/// assert_eq!(found.prefix, "!!");
/// assert_eq!(found.args_content, "ping");
/// ```
pub fn resolve_prefix<S: AsRef<str>>(content: &str, candidates: &[S]) -> Option<PrefixMatch> {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|candidate| !candidate.is_empty() && content.starts_with(candidate))
        .map(|prefix| PrefixMatch {
            prefix: prefix.to_string(),
            args_content: content[prefix.len()..].trim().to_string(),
        })
}

/// Ordered, de-duplicated list of prefix candidates.
///
/// Pushing a value that is already present keeps its first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixCandidates {
    candidates: Vec<String>,
}

impl PrefixCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a candidate unless it is empty or already present.
    pub fn push(&mut self, candidate: impl Into<String>) {
        let candidate = candidate.into();
        if !candidate.is_empty() && !self.candidates.contains(&candidate) {
            self.candidates.push(candidate);
        }
    }

    /// Appends per-command override prefixes.
    pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for p in overrides {
            self.push(p);
        }
        self
    }

    /// Appends the place-specific prefix.
    pub fn with_place(mut self, prefix: Option<impl Into<String>>) -> Self {
        if let Some(p) = prefix {
            self.push(p);
        }
        self
    }

    /// Appends the mention forms for a bot user id (`<@id>` and `<@!id>`).
    pub fn with_mention(mut self, bot_user_id: Option<&str>) -> Self {
        if let Some(id) = bot_user_id.filter(|id| !id.is_empty()) {
            self.push(format!("<@!{id}>"));
            self.push(format!("<@{id}>"));
        }
        self
    }

    /// Appends the global default prefix.
    pub fn with_default(mut self, prefix: impl Into<String>) -> Self {
        self.push(prefix);
        self
    }

    /// Re-sorts candidates by descending length. Equal lengths keep their order.
    pub fn longest_first(mut self) -> Self {
        self.candidates
            .sort_by_key(|c| std::cmp::Reverse(c.chars().count()));
        self
    }

    /// Returns `true` if the candidate is present.
    pub fn contains(&self, candidate: &str) -> bool {
        self.candidates.iter().any(|c| c == candidate)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Shorthand for [`resolve_prefix`] over these candidates.
    pub fn resolve(&self, content: &str) -> Option<PrefixMatch> {
        resolve_prefix(content, &self.candidates)
    }
}

impl Extend<String> for PrefixCandidates {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for p in iter {
            self.push(p);
        }
    }
}

impl IntoIterator for PrefixCandidates {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_order_wins() {
        let m = resolve_prefix("!!ping", &["!!", "!"]).unwrap();
        assert_eq!(m.prefix, "!!");

        // Reversed order: the shorter candidate matches first.
        let m = resolve_prefix("!!ping", &["!", "!!"]).unwrap();
        assert_eq!(m.prefix, "!");
        assert_eq!(m.args_content, "!ping");
    }

    #[test]
    fn test_no_match() {
        assert_eq!(resolve_prefix("hello", &["!", "?"]), None);
        assert_eq!(resolve_prefix::<&str>("!ping", &[]), None);
    }

    #[test]
    fn test_empty_candidate_never_matches() {
        let m = resolve_prefix("!ping", &["", "!"]).unwrap();
        assert_eq!(m.prefix, "!");
    }

    #[test]
    fn test_args_content_trimmed() {
        let m = resolve_prefix("<@1>   ping  pong  ", &["<@1>"]).unwrap();
        assert_eq!(m.args_content, "ping  pong");
    }

    #[test]
    fn test_candidates_order_and_dedup() {
        let c = PrefixCandidates::new()
            .with_overrides(["$", "!"])
            .with_place(Some("?"))
            .with_mention(Some("99"))
            .with_default("!");
        assert_eq!(c.as_slice(), ["$", "!", "?", "<@!99>", "<@99>"]);
    }

    #[test]
    fn test_longest_first() {
        let c = PrefixCandidates::new()
            .with_default("!")
            .with_overrides(["!!", "?", ">>>"])
            .longest_first();
        assert_eq!(c.as_slice(), [">>>", "!!", "!", "?"]);
        assert_eq!(c.resolve("!!x").unwrap().prefix, "!!");
    }

    #[test]
    fn test_mention_ignored_without_id() {
        let c = PrefixCandidates::new().with_mention(None).with_mention(Some(""));
        assert!(c.is_empty());
    }
}

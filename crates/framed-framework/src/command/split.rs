//! Message content tokenizer.
//!
//! Splits the text after a prefix into argument tokens:
//!
//! - Whitespace separates tokens and never produces an empty one.
//! - `"double quoted spans"` become a single token. A quote preceded by `\`
//!   is kept literally.
//! - `` `code block spans` `` become a single token with their whitespace and
//!   quote characters preserved verbatim.
//! - An unterminated quote or code block is closed at end of input; whatever
//!   was buffered is still emitted.
//!
//! Quote and backtick markers are dropped from tokens unless
//! `keep_quote_chars` is set.

/// The kind of span that was still open when input ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unterminated {
    Quote,
    CodeBlock,
}

/// Tokens plus the recovery diagnostic, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenized {
    pub tokens: Vec<String>,
    /// Byte offset in the input where each token's span begins, including an
    /// opening quote or backtick.
    pub starts: Vec<usize>,
    /// Set when the input ended inside a quote or code block and the span
    /// was closed automatically.
    pub unterminated: Option<Unterminated>,
}

impl Tokenized {
    fn flush(&mut self, buffer: &mut String, start: &mut Option<usize>) {
        let begin = start.take();
        if !buffer.is_empty() {
            self.tokens.push(std::mem::take(buffer));
            self.starts.push(begin.unwrap_or_default());
        }
    }
}

/// Splits `content` into argument tokens.
///
/// ```rust
/// use framed_framework::command::tokenize;
///
/// assert_eq!(tokenize(r#"a "b c" d"#, false), vec!["a", "b c", "d"]);
/// ```
pub fn tokenize(content: &str, keep_quote_chars: bool) -> Vec<String> {
    tokenize_with_diagnostics(content, keep_quote_chars).tokens
}

/// Like [`tokenize`] but also reports token offsets and whether a span was
/// auto-closed.
pub fn tokenize_with_diagnostics(content: &str, keep_quote_chars: bool) -> Tokenized {
    let mut out = Tokenized::default();
    let mut buffer = String::new();
    let mut start: Option<usize> = None;
    let mut inside_quote = false;
    let mut inside_code_block = false;
    let mut prev: Option<char> = None;

    for (i, ch) in content.char_indices() {
        let escaped = prev == Some('\\');
        prev = Some(ch);

        match ch {
            '`' => {
                start.get_or_insert(i);
                inside_code_block = !inside_code_block;
                if keep_quote_chars {
                    buffer.push(ch);
                }
            }
            _ if inside_code_block => buffer.push(ch),
            '"' if !escaped => {
                if inside_quote {
                    if keep_quote_chars {
                        buffer.push(ch);
                    }
                    out.flush(&mut buffer, &mut start);
                    inside_quote = false;
                } else {
                    out.flush(&mut buffer, &mut start);
                    start = Some(i);
                    if keep_quote_chars {
                        buffer.push(ch);
                    }
                    inside_quote = true;
                }
            }
            c if c.is_whitespace() && !inside_quote => out.flush(&mut buffer, &mut start),
            c => {
                start.get_or_insert(i);
                buffer.push(c);
            }
        }
    }

    out.unterminated = if inside_code_block {
        Some(Unterminated::CodeBlock)
    } else if inside_quote {
        Some(Unterminated::Quote)
    } else {
        None
    };
    out.flush(&mut buffer, &mut start);
    out
}

/// Removes unescaped `"` characters from an argument.
pub fn strip_quotes(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut prev: Option<char> = None;
    for ch in arg.chars() {
        if ch != '"' || prev == Some('\\') {
            out.push(ch);
        }
        prev = Some(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(tokenize("ping a b", false), vec!["ping", "a", "b"]);
    }

    #[test]
    fn test_tokenize_quoted() {
        assert_eq!(tokenize(r#"a "b c" d"#, false), vec!["a", "b c", "d"]);
    }

    #[test]
    fn test_tokenize_keeps_quote_chars() {
        assert_eq!(tokenize(r#"a "b c" d"#, true), vec!["a", r#""b c""#, "d"]);
    }

    #[test]
    fn test_tokenize_unterminated_quote() {
        let out = tokenize_with_diagnostics(r#"a "b c d"#, false);
        assert_eq!(out.tokens, vec!["a", "b c d"]);
        assert_eq!(out.unterminated, Some(Unterminated::Quote));
    }

    #[test]
    fn test_tokenize_code_block() {
        assert_eq!(
            tokenize(r#"a `b "c" d` e"#, false),
            vec!["a", r#"b "c" d"#, "e"]
        );
    }

    #[test]
    fn test_tokenize_code_block_keeps_markers() {
        assert_eq!(
            tokenize(r#"a `b "c" d` e"#, true),
            vec!["a", r#"`b "c" d`"#, "e"]
        );
    }

    #[test]
    fn test_tokenize_unterminated_code_block() {
        let out = tokenize_with_diagnostics("x `let a = 1;  b", false);
        assert_eq!(out.tokens, vec!["x", "let a = 1;  b"]);
        assert_eq!(out.unterminated, Some(Unterminated::CodeBlock));
    }

    #[test]
    fn test_tokenize_escaped_quote_is_literal() {
        assert_eq!(
            tokenize(r#""say \"hi\" now" x"#, false),
            vec![r#"say \"hi\" now"#, "x"]
        );
        assert_eq!(tokenize(r#"a\"b"#, false), vec![r#"a\"b"#]);
    }

    #[test]
    fn test_tokenize_quote_flushes_pending_buffer() {
        assert_eq!(tokenize(r#"ab"cd ef"gh"#, false), vec!["ab", "cd ef", "gh"]);
    }

    #[test]
    fn test_tokenize_empty_and_whitespace() {
        assert!(tokenize("", false).is_empty());
        assert!(tokenize("  \t \n ", false).is_empty());
        assert_eq!(tokenize_with_diagnostics("", false), Tokenized::default());
    }

    #[test]
    fn test_tokenize_never_emits_empty_tokens() {
        let inputs = [
            r#""""#,
            "``",
            r#"a  "" b"#,
            "   x   ",
            r#"" "#,
            "` `",
            r#"""" ````"#,
        ];
        for input in inputs {
            for keep in [false, true] {
                let tokens = tokenize(input, keep);
                assert!(
                    tokens.iter().all(|t| !t.is_empty()),
                    "empty token for {input:?}: {tokens:?}"
                );
            }
        }
    }

    #[test]
    fn test_tokenize_multiline_code_block() {
        let input = "eval ```\nfn main() {}\n```";
        assert_eq!(tokenize(input, false), vec!["eval", "\nfn main() {}\n"]);
    }

    #[test]
    fn test_tokenize_records_span_starts() {
        let input = r#"say"hello world" `a b`  \"x"#;
        let out = tokenize_with_diagnostics(input, false);
        assert_eq!(out.tokens, vec!["say", "hello world", "a b", r#"\"x"#]);
        assert_eq!(out.starts, vec![0, 3, 17, 24]);
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes(r#""hello""#), "hello");
        assert_eq!(strip_quotes(r#"say \"hi\""#), r#"say \"hi\""#);
    }
}

//! The field selector pattern language.
//!
//! This module provides [`Selector`] and [`SelectorSegment`]: the parsed
//! form of a textual address pattern such as `users.*.email`,
//! `items[0].tags`, `meta["x.y"]` or `**.id`. A selector is the
//! wildcard-capable counterpart of [`FieldPath`](crate::path::FieldPath):
//! the expander substitutes concrete keys for wildcard segments until only
//! concrete addresses remain.
//!
//! Parsing is lenient and never fails, matching how request fields are
//! usually named from configuration rather than validated grammar:
//! malformed bracket groups are consumed as literal keys.

use std::fmt::{self, Display};

use crate::path::{FieldPath, PathSegment};

/// A segment of a selector pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorSegment {
    /// A literal mapping key. Substituted keys produced during wildcard
    /// expansion are always this variant, so a literal `*` key in data can
    /// never be re-read as a wildcard token.
    Key(String),
    /// A literal sequence index.
    Index(usize),
    /// `*` — matches exactly one level, fanning out per key/index present.
    Wildcard,
    /// `**` — matches zero or more levels.
    Globstar,
}

impl SelectorSegment {
    /// Returns true for `*` and `**`.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, SelectorSegment::Wildcard | SelectorSegment::Globstar)
    }
}

/// A parsed field selector.
///
/// The original text is retained verbatim: selected instances carry it as
/// their `original_path` so error reports show the pattern the caller
/// wrote, including casing and wildcards.
///
/// # Grammar
///
/// - `a.b.c` — dot-separated keys
/// - `a[0]` — bracketed index (digits-only bracket content)
/// - `a["x.y"]`, `a['x']` — quoted bracketed key, for keys containing
///   structural characters
/// - `*` / `**` — single-level / multi-level wildcard segments
/// - `\*`, `\.`, `\\`, `\[` — backslash escapes for literal structural
///   characters in bare segments
/// - the empty string — the whole location
///
/// # Example
///
/// ```rust
/// use dragnet::{Selector, SelectorSegment};
///
/// let selector = Selector::parse("users.*.email");
/// assert!(selector.has_wildcard());
/// assert_eq!(selector.segments().len(), 3);
/// assert_eq!(selector.segments()[1], SelectorSegment::Wildcard);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    raw: String,
    segments: Vec<SelectorSegment>,
}

impl Selector {
    /// Parses a textual pattern into a selector. Never fails.
    pub fn parse(input: &str) -> Self {
        Self {
            raw: input.to_string(),
            segments: tokenize(input),
        }
    }

    /// Returns the original pattern text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    pub fn segments(&self) -> &[SelectorSegment] {
        &self.segments
    }

    /// Returns true if any segment is `*` or `**`.
    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(SelectorSegment::is_wildcard)
    }

    /// Returns a copy with every key segment lower-cased.
    ///
    /// Used for header locations, which are addressed case-insensitively.
    pub fn lowercased(&self) -> Self {
        Self {
            raw: self.raw.to_lowercase(),
            segments: self
                .segments
                .iter()
                .map(|s| match s {
                    SelectorSegment::Key(k) => SelectorSegment::Key(k.to_lowercase()),
                    other => other.clone(),
                })
                .collect(),
        }
    }

    /// Converts a wildcard-free selector into the concrete address it
    /// denotes. Returns None if the selector contains a wildcard.
    pub fn to_field_path(&self) -> Option<FieldPath> {
        concrete_path(&self.segments)
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Selector {
    fn from(input: &str) -> Self {
        Selector::parse(input)
    }
}

impl From<String> for Selector {
    fn from(input: String) -> Self {
        Selector::parse(&input)
    }
}

/// Converts concrete selector segments into a field path.
///
/// Returns None if any segment is a wildcard.
pub(crate) fn concrete_path(segments: &[SelectorSegment]) -> Option<FieldPath> {
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            SelectorSegment::Key(k) => out.push(PathSegment::Key(k.clone())),
            SelectorSegment::Index(i) => out.push(PathSegment::Index(*i)),
            SelectorSegment::Wildcard | SelectorSegment::Globstar => return None,
        }
    }
    Some(FieldPath::from_segments(out))
}

/// Classifies a finished bare segment. Escaped segments are always literal
/// keys, so `\*` selects a field actually named `*`.
fn bare_segment(text: String, escaped: bool) -> SelectorSegment {
    if !escaped {
        match text.as_str() {
            "*" => return SelectorSegment::Wildcard,
            "**" => return SelectorSegment::Globstar,
            _ => {}
        }
    }
    SelectorSegment::Key(text)
}

/// Classifies unquoted bracket content: digits become indices, `*`/`**`
/// stay wildcards, anything else is a literal key.
fn bracket_segment(content: String) -> SelectorSegment {
    match content.as_str() {
        "*" => SelectorSegment::Wildcard,
        "**" => SelectorSegment::Globstar,
        _ => {
            if !content.is_empty() && content.bytes().all(|b| b.is_ascii_digit()) {
                match content.parse::<usize>() {
                    Ok(idx) => SelectorSegment::Index(idx),
                    Err(_) => SelectorSegment::Key(content),
                }
            } else {
                SelectorSegment::Key(content)
            }
        }
    }
}

fn tokenize(input: &str) -> Vec<SelectorSegment> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut bare = String::new();
    let mut bare_active = false;
    let mut bare_escaped = false;

    macro_rules! finish_bare {
        () => {
            if bare_active {
                segments.push(bare_segment(std::mem::take(&mut bare), bare_escaped));
                bare_active = false;
                bare_escaped = false;
            }
        };
    }

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                bare.push(chars.next().unwrap_or('\\'));
                bare_active = true;
                bare_escaped = true;
            }
            '.' => finish_bare!(),
            '[' => {
                finish_bare!();
                match chars.peek().copied() {
                    Some(quote) if quote == '"' || quote == '\'' => {
                        chars.next();
                        let mut content = String::new();
                        while let Some(c) = chars.next() {
                            match c {
                                '\\' => content.push(chars.next().unwrap_or('\\')),
                                c if c == quote => break,
                                c => content.push(c),
                            }
                        }
                        // Skip to the closing bracket, if any.
                        for c in chars.by_ref() {
                            if c == ']' {
                                break;
                            }
                        }
                        segments.push(SelectorSegment::Key(content));
                    }
                    _ => {
                        let mut content = String::new();
                        let mut closed = false;
                        for c in chars.by_ref() {
                            if c == ']' {
                                closed = true;
                                break;
                            }
                            content.push(c);
                        }
                        if closed {
                            segments.push(bracket_segment(content));
                        } else {
                            // Unterminated group: treat the remainder as a
                            // literal key, bracket included.
                            segments.push(SelectorSegment::Key(format!("[{}", content)));
                        }
                    }
                }
            }
            c => {
                bare.push(c);
                bare_active = true;
            }
        }
    }
    finish_bare!();
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> SelectorSegment {
        SelectorSegment::Key(k.to_string())
    }

    #[test]
    fn test_empty_selector_is_whole_location() {
        let selector = Selector::parse("");
        assert!(selector.segments().is_empty());
        assert!(!selector.has_wildcard());
        assert_eq!(selector.to_field_path().unwrap(), FieldPath::root());
    }

    #[test]
    fn test_dot_notation() {
        let selector = Selector::parse("user.address.city");
        assert_eq!(
            selector.segments(),
            &[key("user"), key("address"), key("city")]
        );
    }

    #[test]
    fn test_bracket_index() {
        let selector = Selector::parse("users[0].email");
        assert_eq!(
            selector.segments(),
            &[key("users"), SelectorSegment::Index(0), key("email")]
        );
    }

    #[test]
    fn test_quoted_bracket_key() {
        let selector = Selector::parse("meta[\"x.y\"]");
        assert_eq!(selector.segments(), &[key("meta"), key("x.y")]);

        let selector = Selector::parse("meta['x.y']");
        assert_eq!(selector.segments(), &[key("meta"), key("x.y")]);
    }

    #[test]
    fn test_wildcard_segments() {
        let selector = Selector::parse("users.*.email");
        assert_eq!(
            selector.segments(),
            &[key("users"), SelectorSegment::Wildcard, key("email")]
        );
        assert!(selector.has_wildcard());
    }

    #[test]
    fn test_globstar_segment() {
        let selector = Selector::parse("**.id");
        assert_eq!(
            selector.segments(),
            &[SelectorSegment::Globstar, key("id")]
        );
    }

    #[test]
    fn test_bracketed_wildcard() {
        let selector = Selector::parse("items[*].sku");
        assert_eq!(
            selector.segments(),
            &[key("items"), SelectorSegment::Wildcard, key("sku")]
        );
    }

    #[test]
    fn test_escaped_star_is_literal() {
        let selector = Selector::parse("a.\\*.b");
        assert_eq!(selector.segments(), &[key("a"), key("*"), key("b")]);
        assert!(!selector.has_wildcard());
    }

    #[test]
    fn test_escaped_dot_is_literal() {
        let selector = Selector::parse("a\\.b");
        assert_eq!(selector.segments(), &[key("a.b")]);
    }

    #[test]
    fn test_bare_digits_stay_keys() {
        // `a.0` addresses either an array slot or a digits-only map key;
        // lookup is lenient about which, so parsing keeps the key form.
        let selector = Selector::parse("a.0");
        assert_eq!(selector.segments(), &[key("a"), key("0")]);
    }

    #[test]
    fn test_unterminated_bracket_is_literal() {
        let selector = Selector::parse("a[b");
        assert_eq!(selector.segments(), &[key("a"), key("[b")]);
    }

    #[test]
    fn test_lowercased_for_headers() {
        let selector = Selector::parse("X-Api-Key");
        let lowered = selector.lowercased();
        assert_eq!(lowered.segments(), &[key("x-api-key")]);
        assert_eq!(selector.raw(), "X-Api-Key");
    }

    #[test]
    fn test_to_field_path_rejects_wildcards() {
        assert!(Selector::parse("a.*.b").to_field_path().is_none());
        assert!(Selector::parse("a.b").to_field_path().is_some());
    }

    #[test]
    fn test_canonical_round_trip() {
        // reconstruct(parse(p)) == p for canonical non-wildcard paths
        for canonical in ["users[0].email", "a.b.c", "meta[\"x.y\"]", "items[2]"] {
            let path = Selector::parse(canonical).to_field_path().unwrap();
            assert_eq!(path.to_string(), canonical);
        }
    }
}

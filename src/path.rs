//! Concrete addresses for values in nested request data.
//!
//! This module provides [`FieldPath`] and [`PathSegment`] types for building
//! and representing addresses of values inside a location's tree, together
//! with the canonical textual form used everywhere errors and results refer
//! to a field (e.g. `users[0].email`).

use std::fmt::{self, Display};
use std::sync::LazyLock;

use regex::Regex;

/// Matches keys that can appear bare in the canonical form.
static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$-]*$").expect("valid identifier regex"));

/// Matches digits-only keys, which are rendered in index brackets.
static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid digits regex"));

/// A segment of a field path.
///
/// Paths are built from segments that represent either mapping-key access
/// or sequence indexing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A mapping key access (e.g. `user`, `email`).
    Key(String),
    /// A sequence index access (e.g. `[0]`, `[42]`).
    Index(usize),
}

impl PathSegment {
    /// Creates a new key segment.
    pub fn key(name: impl Into<String>) -> Self {
        PathSegment::Key(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// An address of a value in a nested location tree.
///
/// `FieldPath` represents locations like `users[0].email` and provides
/// methods for building paths incrementally. Its `Display` implementation
/// produces the canonical textual form: plain keys are joined with `.`,
/// indices and digits-only keys are rendered as `[n]`, and keys containing
/// structural characters are quoted inside brackets (`["a.b"]`) so that
/// parsing the rendered form yields the same segments back.
///
/// # Example
///
/// ```rust
/// use dragnet::FieldPath;
///
/// let path = FieldPath::root()
///     .push_key("users")
///     .push_index(0)
///     .push_key("email");
///
/// assert_eq!(path.to_string(), "users[0].email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Creates an empty path addressing the whole location value.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from a list of segments.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Creates a path from a single key segment.
    pub fn from_key(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Key(name.into())],
        }
    }

    /// Returns a new path with a key segment appended.
    ///
    /// This method does not modify the original path; it returns a new one.
    pub fn push_key(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(name.into()));
        Self { segments }
    }

    /// Returns a new path with an index segment appended.
    ///
    /// This method does not modify the original path; it returns a new one.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Returns true if this path addresses the whole location (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the segments as a slice.
    pub fn as_segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the parent path (all segments except the last), or None if
    /// this is the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// Returns the last segment, or None if this is the root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }
}

/// Renders one segment in canonical form.
///
/// `first` suppresses the leading `.` for the initial bare key.
fn write_segment(out: &mut fmt::Formatter<'_>, segment: &PathSegment, first: bool) -> fmt::Result {
    match segment {
        PathSegment::Index(idx) => write!(out, "[{}]", idx),
        PathSegment::Key(key) if DIGITS_RE.is_match(key) => write!(out, "[{}]", key),
        PathSegment::Key(key) if IDENT_RE.is_match(key) => {
            if first {
                write!(out, "{}", key)
            } else {
                write!(out, ".{}", key)
            }
        }
        PathSegment::Key(key) => {
            let escaped = key.replace('\\', "\\\\").replace('"', "\\\"");
            write!(out, "[\"{}\"]", escaped)
        }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            write_segment(f, segment, i == 0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_is_empty() {
        let path = FieldPath::root();
        assert!(path.is_root());
        assert!(path.is_empty());
        assert_eq!(path.len(), 0);
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_single_key() {
        let path = FieldPath::root().push_key("user");
        assert_eq!(path.to_string(), "user");
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_single_index() {
        let path = FieldPath::root().push_index(0);
        assert_eq!(path.to_string(), "[0]");
    }

    #[test]
    fn test_nested_keys() {
        let path = FieldPath::root().push_key("user").push_key("email");
        assert_eq!(path.to_string(), "user.email");
    }

    #[test]
    fn test_complex_path() {
        let path = FieldPath::root()
            .push_key("users")
            .push_index(0)
            .push_key("email");
        assert_eq!(path.to_string(), "users[0].email");
    }

    #[test]
    fn test_digits_only_key_uses_brackets() {
        let path = FieldPath::root().push_key("items").push_key("0");
        assert_eq!(path.to_string(), "items[0]");
    }

    #[test]
    fn test_dotted_key_is_quoted() {
        let path = FieldPath::root().push_key("headers").push_key("x.custom");
        assert_eq!(path.to_string(), "headers[\"x.custom\"]");
    }

    #[test]
    fn test_quote_in_key_is_escaped() {
        let path = FieldPath::root().push_key("a\"b");
        assert_eq!(path.to_string(), "[\"a\\\"b\"]");
    }

    #[test]
    fn test_wildcard_key_is_quoted() {
        // A literal `*` key in data must not render as a wildcard token.
        let path = FieldPath::root().push_key("a").push_key("*");
        assert_eq!(path.to_string(), "a[\"*\"]");
    }

    #[test]
    fn test_path_immutability() {
        let base = FieldPath::root().push_key("users");
        let path_a = base.push_index(0);
        let path_b = base.push_index(1);

        assert_eq!(base.to_string(), "users");
        assert_eq!(path_a.to_string(), "users[0]");
        assert_eq!(path_b.to_string(), "users[1]");
    }

    #[test]
    fn test_parent_path() {
        let path = FieldPath::root()
            .push_key("users")
            .push_index(0)
            .push_key("email");

        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "users[0]");

        let grandparent = parent.parent().unwrap();
        assert_eq!(grandparent.to_string(), "users");

        let root = grandparent.parent().unwrap();
        assert!(root.is_root());

        assert!(root.parent().is_none());
    }

    #[test]
    fn test_last_segment() {
        let path = FieldPath::root().push_key("users").push_index(0);
        assert_eq!(path.last(), Some(&PathSegment::Index(0)));

        let root = FieldPath::root();
        assert_eq!(root.last(), None);
    }

    #[test]
    fn test_equality() {
        let path1 = FieldPath::root().push_key("a").push_index(0);
        let path2 = FieldPath::root().push_key("a").push_index(0);
        let path3 = FieldPath::root().push_key("a").push_index(1);

        assert_eq!(path1, path2);
        assert_ne!(path1, path3);
    }
}

//! Path expansion: turning selectors into concrete addresses.
//!
//! [`expand`] is a pure function from a root value and a selector to the
//! ordered list of concrete addresses the selector denotes inside that
//! value. Wildcard segments fan out per key/index present at their level;
//! globstar segments additionally recurse to every depth.
//!
//! Globstar expansion with an empty remaining pattern emits a matching
//! node both as a branch (its own zero-level match) and as a leaf
//! (contributed by its parent's fan-out). The two emissions are kept
//! distinguishable through [`Expansion`] rather than silently collapsed;
//! selection-level dedup folds them into one instance.

use serde_json::Value;

use crate::path::{FieldPath, PathSegment};
use crate::selector::{concrete_path, Selector, SelectorSegment};

/// One concrete address produced by expansion, tagged with how the
/// expansion reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// The address matched as an intermediate branch of a globstar.
    Branch(FieldPath),
    /// The address matched as a leaf (or as a plain non-globstar match).
    Leaf(FieldPath),
}

impl Expansion {
    /// Returns the address regardless of tag.
    pub fn path(&self) -> &FieldPath {
        match self {
            Expansion::Branch(path) | Expansion::Leaf(path) => path,
        }
    }

    /// Consumes the expansion, returning the address.
    pub fn into_path(self) -> FieldPath {
        match self {
            Expansion::Branch(path) | Expansion::Leaf(path) => path,
        }
    }
}

/// Expands a selector against a root value into concrete addresses.
///
/// A wildcard-free selector denotes exactly one address, whether or not a
/// value exists there. A `*` segment fans out per key/index of the
/// sub-tree at its position, emitting nothing when that sub-tree is
/// absent or not a mapping/sequence. A `**` segment matches zero or more
/// levels. The empty selector denotes the whole root.
///
/// # Example
///
/// ```rust
/// use dragnet::{expand, Selector};
/// use serde_json::json;
///
/// let data = json!({ "users": [{ "email": "a@b.com" }, {}] });
/// let expanded = expand(&data, &Selector::parse("users.*.email"));
/// let paths: Vec<String> = expanded.iter().map(|e| e.path().to_string()).collect();
/// assert_eq!(paths, vec!["users[0].email", "users[1].email"]);
/// ```
pub fn expand(root: &Value, selector: &Selector) -> Vec<Expansion> {
    let mut out = Vec::new();
    expand_segments(root, selector.segments(), &mut out);
    out
}

fn expand_segments(root: &Value, segments: &[SelectorSegment], out: &mut Vec<Expansion>) {
    let Some(pos) = segments.iter().position(SelectorSegment::is_wildcard) else {
        let path = concrete_path(segments).expect("segments before first wildcard are concrete");
        out.push(Expansion::Leaf(path));
        return;
    };

    let prefix = &segments[..pos];
    let rest = &segments[pos + 1..];
    let prefix_path = concrete_path(prefix).expect("prefix precedes the first wildcard");
    let Some(sub) = lookup(root, &prefix_path) else {
        return;
    };
    let Some(children) = child_segments(sub) else {
        return;
    };

    match segments[pos] {
        SelectorSegment::Wildcard => {
            for child in children {
                let mut next = Vec::with_capacity(segments.len());
                next.extend_from_slice(prefix);
                next.push(child);
                next.extend_from_slice(rest);
                expand_segments(root, &next, out);
            }
        }
        SelectorSegment::Globstar => {
            if rest.is_empty() {
                // Zero levels consumed: the branch itself matches.
                out.push(Expansion::Branch(prefix_path.clone()));
            } else {
                let mut next = Vec::with_capacity(prefix.len() + rest.len());
                next.extend_from_slice(prefix);
                next.extend_from_slice(rest);
                expand_segments(root, &next, out);
            }
            for child in children {
                if rest.is_empty() {
                    out.push(Expansion::Leaf(append_segment(&prefix_path, &child)));
                }
                let mut next = Vec::with_capacity(segments.len() + 1);
                next.extend_from_slice(prefix);
                next.push(child);
                next.push(SelectorSegment::Globstar);
                next.extend_from_slice(rest);
                expand_segments(root, &next, out);
            }
        }
        _ => unreachable!("position() returned a wildcard segment"),
    }
}

fn append_segment(path: &FieldPath, segment: &SelectorSegment) -> FieldPath {
    match segment {
        SelectorSegment::Key(k) => path.push_key(k.clone()),
        SelectorSegment::Index(i) => path.push_index(*i),
        _ => unreachable!("child segments are concrete"),
    }
}

/// Enumerates the immediate children of a tree value as concrete selector
/// segments, or None when the value is not a mapping/sequence.
fn child_segments(value: &Value) -> Option<Vec<SelectorSegment>> {
    match value {
        Value::Object(map) => Some(map.keys().cloned().map(SelectorSegment::Key).collect()),
        Value::Array(items) => Some((0..items.len()).map(SelectorSegment::Index).collect()),
        _ => None,
    }
}

/// Resolves a concrete address inside a value.
///
/// Lookup is lenient about the key/index distinction the way dynamic data
/// demands: an index segment addresses the same-named key on a mapping,
/// and a digits-only key segment addresses the corresponding slot of a
/// sequence.
pub fn lookup<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match (current, segment) {
            (Value::Object(map), PathSegment::Key(k)) => map.get(k)?,
            (Value::Object(map), PathSegment::Index(i)) => map.get(&i.to_string())?,
            (Value::Array(items), PathSegment::Index(i)) => items.get(*i)?,
            (Value::Array(items), PathSegment::Key(k)) => {
                items.get(k.parse::<usize>().ok()?)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`lookup`], with the same leniency. Does not
/// create missing nodes.
pub(crate) fn lookup_mut<'a>(root: &'a mut Value, path: &FieldPath) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match (current, segment) {
            (Value::Object(map), PathSegment::Key(k)) => map.get_mut(k)?,
            (Value::Object(map), PathSegment::Index(i)) => map.get_mut(&i.to_string())?,
            (Value::Array(items), PathSegment::Index(i)) => items.get_mut(*i)?,
            (Value::Array(items), PathSegment::Key(k)) => {
                items.get_mut(k.parse::<usize>().ok()?)?
            }
            _ => return None,
        };
    }
    Some(current)
}

//! Field selection across locations.
//!
//! [`select_fields`] applies the path expander for every selector ×
//! location combination of a chain against the whole request, seeding the
//! [`FieldInstance`]s the pipeline operates on. Identical
//! `(location, address)` pairs produced by overlapping selectors are
//! deduplicated, first occurrence wins.

use indexmap::IndexMap;
use serde_json::Value;

use crate::expand::{expand, lookup};
use crate::path::FieldPath;
use crate::request::{Location, Request};
use crate::selector::Selector;

/// One concrete value selected out of a request.
///
/// `path` and `value` mutate as sanitizers run; `original_path` (the
/// selector text as the caller wrote it) and `original_value` are fixed at
/// selection time for error reporting. `value` is `None` when the address
/// does not exist in the data.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInstance {
    /// The location the instance was selected from.
    pub location: Location,
    /// The instance's current canonical address.
    pub path: FieldPath,
    /// The selector text that produced this instance, caller's casing and
    /// wildcards preserved.
    pub original_path: String,
    /// The instance's current value.
    pub value: Option<Value>,
    /// The value as it was at selection time.
    pub original_value: Option<Value>,
}

/// Selects every instance addressed by `fields` × `locations` in the
/// request, deduplicating identical `(location, address)` pairs.
///
/// Header locations are matched case-insensitively: the selector is
/// lower-cased before expansion, so the canonical path carries the
/// lower-cased form while `original_path` keeps the caller's casing.
///
/// # Example
///
/// ```rust
/// use dragnet::{select_fields, Location, Request, Selector};
/// use serde_json::json;
///
/// let req = Request::new().with_body(json!({ "users": [{ "email": "a@b.com" }, {}] }));
/// let instances = select_fields(&req, &[Selector::parse("users.*.email")], &[Location::Body]);
///
/// assert_eq!(instances.len(), 2);
/// assert_eq!(instances[0].path.to_string(), "users[0].email");
/// assert_eq!(instances[0].value, Some(json!("a@b.com")));
/// assert_eq!(instances[1].value, None);
/// ```
pub fn select_fields(
    req: &Request,
    fields: &[Selector],
    locations: &[Location],
) -> Vec<FieldInstance> {
    let mut deduped: IndexMap<(Location, String), FieldInstance> = IndexMap::new();
    for field in fields {
        for &location in locations {
            for instance in expand_field(req, field, location) {
                let key = (location, instance.path.to_string());
                deduped.entry(key).or_insert(instance);
            }
        }
    }
    deduped.into_values().collect()
}

fn expand_field(req: &Request, field: &Selector, location: Location) -> Vec<FieldInstance> {
    let selector = if location == Location::Headers {
        field.lowercased()
    } else {
        field.clone()
    };
    let root = req.location(location);
    expand(root, &selector)
        .into_iter()
        .map(|expansion| {
            let path = expansion.into_path();
            let value = if path.is_root() {
                Some(root.clone())
            } else {
                lookup(root, &path).cloned()
            };
            FieldInstance {
                location,
                path,
                original_path: field.raw().to_string(),
                original_value: value.clone(),
                value,
            }
        })
        .collect()
}

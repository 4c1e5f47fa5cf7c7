//! Unknown-field detection.
//!
//! The detector is the path expander run in reverse: instead of asking
//! which addresses a selector matches, it walks the data tree and asks
//! which addresses no selector covers. Known selectors are first folded
//! into a coverage tree; the walk then consults that tree at every key.
//!
//! A coverage node containing the empty-string key means "everything
//! under here is known" — it marks both selector terminals and selectors
//! shorter than the data paths beneath them.

use indexmap::IndexMap;
use serde_json::Value;

use crate::chain::{RunError, ValidationChain};
use crate::context::Context;
use crate::error::ValidationError;
use crate::path::FieldPath;
use crate::request::{Location, Request};
use crate::selector::{Selector, SelectorSegment};

/// An address present in the request that no selector covers.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownField {
    /// The location the address was found in.
    pub location: Location,
    /// The uncovered address. Empty when a whole non-tree location value
    /// is uncovered.
    pub path: FieldPath,
    /// The value at the address.
    pub value: Value,
}

/// The marker key meaning "everything under this node is known".
const KNOWN_BELOW: &str = "";

#[derive(Debug, Default)]
struct CoverageNode {
    children: IndexMap<String, CoverageNode>,
}

impl CoverageNode {
    fn fully_known(&self) -> bool {
        self.children.contains_key(KNOWN_BELOW)
    }

    fn mark_fully_known(&mut self) {
        self.children.entry(KNOWN_BELOW.to_string()).or_default();
    }

    /// Inserts one selector's segments below this node.
    ///
    /// Wildcards insert under the literal `*` key the walk consults; a
    /// globstar covers every depth below its position, so it marks the
    /// branch fully known.
    fn insert(&mut self, segments: &[SelectorSegment]) {
        let Some((segment, rest)) = segments.split_first() else {
            self.mark_fully_known();
            return;
        };
        let key = match segment {
            SelectorSegment::Key(k) => k.clone(),
            SelectorSegment::Index(i) => i.to_string(),
            SelectorSegment::Wildcard => "*".to_string(),
            SelectorSegment::Globstar => {
                self.mark_fully_known();
                return;
            }
        };
        self.children.entry(key).or_default().insert(rest);
    }
}

/// Finds every address in the request, under the given locations, that is
/// not covered by any known selector.
///
/// `known` pairs each group of selectors with the locations they apply
/// to, matching how chains carry their own location sets. A key in the
/// data is unknown only if neither the exact coverage branch nor the `*`
/// branch exists for it, or if both exist but neither yields zero deeper
/// unknowns — a more specific selector can rescue keys a broader wildcard
/// would wrongly report, and vice versa. A non-tree location value with
/// no covering selector contributes exactly one unknown with the empty
/// path.
pub fn find_unknown_fields(
    req: &Request,
    known: &[(Vec<Selector>, Vec<Location>)],
    locations: &[Location],
) -> Vec<UnknownField> {
    let mut unknowns = Vec::new();
    for &location in locations {
        let mut root = CoverageNode::default();
        for (selectors, selector_locations) in known {
            if !selector_locations.contains(&location) {
                continue;
            }
            for selector in selectors {
                let selector = if location == Location::Headers {
                    selector.lowercased()
                } else {
                    selector.clone()
                };
                root.insert(selector.segments());
            }
        }
        walk(
            &root,
            req.location(location),
            &FieldPath::root(),
            location,
            &mut unknowns,
        );
    }
    unknowns
}

fn walk(
    node: &CoverageNode,
    value: &Value,
    path: &FieldPath,
    location: Location,
    out: &mut Vec<UnknownField>,
) {
    if node.fully_known() {
        return;
    }
    let children: Vec<(String, FieldPath, &Value)> = match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), path.push_key(k.clone()), v))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), path.push_index(i), v))
            .collect(),
        _ => {
            // A leaf the coverage tree expected to descend into: the
            // value itself is uncovered.
            out.push(UnknownField {
                location,
                path: path.clone(),
                value: value.clone(),
            });
            return;
        }
    };

    for (key, child_path, child_value) in children {
        let exact = node.children.get(&key);
        let wildcard = node.children.get("*");
        match (exact, wildcard) {
            (None, None) => out.push(UnknownField {
                location,
                path: child_path,
                value: child_value.clone(),
            }),
            (Some(branch), None) | (None, Some(branch)) => {
                walk(branch, child_value, &child_path, location, out);
            }
            (Some(exact_branch), Some(wildcard_branch)) => {
                // Either branch yielding zero unknowns rescues the key.
                let mut from_exact = Vec::new();
                walk(exact_branch, child_value, &child_path, location, &mut from_exact);
                if from_exact.is_empty() {
                    continue;
                }
                let mut from_wildcard = Vec::new();
                walk(
                    wildcard_branch,
                    child_value,
                    &child_path,
                    location,
                    &mut from_wildcard,
                );
                if from_wildcard.is_empty() {
                    continue;
                }
                out.append(&mut from_exact);
            }
        }
    }
}

/// Options for [`check_exact`].
#[derive(Debug, Clone, Default)]
pub struct ExactOptions {
    /// Locations to scan for unknown fields. Empty means the default set:
    /// body, params and query.
    pub locations: Vec<Location>,
    /// Message for the unknown-fields error. Defaults to
    /// `"Unknown field(s)"`.
    pub message: Option<String>,
}

/// Runs the given chains, then reports any address in the scanned
/// locations that none of their selectors covers.
///
/// A non-empty unknown list attaches one unknown-fields error to the
/// request, wrapping the offending instances.
///
/// # Example
///
/// ```rust
/// use dragnet::{check, check_exact, validation_result, ExactOptions, Location, Request};
/// use serde_json::json;
///
/// let mut req = Request::new().with_query(json!({ "foo": "1", "extra": "?" }));
/// let chain = check("foo", &[Location::Query]);
/// check_exact(&mut req, vec![chain], ExactOptions {
///     locations: vec![Location::Query],
///     ..ExactOptions::default()
/// }).unwrap();
///
/// let result = validation_result(&req);
/// assert!(!result.is_empty());
/// ```
pub fn check_exact(
    req: &mut Request,
    chains: Vec<ValidationChain>,
    options: ExactOptions,
) -> Result<(), RunError> {
    let known: Vec<(Vec<Selector>, Vec<Location>)> = chains
        .iter()
        .map(|chain| (chain.fields().to_vec(), chain.locations().to_vec()))
        .collect();
    for chain in &chains {
        chain.run(req)?;
    }

    let default_locations = [Location::Body, Location::Params, Location::Query];
    let locations: &[Location] = if options.locations.is_empty() {
        &default_locations
    } else {
        &options.locations
    };

    let unknowns = find_unknown_fields(req, &known, locations);
    let mut context = Context::surrogate();
    if !unknowns.is_empty() {
        context.add_error(ValidationError::UnknownFields {
            message: options
                .message
                .unwrap_or_else(|| "Unknown field(s)".to_string()),
            fields: unknowns,
        });
    }
    req.push_context(context);
    Ok(())
}

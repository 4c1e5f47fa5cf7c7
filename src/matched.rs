//! Extraction of values that passed validation.
//!
//! [`matched_data`] is the output companion of the pipeline: after chains
//! have run, it collects the (sanitized) value of every instance that
//! produced no field error, keyed by canonical path.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ValidationError;
use crate::request::{Location, Request};

/// Options for [`matched_data`].
#[derive(Debug, Clone, Default)]
pub struct MatchedDataOptions {
    /// Restrict to these locations. Empty means every location.
    pub locations: Vec<Location>,
    /// Include instances whose value is absent, as nulls. By default
    /// absent values are skipped.
    pub include_optionals: bool,
}

/// Collects the validated value of every error-free instance across the
/// request's finished contexts, in encounter order, keyed by canonical
/// path. Later chains overwrite earlier ones for the same path.
///
/// # Example
///
/// ```rust
/// use dragnet::{body, matched_data, MatchedDataOptions, Request};
/// use serde_json::json;
///
/// let mut req = Request::new().with_body(json!({ "name": "Alice", "age": "x" }));
/// body("name").custom(|v, _| Ok(v.is_some())).run(&mut req).unwrap();
/// body("age")
///     .custom(|v, _| Ok(v.and_then(|v| v.as_str()).is_some_and(|s| s.parse::<u32>().is_ok())))
///     .run(&mut req)
///     .unwrap();
///
/// let data = matched_data(&req, &MatchedDataOptions::default());
/// assert_eq!(data.get("name"), Some(&json!("Alice")));
/// assert_eq!(data.get("age"), None);
/// ```
pub fn matched_data(req: &Request, options: &MatchedDataOptions) -> IndexMap<String, Value> {
    let mut data = IndexMap::new();
    for context in req.contexts() {
        let errored: HashSet<(Location, String)> = context
            .errors()
            .iter()
            .filter_map(|error| match error {
                ValidationError::Field { location, path, .. } => {
                    Some((*location, path.to_string()))
                }
                _ => None,
            })
            .collect();
        for instance in context.instances() {
            if !options.locations.is_empty() && !options.locations.contains(&instance.location) {
                continue;
            }
            let key = instance.path.to_string();
            if errored.contains(&(instance.location, key.clone())) {
                continue;
            }
            match &instance.value {
                Some(value) => {
                    data.insert(key, value.clone());
                }
                None if options.include_optionals => {
                    data.insert(key, Value::Null);
                }
                None => {}
            }
        }
    }
    data
}

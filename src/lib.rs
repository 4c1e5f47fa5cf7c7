//! # Dragnet
//!
//! A field selection and validation pipeline for nested request data.
//! Selectors with dot/bracket notation and wildcards address values
//! inside the request's location trees; ordered sanitization and
//! validation items run over every selected instance; and ALL failures
//! are accumulated into addressable error records rather than
//! short-circuiting on the first one.
//!
//! ## Overview
//!
//! A [`ValidationChain`] describes what to select (`users.*.email` in
//! `body`, say) and what to do with it. Running the chain threads its
//! instances through a fixed pipeline — select, sanitize, drop optionals,
//! narrow multi-location groups, persist sanitized values back, validate
//! — and attaches the outcome to the [`Request`]. Any number of chains
//! can run against one request; [`validation_result`] flattens all of
//! their errors afterwards.
//!
//! ## Core Types
//!
//! - [`Selector`]: a field pattern (`a.b`, `a[0]`, `*`, `**`, escapes)
//! - [`FieldPath`]: one concrete address, with a canonical textual form
//! - [`FieldInstance`]: one selected (location, address, value) tuple
//! - [`ValidationChain`]: the per-field builder and runner
//! - [`ValidationError`]: a field, alternative, or unknown-fields error
//! - [`ValidationOutcome`]: the aggregated view over a whole request
//!
//! ## Example
//!
//! ```rust
//! use dragnet::{body, validation_result, Request};
//! use serde_json::{json, Value};
//!
//! let mut req = Request::new().with_body(json!({
//!     "users": [
//!         { "email": "a@b.com" },
//!         { "email": "not-an-email" },
//!     ]
//! }));
//!
//! body("users.*.email")
//!     .custom(|value, _meta| {
//!         Ok(value
//!             .and_then(Value::as_str)
//!             .is_some_and(|s| s.contains('@')))
//!     })
//!     .error("must be an email address")
//!     .run(&mut req)
//!     .unwrap();
//!
//! let result = validation_result(&req);
//! assert_eq!(result.array().len(), 1);
//! assert_eq!(
//!     result.array()[0].path(),
//!     Some("users[1].email".to_string())
//! );
//! ```

pub mod catalog;
pub mod chain;
pub mod combinators;
pub mod context;
pub mod error;
pub mod expand;
pub mod matched;
pub mod path;
pub mod pipeline;
pub mod request;
pub mod result;
pub mod select;
pub mod selector;
pub mod unknown;

pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use chain::{
    body, check, cookie, header, param, query, IntoFields, RunError, ValidationChain,
};
pub use combinators::{one_of, OneOfGroup};
pub use context::{
    coerce_to_string, Context, CustomError, FieldMeta, Message, OptionalOptions, WorkItem,
};
pub use error::{ValidationError, ValidationErrors};
pub use expand::{expand, lookup, Expansion};
pub use matched::{matched_data, MatchedDataOptions};
pub use path::{FieldPath, PathSegment};
pub use request::{Location, Request};
pub use result::{
    validation_result, with_defaults, ErrorFormatter, ResultFactory, ValidationFailure,
    ValidationOutcome,
};
pub use select::{select_fields, FieldInstance};
pub use selector::{Selector, SelectorSegment};
pub use unknown::{check_exact, find_unknown_fields, ExactOptions, UnknownField};

/// Type alias for pipeline verdicts using ValidationErrors.
pub type Verdict<T> = stillwater::Validation<T, ValidationErrors>;

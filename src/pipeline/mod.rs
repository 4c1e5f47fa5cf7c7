//! The execution pipeline.
//!
//! A chain invocation threads an initially empty instance list through
//! six composable stages in fixed order:
//!
//! 1. [`select`] — expand the context's fields × locations, seed instances
//! 2. [`sanitize`] — fold the ordered sanitization items over each value
//! 3. [`remove_optionals`] — drop absent/empty instances per the policy
//! 4. [`ensure_instance`] — narrow multi-location groups to one candidate
//! 5. [`persist_back`] — write sanitized values back into the request
//! 6. [`validate`] — fold the validation items, accumulate errors
//!
//! Validate is terminal: its verdict carries either the surviving
//! instances or the full accumulated error list. Every instance is
//! processed to completion before the verdict; failures never
//! short-circuit sibling instances.
//!
//! Sanitize and Validate fan instances out across threads and join them
//! all before the next stage; work items for a single instance stay
//! strictly sequential, since a later item may depend on the value a
//! sanitizer just produced.

mod ensure;
mod optionals;
mod persist;
mod sanitize;
mod select;
mod validate;

pub use ensure::ensure_instance;
pub use optionals::remove_optionals;
pub use persist::persist_back;
pub use sanitize::sanitize;
pub use select::select;
pub use validate::validate;

pub(crate) use validate::collect_errors;

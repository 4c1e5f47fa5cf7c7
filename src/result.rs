//! Result aggregation over a request's finished contexts.
//!
//! [`validation_result`] flattens the error lists of every context
//! attached to a request into one [`ValidationOutcome`], offering full,
//! first-per-path, and mapped views plus a raising form. A pluggable
//! formatter maps each raw error to a caller-chosen shape;
//! [`with_defaults`] captures a formatter once for reuse.

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::error::{ValidationError, ValidationErrors};
use crate::request::Request;

/// Maps a raw error record to a caller-chosen shape.
pub type ErrorFormatter<T> = Arc<dyn Fn(&ValidationError) -> T + Send + Sync>;

/// The aggregated outcome of every chain run against one request.
///
/// Errors appear in encounter order: context by context in run order,
/// each context's errors in instance order.
///
/// # Example
///
/// ```rust
/// use dragnet::{body, validation_result, Request};
/// use serde_json::json;
///
/// let mut req = Request::new().with_body(json!({}));
/// body("name").custom(|v, _| Ok(v.is_some())).error("required").run(&mut req).unwrap();
///
/// let result = validation_result(&req);
/// assert!(!result.is_empty());
/// assert_eq!(result.mapped()["name"].message(), "required");
/// ```
pub struct ValidationOutcome<T = ValidationError> {
    errors: Vec<ValidationError>,
    formatter: ErrorFormatter<T>,
}

impl<T> ValidationOutcome<T> {
    /// Returns true when no chain recorded any error.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns every formatted error in encounter order.
    pub fn array(&self) -> Vec<T> {
        self.errors.iter().map(|e| (self.formatter)(e)).collect()
    }

    /// Returns the formatted errors narrowed to one per path, first
    /// occurrence wins. Non-field errors share the `_error` key.
    pub fn first_by_path(&self) -> Vec<T> {
        let mut seen = IndexMap::new();
        for error in &self.errors {
            seen.entry(error.mapping_key()).or_insert(error);
        }
        seen.into_values().map(|e| (self.formatter)(e)).collect()
    }

    /// Returns a one-per-path mapping of formatted errors, last
    /// occurrence wins. Non-field errors share the `_error` key.
    pub fn mapped(&self) -> IndexMap<String, T> {
        let mut mapping = IndexMap::new();
        for error in &self.errors {
            mapping.insert(error.mapping_key(), (self.formatter)(error));
        }
        mapping
    }

    /// Returns the raw error records, unformatted.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// The raising form: Ok when empty, otherwise a
    /// [`ValidationFailure`] carrying the same read API as the outcome.
    pub fn into_result(self) -> Result<(), ValidationFailure> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure(ValidationErrors::from_vec(self.errors)))
        }
    }

    /// Returns the same outcome viewed through a different formatter.
    pub fn format_with<U>(
        &self,
        formatter: impl Fn(&ValidationError) -> U + Send + Sync + 'static,
    ) -> ValidationOutcome<U> {
        ValidationOutcome {
            errors: self.errors.clone(),
            formatter: Arc::new(formatter),
        }
    }
}

/// Aggregates a request's contexts with the identity formatter.
pub fn validation_result(req: &Request) -> ValidationOutcome<ValidationError> {
    ValidationOutcome {
        errors: collect_errors(req),
        formatter: Arc::new(ValidationError::clone),
    }
}

fn collect_errors(req: &Request) -> Vec<ValidationError> {
    req.contexts()
        .iter()
        .flat_map(|context| context.errors().iter().cloned())
        .collect()
}

/// A result factory with a captured formatter, so call sites do not
/// repeat it per request.
///
/// ```rust
/// use dragnet::{body, with_defaults, Request};
/// use serde_json::json;
///
/// let only_messages = with_defaults(|error| error.message().to_string());
///
/// let mut req = Request::new().with_body(json!({}));
/// body("name").custom(|v, _| Ok(v.is_some())).error("required").run(&mut req).unwrap();
///
/// assert_eq!(only_messages.validation_result(&req).array(), vec!["required"]);
/// ```
pub struct ResultFactory<T> {
    formatter: ErrorFormatter<T>,
}

impl<T> ResultFactory<T> {
    /// Aggregates a request's contexts through the captured formatter.
    pub fn validation_result(&self, req: &Request) -> ValidationOutcome<T> {
        ValidationOutcome {
            errors: collect_errors(req),
            formatter: Arc::clone(&self.formatter),
        }
    }
}

/// Captures an error formatter for reuse across requests.
pub fn with_defaults<T>(
    formatter: impl Fn(&ValidationError) -> T + Send + Sync + 'static,
) -> ResultFactory<T> {
    ResultFactory {
        formatter: Arc::new(formatter),
    }
}

/// An accumulated error list raised as a single error value.
///
/// Carries the same read API as a non-raising outcome, so callers can
/// treat validation failure and exceptional failure uniformly.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct ValidationFailure(ValidationErrors);

impl ValidationFailure {
    /// The accumulated errors.
    pub fn errors(&self) -> &ValidationErrors {
        &self.0
    }

    /// Every error in encounter order.
    pub fn array(&self) -> Vec<ValidationError> {
        self.0.iter().cloned().collect()
    }

    /// A one-per-path mapping, last occurrence wins.
    pub fn mapped(&self) -> IndexMap<String, ValidationError> {
        let mut mapping = IndexMap::new();
        for error in self.0.iter() {
            mapping.insert(error.mapping_key(), error.clone());
        }
        mapping
    }
}

//! Validation error records and their accumulated collection.

use std::fmt::{self, Display};

use serde_json::Value;
use stillwater::prelude::*;

use crate::path::FieldPath;
use crate::request::Location;
use crate::unknown::UnknownField;

/// A single validation error with full addressing context.
///
/// Three kinds of failure are recorded:
/// - **Field**: one instance failed one validation item.
/// - **Alternative**: every group of an "any of" alternative failed; the
///   nested field errors are preserved.
/// - **UnknownFields**: the request contained addresses no selector
///   covers.
///
/// All three carry a resolved message; the resolution priority is the
/// item's own message, then the failure cause's message, then the
/// context's message, then the literal fallback `"Invalid value"`.
///
/// # Example
///
/// ```rust
/// use dragnet::{FieldPath, Location, ValidationError};
/// use serde_json::json;
///
/// let error = ValidationError::field(
///     Location::Body,
///     FieldPath::root().push_key("email"),
///     Some(json!("not-an-email")),
///     "invalid email",
/// );
/// assert_eq!(error.message(), "invalid email");
/// assert_eq!(error.path(), Some("email".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// One instance failed one validation item.
    Field {
        /// The location the instance was selected from.
        location: Location,
        /// The instance's canonical address.
        path: FieldPath,
        /// The value as it was at selection time.
        value: Option<Value>,
        /// The resolved failure message.
        message: String,
    },
    /// Every alternative of an "any of" grouping failed.
    Alternative {
        /// The resolved failure message.
        message: String,
        /// The field errors of every failed alternative, in group order.
        nested: Vec<ValidationError>,
    },
    /// Addresses present in the request that no selector covers.
    UnknownFields {
        /// The resolved failure message.
        message: String,
        /// The uncovered addresses, in discovery order.
        fields: Vec<UnknownField>,
    },
}

impl ValidationError {
    /// Creates a field error.
    pub fn field(
        location: Location,
        path: FieldPath,
        value: Option<Value>,
        message: impl Into<String>,
    ) -> Self {
        ValidationError::Field {
            location,
            path,
            value,
            message: message.into(),
        }
    }

    /// Returns the resolved message.
    pub fn message(&self) -> &str {
        match self {
            ValidationError::Field { message, .. }
            | ValidationError::Alternative { message, .. }
            | ValidationError::UnknownFields { message, .. } => message,
        }
    }

    /// Returns the canonical path for field errors, None otherwise.
    pub fn path(&self) -> Option<String> {
        match self {
            ValidationError::Field { path, .. } => Some(path.to_string()),
            _ => None,
        }
    }

    /// Returns the location for field errors, None otherwise.
    pub fn location(&self) -> Option<Location> {
        match self {
            ValidationError::Field { location, .. } => Some(*location),
            _ => None,
        }
    }

    /// The key this error occupies in per-path views: the canonical path
    /// for field errors, `"_error"` for the other kinds.
    pub fn mapping_key(&self) -> String {
        match self {
            ValidationError::Field { path, .. } => path.to_string(),
            _ => "_error".to_string(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Field {
                location,
                path,
                message,
                ..
            } => {
                let path_str = if path.is_root() {
                    "(root)".to_string()
                } else {
                    path.to_string()
                };
                write!(f, "{} in {}: {}", path_str, location, message)
            }
            ValidationError::Alternative { message, nested } => {
                write!(f, "{} ({} nested error(s))", message, nested.len())
            }
            ValidationError::UnknownFields { message, fields } => {
                write!(f, "{} ({} unknown field(s))", message, fields.len())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

// ValidationError stays Send + Sync as long as every field is an owned
// type; these assertions keep that true if the types change.
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};

/// A non-empty collection of validation errors.
///
/// `ValidationErrors` wraps a `NonEmptyVec<ValidationError>` so that a
/// failed pipeline verdict always carries at least one error. It
/// implements `Semigroup`, letting error lists from multiple contexts
/// combine in encounter order.
///
/// ```rust
/// use dragnet::{FieldPath, Location, ValidationError, ValidationErrors};
/// use stillwater::prelude::*;
///
/// let a = ValidationErrors::single(ValidationError::field(
///     Location::Body,
///     FieldPath::root().push_key("name"),
///     None,
///     "required",
/// ));
/// let b = ValidationErrors::single(ValidationError::field(
///     Location::Body,
///     FieldPath::root().push_key("email"),
///     None,
///     "invalid format",
/// ));
///
/// assert_eq!(a.combine(b).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(NonEmptyVec<ValidationError>);

impl ValidationErrors {
    /// Creates a collection containing a single error.
    pub fn single(error: ValidationError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a collection from a `NonEmptyVec` of errors.
    pub fn from_non_empty(errors: NonEmptyVec<ValidationError>) -> Self {
        Self(errors)
    }

    /// Creates a collection from a `Vec` of errors.
    ///
    /// # Panics
    ///
    /// Panics if the provided vec is empty.
    pub fn from_vec(errors: Vec<ValidationError>) -> Self {
        Self(NonEmptyVec::from_vec(errors).expect("ValidationErrors requires at least one error"))
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns false; the collection is guaranteed non-empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Returns the first error in the collection.
    pub fn first(&self) -> &ValidationError {
        self.0.head()
    }

    /// Returns every error whose canonical path equals `path`.
    pub fn at_path(&self, path: &str) -> Vec<&ValidationError> {
        self.0
            .iter()
            .filter(|e| e.path().as_deref() == Some(path))
            .collect()
    }

    /// Converts this collection into a `Vec<ValidationError>`.
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0.into_vec()
    }
}

impl Semigroup for ValidationErrors {
    fn combine(self, other: Self) -> Self {
        ValidationErrors(self.0.combine(other.0))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = Box<dyn Iterator<Item = &'a ValidationError> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

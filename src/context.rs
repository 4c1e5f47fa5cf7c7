//! Per-chain execution state.
//!
//! A [`Context`] is the mutable record behind one chain invocation: the
//! selectors and locations to read, the ordered stack of [`WorkItem`]s to
//! apply, the optionality policy, and the errors accumulated while the
//! pipeline runs. Each chain owns its context exclusively: the builder
//! mutates it before the run, the pipeline runners during the run, and
//! nothing else ever. Contexts from different chains are never merged;
//! the result aggregator only concatenates their error lists.
//!
//! Work items are a closed tagged union rather than bare callables
//! because the two calling conventions differ structurally: *standard*
//! functions receive the string-coerced value plus fixed options, while
//! *custom* functions receive the raw value and field metadata.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::chain::ValidationChain;
use crate::error::ValidationError;
use crate::path::FieldPath;
use crate::request::{Location, Request};
use crate::select::FieldInstance;
use crate::selector::Selector;

/// The error type user-supplied custom functions may fail with.
pub type CustomError = Box<dyn std::error::Error + Send + Sync>;

/// A standard validator: string-coerced value plus fixed options.
pub type StandardValidatorFn = Arc<dyn Fn(&str, &[Value]) -> bool + Send + Sync>;

/// A standard sanitizer: string-coerced value plus fixed options, returns
/// the replacement value.
pub type StandardSanitizerFn = Arc<dyn Fn(&str, &[Value]) -> Value + Send + Sync>;

/// A custom validator: raw value (None when absent) plus field metadata.
pub type CustomValidatorFn =
    Arc<dyn Fn(Option<&Value>, &FieldMeta<'_>) -> Result<bool, CustomError> + Send + Sync>;

/// A custom sanitizer: raw value plus field metadata, returns the
/// replacement value (None removes it).
pub type CustomSanitizerFn =
    Arc<dyn Fn(Option<&Value>, &FieldMeta<'_>) -> Option<Value> + Send + Sync>;

/// A dynamic message: original value plus field metadata.
pub type DynamicMessageFn = Arc<dyn Fn(Option<&Value>, &FieldMeta<'_>) -> String + Send + Sync>;

/// Metadata handed to custom functions alongside the value.
pub struct FieldMeta<'a> {
    /// The request being processed.
    pub request: &'a Request,
    /// The location the instance was selected from.
    pub location: Location,
    /// The instance's current address.
    pub path: &'a FieldPath,
}

/// Policy for dropping absent/empty instances before validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalOptions {
    /// Additionally drop any falsy value (`null`, `false`, `0`, `""`).
    pub check_falsy: bool,
    /// Additionally drop `null` values.
    pub nullable: bool,
}

/// An error message, either fixed text or computed per failure.
#[derive(Clone)]
pub enum Message {
    /// A fixed message.
    Text(String),
    /// A message computed from the original value and field metadata.
    Dynamic(DynamicMessageFn),
}

impl Message {
    /// Creates a dynamic message from a closure.
    pub fn dynamic(
        func: impl Fn(Option<&Value>, &FieldMeta<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        Message::Dynamic(Arc::new(func))
    }

    /// Resolves the message for a failure on the given original value.
    pub(crate) fn resolve(&self, original_value: Option<&Value>, meta: &FieldMeta<'_>) -> String {
        match self {
            Message::Text(text) => text.clone(),
            Message::Dynamic(func) => func(original_value, meta),
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Message::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// One step in a context's ordered work stack.
#[derive(Clone)]
pub enum WorkItem {
    /// A catalog-convention validator over the string-coerced value.
    /// Sequences are validated once per element.
    StandardValidation {
        /// Catalog name, kept for diagnostics.
        name: String,
        /// The predicate.
        func: StandardValidatorFn,
        /// Fixed options appended to every call.
        options: Vec<Value>,
        /// Inverts the pass/fail test.
        negated: bool,
        /// Item-level failure message.
        message: Option<Message>,
    },
    /// A user validator over the raw value.
    CustomValidation {
        /// The predicate.
        func: CustomValidatorFn,
        /// Inverts the pass/fail test.
        negated: bool,
        /// Item-level failure message.
        message: Option<Message>,
    },
    /// A catalog-convention sanitizer over the string-coerced value.
    StandardSanitization {
        /// Catalog name, kept for diagnostics.
        name: String,
        /// The transformer.
        func: StandardSanitizerFn,
        /// Fixed options appended to every call.
        options: Vec<Value>,
    },
    /// A user sanitizer over the raw value; its return value replaces the
    /// instance value unconditionally.
    CustomSanitization {
        /// The transformer.
        func: CustomSanitizerFn,
    },
    /// A predicate gating the rest of the stack for one instance. A falsy
    /// or failed outcome halts that instance silently.
    CustomCondition {
        /// The predicate.
        func: CustomValidatorFn,
    },
    /// A nested chain gating the rest of the stack for one instance. The
    /// chain runs in non-persisting mode; any error it accumulates halts
    /// the instance silently.
    ChainCondition {
        /// The gating chain.
        chain: Box<ValidationChain>,
    },
    /// Halts the instance's remaining stack if it already has at least
    /// one accumulated error.
    Bail,
    /// A catalog name that failed to resolve at build time. Surfaces as a
    /// framework-level run error, never as a field error.
    MissingCatalogEntry {
        /// The unresolved name.
        name: String,
    },
}

impl WorkItem {
    /// Returns true for sanitization items (applied by the Sanitize stage).
    pub fn is_sanitization(&self) -> bool {
        matches!(
            self,
            WorkItem::StandardSanitization { .. } | WorkItem::CustomSanitization { .. }
        )
    }

    /// Returns true for validation items (applied by the Validate stage).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WorkItem::StandardValidation { .. } | WorkItem::CustomValidation { .. }
        )
    }
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkItem::StandardValidation { name, negated, .. } => f
                .debug_struct("StandardValidation")
                .field("name", name)
                .field("negated", negated)
                .finish_non_exhaustive(),
            WorkItem::CustomValidation { negated, .. } => f
                .debug_struct("CustomValidation")
                .field("negated", negated)
                .finish_non_exhaustive(),
            WorkItem::StandardSanitization { name, .. } => f
                .debug_struct("StandardSanitization")
                .field("name", name)
                .finish_non_exhaustive(),
            WorkItem::CustomSanitization { .. } => f.write_str("CustomSanitization(..)"),
            WorkItem::CustomCondition { .. } => f.write_str("CustomCondition(..)"),
            WorkItem::ChainCondition { .. } => f.write_str("ChainCondition(..)"),
            WorkItem::Bail => f.write_str("Bail"),
            WorkItem::MissingCatalogEntry { name } => f
                .debug_struct("MissingCatalogEntry")
                .field("name", name)
                .finish(),
        }
    }
}

/// The mutable record behind one chain invocation.
#[derive(Debug)]
pub struct Context {
    pub(crate) fields: Vec<Selector>,
    pub(crate) locations: Vec<Location>,
    pub(crate) stack: Vec<WorkItem>,
    pub(crate) optional: Option<OptionalOptions>,
    pub(crate) message: Option<Message>,
    pub(crate) errors: Vec<ValidationError>,
    pub(crate) instances: Vec<FieldInstance>,
}

impl Context {
    pub(crate) fn new(
        fields: Vec<Selector>,
        locations: Vec<Location>,
        stack: Vec<WorkItem>,
        optional: Option<OptionalOptions>,
        message: Option<Message>,
    ) -> Self {
        Self {
            fields,
            locations,
            stack,
            optional,
            message,
            errors: Vec::new(),
            instances: Vec::new(),
        }
    }

    /// A context with no fields or work items, used as the carrier for
    /// errors produced outside any single chain (alternative grouping,
    /// unknown-field detection).
    pub(crate) fn surrogate() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), None, None)
    }

    /// The selectors this context reads.
    pub fn fields(&self) -> &[Selector] {
        &self.fields
    }

    /// The locations this context reads.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// The optionality policy, if any.
    pub fn optional(&self) -> Option<OptionalOptions> {
        self.optional
    }

    /// The ordered work stack.
    pub fn stack(&self) -> &[WorkItem] {
        &self.stack
    }

    /// Errors accumulated by this context's run, in encounter order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// The field instances that survived the run's filtering stages.
    pub fn instances(&self) -> &[FieldInstance] {
        &self.instances
    }

    pub(crate) fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }
}

/// Coerces a value to the string form standard catalog functions consume.
///
/// Strings pass through unchanged; numbers and booleans render via
/// `Display`; null, absent values, and non-scalar trees coerce to the
/// empty string.
pub fn coerce_to_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

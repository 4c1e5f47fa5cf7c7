//! Validation chains: the builder and runner for one context.
//!
//! A [`ValidationChain`] accumulates selectors, locations and work items
//! through a fluent builder, then [`run`](ValidationChain::run)s them as
//! one pipeline invocation against a request. Each run builds a fresh
//! [`Context`] owned exclusively by that invocation; the chain itself is
//! reusable and cheap to clone.
//!
//! Chains do not fail on invalid data — validation errors accumulate on
//! the request for later aggregation. Only framework-level faults, such
//! as a work item referencing a catalog name that was never registered,
//! abort a run with a [`RunError`].

use serde_json::Value;
use thiserror::Error;

use crate::catalog::{Catalog, CatalogEntry};
use crate::context::{
    Context, CustomError, FieldMeta, Message, OptionalOptions, WorkItem,
};
use crate::pipeline;
use crate::request::{Location, Request};
use crate::selector::Selector;
use std::sync::Arc;

/// A framework-level fault that aborts a chain run.
///
/// Distinct from validation errors, which accumulate on the request and
/// never abort the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// A work item referenced a catalog name with no registered function.
    #[error("no validator or sanitizer named '{0}' is registered in the catalog")]
    UnknownCatalogEntry(String),
}

/// Conversion of the various ways callers spell a field list.
pub trait IntoFields {
    /// Produces the parsed selectors.
    fn into_fields(self) -> Vec<Selector>;
}

impl IntoFields for &str {
    fn into_fields(self) -> Vec<Selector> {
        vec![Selector::parse(self)]
    }
}

impl IntoFields for String {
    fn into_fields(self) -> Vec<Selector> {
        vec![Selector::parse(&self)]
    }
}

impl IntoFields for Selector {
    fn into_fields(self) -> Vec<Selector> {
        vec![self]
    }
}

impl IntoFields for &[&str] {
    fn into_fields(self) -> Vec<Selector> {
        self.iter().map(|f| Selector::parse(f)).collect()
    }
}

impl<const N: usize> IntoFields for [&str; N] {
    fn into_fields(self) -> Vec<Selector> {
        self.iter().map(|f| Selector::parse(f)).collect()
    }
}

impl IntoFields for Vec<&str> {
    fn into_fields(self) -> Vec<Selector> {
        self.iter().map(|f| Selector::parse(f)).collect()
    }
}

impl IntoFields for Vec<Selector> {
    fn into_fields(self) -> Vec<Selector> {
        self
    }
}

/// Creates a chain over the given fields and locations.
///
/// An empty location slice means every location.
///
/// # Example
///
/// ```rust
/// use dragnet::{check, validation_result, Location, Request};
/// use serde_json::json;
///
/// let mut req = Request::new().with_body(json!({ "age": "not a number" }));
///
/// check("age", &[Location::Body])
///     .custom(|value, _meta| Ok(value.and_then(|v| v.as_str()).is_some_and(|s| s.parse::<u32>().is_ok())))
///     .error("age must be a number")
///     .run(&mut req)
///     .unwrap();
///
/// let result = validation_result(&req);
/// assert_eq!(result.array()[0].message(), "age must be a number");
/// ```
pub fn check(fields: impl IntoFields, locations: &[Location]) -> ValidationChain {
    let locations = if locations.is_empty() {
        Location::ALL.to_vec()
    } else {
        locations.to_vec()
    };
    ValidationChain::new(fields.into_fields(), locations)
}

/// Creates a chain over the request body.
pub fn body(fields: impl IntoFields) -> ValidationChain {
    check(fields, &[Location::Body])
}

/// Creates a chain over the query parameters.
pub fn query(fields: impl IntoFields) -> ValidationChain {
    check(fields, &[Location::Query])
}

/// Creates a chain over the route parameters.
pub fn param(fields: impl IntoFields) -> ValidationChain {
    check(fields, &[Location::Params])
}

/// Creates a chain over the request headers.
pub fn header(fields: impl IntoFields) -> ValidationChain {
    check(fields, &[Location::Headers])
}

/// Creates a chain over the request cookies.
pub fn cookie(fields: impl IntoFields) -> ValidationChain {
    check(fields, &[Location::Cookies])
}

/// A reusable validation chain: selectors, locations, and an ordered
/// stack of work items.
#[derive(Debug, Clone)]
pub struct ValidationChain {
    fields: Vec<Selector>,
    locations: Vec<Location>,
    stack: Vec<WorkItem>,
    optional: Option<OptionalOptions>,
    message: Option<Message>,
    negate_next: bool,
}

impl ValidationChain {
    /// Creates a chain from parsed selectors and explicit locations.
    pub fn new(fields: Vec<Selector>, locations: Vec<Location>) -> Self {
        Self {
            fields,
            locations,
            stack: Vec::new(),
            optional: None,
            message: None,
            negate_next: false,
        }
    }

    /// The selectors this chain reads.
    pub fn fields(&self) -> &[Selector] {
        &self.fields
    }

    /// The locations this chain reads.
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Adds a custom validator over the raw value.
    ///
    /// The validator receives the instance's current value (None when
    /// absent) and field metadata. Returning `Ok(false)` or `Err` fails
    /// the item; the error's rendering becomes the failure cause.
    pub fn custom(
        mut self,
        func: impl Fn(Option<&Value>, &FieldMeta<'_>) -> Result<bool, CustomError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        let negated = std::mem::take(&mut self.negate_next);
        self.stack.push(WorkItem::CustomValidation {
            func: Arc::new(func),
            negated,
            message: None,
        });
        self
    }

    /// Adds a standard validator: a named predicate over the
    /// string-coerced value with fixed options, following the catalog
    /// calling convention.
    pub fn validate_with(
        mut self,
        name: impl Into<String>,
        func: impl Fn(&str, &[Value]) -> bool + Send + Sync + 'static,
        options: Vec<Value>,
    ) -> Self {
        let negated = std::mem::take(&mut self.negate_next);
        self.stack.push(WorkItem::StandardValidation {
            name: name.into(),
            func: Arc::new(func),
            options,
            negated,
            message: None,
        });
        self
    }

    /// Adds a custom sanitizer over the raw value. Its return value
    /// becomes the instance value unconditionally; None removes it.
    pub fn custom_sanitizer(
        mut self,
        func: impl Fn(Option<&Value>, &FieldMeta<'_>) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.stack
            .push(WorkItem::CustomSanitization { func: Arc::new(func) });
        self
    }

    /// Adds a standard sanitizer: a named transformer over the
    /// string-coerced value with fixed options.
    pub fn sanitize_with(
        mut self,
        name: impl Into<String>,
        func: impl Fn(&str, &[Value]) -> Value + Send + Sync + 'static,
        options: Vec<Value>,
    ) -> Self {
        self.stack.push(WorkItem::StandardSanitization {
            name: name.into(),
            func: Arc::new(func),
            options,
        });
        self
    }

    /// Adds the named catalog entry, validator or sanitizer, with the
    /// given fixed options.
    ///
    /// An unknown name is recorded and surfaces as a
    /// [`RunError::UnknownCatalogEntry`] when the chain runs — a
    /// framework fault, never a field error.
    pub fn uses(mut self, catalog: &Catalog, name: &str, options: Vec<Value>) -> Self {
        match catalog.get(name) {
            Some(CatalogEntry::Validator(func)) => {
                let negated = std::mem::take(&mut self.negate_next);
                self.stack.push(WorkItem::StandardValidation {
                    name: name.to_string(),
                    func,
                    options,
                    negated,
                    message: None,
                });
            }
            Some(CatalogEntry::Sanitizer(func)) => {
                self.stack.push(WorkItem::StandardSanitization {
                    name: name.to_string(),
                    func,
                    options,
                });
            }
            None => {
                self.stack.push(WorkItem::MissingCatalogEntry {
                    name: name.to_string(),
                });
            }
        }
        self
    }

    /// Inverts the pass/fail test of the next validation item.
    pub fn not(mut self) -> Self {
        self.negate_next = true;
        self
    }

    /// Marks the chain optional with the default policy: instances whose
    /// value is absent are dropped before validation.
    pub fn optional(self) -> Self {
        self.optional_with(OptionalOptions::default())
    }

    /// Marks the chain optional with an explicit policy.
    pub fn optional_with(mut self, options: OptionalOptions) -> Self {
        self.optional = Some(options);
        self
    }

    /// Adds a bail marker: an instance with at least one accumulated
    /// error stops processing its remaining items.
    pub fn bail(mut self) -> Self {
        self.stack.push(WorkItem::Bail);
        self
    }

    /// Adds a condition predicate. An instance for which the predicate
    /// returns false (or fails) skips the rest of the stack without
    /// recording an error.
    pub fn when(
        mut self,
        func: impl Fn(Option<&Value>, &FieldMeta<'_>) -> Result<bool, CustomError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.stack
            .push(WorkItem::CustomCondition { func: Arc::new(func) });
        self
    }

    /// Adds a chain condition. The given chain runs in non-persisting
    /// mode against the same request; any error it accumulates makes the
    /// gated instance skip the rest of the stack, without recording an
    /// error of its own.
    pub fn when_chain(mut self, chain: ValidationChain) -> Self {
        self.stack.push(WorkItem::ChainCondition {
            chain: Box::new(chain),
        });
        self
    }

    /// Sets the failure message of the most recent validation item, or
    /// the chain-wide message when no validation item has been added yet.
    pub fn error(mut self, message: impl Into<Message>) -> Self {
        let message = message.into();
        let slot = self.stack.iter_mut().rev().find_map(|item| match item {
            WorkItem::StandardValidation { message, .. }
            | WorkItem::CustomValidation { message, .. } => Some(message),
            _ => None,
        });
        match slot {
            Some(slot) => *slot = Some(message),
            None => self.message = Some(message),
        }
        self
    }

    /// Runs the chain against the request, persisting sanitized values
    /// and attaching the finished context.
    ///
    /// Validation failures do not produce an `Err`; they accumulate on
    /// the request for [`validation_result`](crate::validation_result).
    pub fn run(&self, req: &mut Request) -> Result<(), RunError> {
        let mut context = self.build_context();
        let instances = pipeline::select(req, &context);
        let instances = pipeline::sanitize(req, &context, instances);
        let instances = pipeline::remove_optionals(&context, instances);
        let instances = pipeline::ensure_instance(&context, instances);
        pipeline::persist_back(req, &instances);
        let errors = pipeline::collect_errors(req, &context, &instances)?;
        context.instances = instances;
        context.errors.extend(errors);
        req.push_context(context);
        Ok(())
    }

    /// Runs the chain in non-persisting mode: sanitized values stay
    /// in-memory, nothing is written back, and the finished context is
    /// returned instead of attached to the request.
    pub fn dry_run(&self, req: &Request) -> Result<Context, RunError> {
        let mut context = self.build_context();
        let instances = pipeline::select(req, &context);
        let instances = pipeline::sanitize(req, &context, instances);
        let instances = pipeline::remove_optionals(&context, instances);
        let instances = pipeline::ensure_instance(&context, instances);
        let errors = pipeline::collect_errors(req, &context, &instances)?;
        context.instances = instances;
        context.errors.extend(errors);
        Ok(context)
    }

    fn build_context(&self) -> Context {
        Context::new(
            self.fields.clone(),
            self.locations.clone(),
            self.stack.clone(),
            self.optional,
            self.message.clone(),
        )
    }
}

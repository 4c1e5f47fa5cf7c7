//! Stage 6: apply validation and control items, accumulate errors.

use rayon::prelude::*;
use serde_json::Value;
use stillwater::Validation;

use crate::chain::RunError;
use crate::context::{
    coerce_to_string, Context, CustomError, FieldMeta, Message, StandardValidatorFn, WorkItem,
};
use crate::error::{ValidationError, ValidationErrors};
use crate::request::Request;
use crate::select::FieldInstance;

/// Folds the context's ordered validation and control items over each
/// instance and renders the terminal verdict: the surviving instances on
/// success, the full accumulated error list on failure.
///
/// All instances are validated to completion before the verdict — a
/// failing instance never short-circuits its siblings. Instances fan out
/// across threads; errors are collected in instance encounter order.
///
/// Control items act per instance: a failed condition halts that one
/// instance silently, and a bail halts it once it has at least one error.
pub fn validate(
    req: &Request,
    context: &Context,
    instances: Vec<FieldInstance>,
) -> Result<Validation<Vec<FieldInstance>, ValidationErrors>, RunError> {
    let errors = collect_errors(req, context, &instances)?;
    if errors.is_empty() {
        Ok(Validation::Success(instances))
    } else {
        Ok(Validation::Failure(ValidationErrors::from_vec(errors)))
    }
}

/// Runs every instance through the stack and returns the accumulated
/// errors without rendering a verdict.
pub(crate) fn collect_errors(
    req: &Request,
    context: &Context,
    instances: &[FieldInstance],
) -> Result<Vec<ValidationError>, RunError> {
    let per_instance: Result<Vec<Vec<ValidationError>>, RunError> = instances
        .par_iter()
        .map(|instance| validate_instance(req, context, instance))
        .collect();
    Ok(per_instance?.into_iter().flatten().collect())
}

fn validate_instance(
    req: &Request,
    context: &Context,
    instance: &FieldInstance,
) -> Result<Vec<ValidationError>, RunError> {
    let mut errors = Vec::new();
    for item in &context.stack {
        match item {
            WorkItem::StandardValidation {
                func,
                options,
                negated,
                message,
                ..
            } => {
                let passed = standard_passes(func, options, instance.value.as_ref());
                if passed == *negated {
                    errors.push(field_error(req, context, instance, message.as_ref(), None));
                }
            }
            WorkItem::CustomValidation {
                func,
                negated,
                message,
            } => {
                let meta = meta_for(req, instance);
                let (passed, cause) = match func(instance.value.as_ref(), &meta) {
                    Ok(passed) => (passed, None),
                    Err(cause) => (false, Some(cause)),
                };
                if passed == *negated {
                    errors.push(field_error(req, context, instance, message.as_ref(), cause));
                }
            }
            WorkItem::CustomCondition { func } => {
                let meta = meta_for(req, instance);
                let passed = func(instance.value.as_ref(), &meta).unwrap_or(false);
                if !passed {
                    break;
                }
            }
            WorkItem::ChainCondition { chain } => {
                let nested = chain.dry_run(req)?;
                if !nested.errors().is_empty() {
                    break;
                }
            }
            WorkItem::Bail => {
                if !errors.is_empty() {
                    break;
                }
            }
            WorkItem::MissingCatalogEntry { name } => {
                return Err(RunError::UnknownCatalogEntry(name.clone()));
            }
            WorkItem::StandardSanitization { .. } | WorkItem::CustomSanitization { .. } => {}
        }
    }
    Ok(errors)
}

/// Runs a standard predicate over the coerced value, once per element
/// when the value is a sequence. A sequence passes only if every element
/// does.
fn standard_passes(func: &StandardValidatorFn, options: &[Value], value: Option<&Value>) -> bool {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .all(|item| func(&coerce_to_string(Some(item)), options)),
        other => func(&coerce_to_string(other), options),
    }
}

fn meta_for<'a>(req: &'a Request, instance: &'a FieldInstance) -> FieldMeta<'a> {
    FieldMeta {
        request: req,
        location: instance.location,
        path: &instance.path,
    }
}

/// Builds a field error, resolving the message in priority order: the
/// item's own message, the failure cause, the context's message, the
/// literal fallback.
fn field_error(
    req: &Request,
    context: &Context,
    instance: &FieldInstance,
    item_message: Option<&Message>,
    cause: Option<CustomError>,
) -> ValidationError {
    let meta = meta_for(req, instance);
    let original_value = instance.original_value.as_ref();
    let message = if let Some(message) = item_message {
        message.resolve(original_value, &meta)
    } else if let Some(cause) = cause {
        cause.to_string()
    } else if let Some(message) = &context.message {
        message.resolve(original_value, &meta)
    } else {
        "Invalid value".to_string()
    };
    ValidationError::field(
        instance.location,
        instance.path.clone(),
        instance.original_value.clone(),
        message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::FieldPath;
    use crate::request::Location;
    use crate::selector::Selector;
    use serde_json::json;
    use std::sync::Arc;

    fn instance(value: Option<Value>) -> FieldInstance {
        FieldInstance {
            location: Location::Body,
            path: FieldPath::from_key("f"),
            original_path: "f".to_string(),
            original_value: value.clone(),
            value,
        }
    }

    fn context_with(stack: Vec<WorkItem>, message: Option<Message>) -> Context {
        Context::new(
            vec![Selector::parse("f")],
            vec![Location::Body],
            stack,
            None,
            message,
        )
    }

    fn custom(
        negated: bool,
        message: Option<Message>,
        func: impl Fn(Option<&Value>) -> Result<bool, CustomError> + Send + Sync + 'static,
    ) -> WorkItem {
        WorkItem::CustomValidation {
            func: Arc::new(move |value, _meta| func(value)),
            negated,
            message,
        }
    }

    #[test]
    fn test_failing_item_records_error() {
        let context = context_with(vec![custom(false, None, |_| Ok(false))], None);
        let req = Request::new();
        let errors = collect_errors(&req, &context, &[instance(Some(json!(1)))]).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "Invalid value");
    }

    #[test]
    fn test_negated_item_fails_on_truthy() {
        let context = context_with(vec![custom(true, None, |_| Ok(true))], None);
        let req = Request::new();
        let errors = collect_errors(&req, &context, &[instance(Some(json!(1)))]).unwrap();
        assert_eq!(errors.len(), 1);

        let context = context_with(vec![custom(true, None, |_| Ok(false))], None);
        let errors = collect_errors(&req, &context, &[instance(Some(json!(1)))]).unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_message_priority_cause_over_context() {
        let context = context_with(
            vec![custom(false, None, |_| Err("boom".into()))],
            Some(Message::from("context message")),
        );
        let req = Request::new();
        let errors = collect_errors(&req, &context, &[instance(Some(json!(1)))]).unwrap();
        assert_eq!(errors[0].message(), "boom");
    }

    #[test]
    fn test_message_priority_item_over_cause() {
        let context = context_with(
            vec![custom(false, Some(Message::from("nope")), |_| {
                Err("boom".into())
            })],
            None,
        );
        let req = Request::new();
        let errors = collect_errors(&req, &context, &[instance(Some(json!(1)))]).unwrap();
        assert_eq!(errors[0].message(), "nope");
    }

    #[test]
    fn test_context_message_used_when_item_has_none() {
        let context = context_with(
            vec![custom(false, None, |_| Ok(false))],
            Some(Message::from("chain-wide message")),
        );
        let req = Request::new();
        let errors = collect_errors(&req, &context, &[instance(Some(json!(1)))]).unwrap();
        assert_eq!(errors[0].message(), "chain-wide message");
    }

    #[test]
    fn test_dynamic_message_receives_original_value() {
        let message = Message::dynamic(|value, meta| {
            format!(
                "bad {} at {}",
                value.map(|v| v.to_string()).unwrap_or_default(),
                meta.path
            )
        });
        let context = context_with(vec![custom(false, Some(message), |_| Ok(false))], None);
        let req = Request::new();
        let errors = collect_errors(&req, &context, &[instance(Some(json!(7)))]).unwrap();
        assert_eq!(errors[0].message(), "bad 7 at f");
    }

    #[test]
    fn test_standard_runs_once_per_sequence_element() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let item = WorkItem::StandardValidation {
            name: "isLength".to_string(),
            func: Arc::new(move |value, _options| {
                seen.fetch_add(1, Ordering::SeqCst);
                !value.is_empty()
            }),
            options: Vec::new(),
            negated: false,
            message: None,
        };
        let context = context_with(vec![item], None);
        let req = Request::new();
        let errors =
            collect_errors(&req, &context, &[instance(Some(json!(["a", "b", ""])))]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_failed_condition_halts_instance_silently() {
        let stack = vec![
            WorkItem::CustomCondition {
                func: Arc::new(|_value, _meta| Ok(false)),
            },
            custom(false, None, |_| Ok(false)),
        ];
        let context = context_with(stack, None);
        let req = Request::new();
        let errors = collect_errors(&req, &context, &[instance(Some(json!(1)))]).unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_bail_halts_after_error() {
        let stack = vec![
            custom(false, Some(Message::from("first")), |_| Ok(false)),
            WorkItem::Bail,
            custom(false, Some(Message::from("second")), |_| Ok(false)),
        ];
        let context = context_with(stack, None);
        let req = Request::new();
        let errors = collect_errors(&req, &context, &[instance(Some(json!(1)))]).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "first");
    }

    #[test]
    fn test_bail_without_errors_continues() {
        let stack = vec![
            custom(false, None, |_| Ok(true)),
            WorkItem::Bail,
            custom(false, Some(Message::from("after bail")), |_| Ok(false)),
        ];
        let context = context_with(stack, None);
        let req = Request::new();
        let errors = collect_errors(&req, &context, &[instance(Some(json!(1)))]).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "after bail");
    }

    #[test]
    fn test_all_instances_attempted_despite_failures() {
        let context = context_with(vec![custom(false, None, |_| Ok(false))], None);
        let req = Request::new();
        let mut second = instance(Some(json!(2)));
        second.path = FieldPath::from_key("g");
        let errors =
            collect_errors(&req, &context, &[instance(Some(json!(1))), second]).unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path(), Some("f".to_string()));
        assert_eq!(errors[1].path(), Some("g".to_string()));
    }

    #[test]
    fn test_verdict_success_returns_instances() {
        let context = context_with(vec![custom(false, None, |_| Ok(true))], None);
        let req = Request::new();
        let verdict = validate(&req, &context, vec![instance(Some(json!(1)))]).unwrap();
        assert!(verdict.is_success());
    }

    #[test]
    fn test_missing_catalog_entry_aborts_run() {
        let context = context_with(
            vec![WorkItem::MissingCatalogEntry {
                name: "isGone".to_string(),
            }],
            None,
        );
        let req = Request::new();
        let result = collect_errors(&req, &context, &[instance(Some(json!(1)))]);
        assert_eq!(
            result.unwrap_err(),
            RunError::UnknownCatalogEntry("isGone".to_string())
        );
    }
}

//! Stage 2: apply the context's sanitization items.

use rayon::prelude::*;

use crate::context::{coerce_to_string, Context, FieldMeta, WorkItem};
use crate::request::Request;
use crate::select::FieldInstance;

/// Folds the context's ordered sanitization items over each instance's
/// value. Standard sanitizers receive the string-coerced value plus their
/// fixed options; custom sanitizers receive the raw value plus field
/// metadata. The returned value replaces the instance value
/// unconditionally.
///
/// Instances are processed in parallel and all joined before the stage
/// returns; the items for one instance run strictly left to right.
pub fn sanitize(req: &Request, context: &Context, instances: Vec<FieldInstance>) -> Vec<FieldInstance> {
    if !context.stack.iter().any(WorkItem::is_sanitization) {
        return instances;
    }
    instances
        .into_par_iter()
        .map(|mut instance| {
            for item in &context.stack {
                match item {
                    WorkItem::StandardSanitization { func, options, .. } => {
                        let coerced = coerce_to_string(instance.value.as_ref());
                        instance.value = Some(func(&coerced, options));
                    }
                    WorkItem::CustomSanitization { func } => {
                        let meta = FieldMeta {
                            request: req,
                            location: instance.location,
                            path: &instance.path,
                        };
                        let next = func(instance.value.as_ref(), &meta);
                        instance.value = next;
                    }
                    _ => {}
                }
            }
            instance
        })
        .collect()
}

//! Stage 3: drop absent/empty instances per the optionality policy.

use serde_json::Value;

use crate::context::Context;
use crate::select::FieldInstance;

/// Applies the context's optionality policy.
///
/// A non-optional context passes every instance through unchanged. An
/// optional context always drops instances whose value is absent; with
/// `nullable` it additionally drops nulls; with `check_falsy` it
/// additionally drops any falsy value.
pub fn remove_optionals(context: &Context, instances: Vec<FieldInstance>) -> Vec<FieldInstance> {
    let Some(options) = context.optional else {
        return instances;
    };
    instances
        .into_iter()
        .filter(|instance| match &instance.value {
            None => false,
            Some(Value::Null) => !(options.nullable || options.check_falsy),
            Some(value) => !(options.check_falsy && is_falsy(value)),
        })
        .collect()
}

/// The falsy values `check_falsy` drops: null, false, numeric zero, and
/// the empty string.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

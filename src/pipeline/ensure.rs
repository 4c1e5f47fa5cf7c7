//! Stage 4: narrow multi-location instance groups.

use indexmap::IndexMap;

use crate::context::Context;
use crate::select::FieldInstance;
use crate::selector::Selector;

/// Narrows instances selected from several locations down to the ones
/// worth validating.
///
/// Instances are grouped by `original_path`. For a context targeting more
/// than one location, a group whose source selector has no wildcard keeps
/// only its defined-value instances — or, when none has a defined value,
/// exactly the first instance, so one error-reporting candidate survives.
/// Wildcard-sourced groups and single-location contexts pass through
/// unchanged.
pub fn ensure_instance(context: &Context, instances: Vec<FieldInstance>) -> Vec<FieldInstance> {
    if context.locations.len() <= 1 {
        return instances;
    }
    let mut groups: IndexMap<String, Vec<FieldInstance>> = IndexMap::new();
    for instance in instances {
        groups
            .entry(instance.original_path.clone())
            .or_default()
            .push(instance);
    }

    let mut out = Vec::new();
    for (original_path, group) in groups {
        if Selector::parse(&original_path).has_wildcard() {
            out.extend(group);
        } else if group.iter().any(|i| i.value.is_some()) {
            out.extend(group.into_iter().filter(|i| i.value.is_some()));
        } else {
            out.extend(group.into_iter().take(1));
        }
    }
    out
}

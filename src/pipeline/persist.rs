//! Stage 5: write sanitized values back into the request.

use serde_json::{Map, Value};

use crate::expand::{lookup, lookup_mut};
use crate::path::{FieldPath, PathSegment};
use crate::request::Request;
use crate::select::FieldInstance;

/// Writes each instance's current value back into the request tree at its
/// address, creating intermediate containers as needed.
///
/// Writes that would not change the stored value are skipped, so an
/// absent value stays absent rather than spuriously creating its key. An
/// absent value over a key that does exist removes the entry. The stage
/// is idempotent: a second run with unchanged values leaves the tree
/// untouched.
pub fn persist_back(req: &mut Request, instances: &[FieldInstance]) {
    for instance in instances {
        let root = req.location_mut(instance.location);
        let unchanged = match (&instance.value, lookup(root, &instance.path)) {
            (None, None) => true,
            (Some(new), Some(current)) => new == current,
            _ => false,
        };
        if unchanged {
            continue;
        }
        if instance.path.is_root() {
            *root = instance.value.clone().unwrap_or(Value::Null);
        } else {
            match &instance.value {
                Some(value) => set_path(root, instance.path.as_segments(), value.clone()),
                None => remove_path(root, &instance.path),
            }
        }
    }
}

/// Writes `value` at the address, replacing mismatched intermediates with
/// fresh containers.
fn set_path(root: &mut Value, segments: &[PathSegment], value: Value) {
    let Some((segment, rest)) = segments.split_first() else {
        *root = value;
        return;
    };
    let child = match segment {
        PathSegment::Key(key) => match key.parse::<usize>() {
            Ok(idx) if root.is_array() => array_slot(root, idx),
            _ => object_slot(root, key),
        },
        PathSegment::Index(idx) => {
            if root.is_object() {
                object_slot(root, &idx.to_string())
            } else {
                array_slot(root, *idx)
            }
        }
    };
    set_path(child, rest, value);
}

fn object_slot<'a>(root: &'a mut Value, key: &str) -> &'a mut Value {
    if !root.is_object() {
        *root = Value::Object(Map::new());
    }
    match root {
        Value::Object(map) => map.entry(key.to_string()).or_insert(Value::Null),
        _ => unreachable!("slot container was just normalized to an object"),
    }
}

fn array_slot(root: &mut Value, idx: usize) -> &mut Value {
    if !root.is_array() {
        *root = Value::Array(Vec::new());
    }
    match root {
        Value::Array(items) => {
            if items.len() <= idx {
                items.resize(idx + 1, Value::Null);
            }
            &mut items[idx]
        }
        _ => unreachable!("slot container was just normalized to an array"),
    }
}

/// Removes the entry at the address. Sequence slots are nulled rather
/// than shifted, keeping sibling addresses stable.
fn remove_path(root: &mut Value, path: &FieldPath) {
    let (Some(parent_path), Some(last)) = (path.parent(), path.last()) else {
        return;
    };
    let Some(parent) = lookup_mut(root, &parent_path) else {
        return;
    };
    match (parent, last) {
        (Value::Object(map), PathSegment::Key(key)) => {
            map.remove(key);
        }
        (Value::Object(map), PathSegment::Index(idx)) => {
            map.remove(&idx.to_string());
        }
        (Value::Array(items), PathSegment::Index(idx)) => {
            if *idx < items.len() {
                items[*idx] = Value::Null;
            }
        }
        (Value::Array(items), PathSegment::Key(key)) => {
            if let Ok(idx) = key.parse::<usize>() {
                if idx < items.len() {
                    items[idx] = Value::Null;
                }
            }
        }
        _ => {}
    }
}

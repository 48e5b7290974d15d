//! Dotted path lookup in a data context.

use crate::value::Value;

/// Paths that denote the context itself.
pub fn is_identity_path(path: &str) -> bool {
    path == "." || path == "this"
}

fn step<'v>(v: &'v Value, segment: &str) -> Option<&'v Value> {
    match v {
        Value::Object(_) => v.get(segment),
        Value::Array(items) =>
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                items.get(segment.parse::<usize>().ok()?)
            } else {
                None
            },
        _ => None
    }
}

/// Look up `path` (e.g. `user.address.city`) in `context`. `.` and
/// `this` give `context` itself. `None` stands for "undefined": a
/// missing member, or a walk through `null` or a scalar. Array
/// elements can be addressed by a numeric segment (`items.0.name`).
pub fn resolve<'v>(context: &'v Value, path: &str) -> Option<&'v Value> {
    if is_identity_path(path) {
        return Some(context)
    }
    let mut current = context;
    for segment in path.split('.') {
        current = match current {
            Value::Null => return None,
            _ => step(current, segment)?
        };
    }
    Some(current)
}

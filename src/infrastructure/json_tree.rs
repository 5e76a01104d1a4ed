// Local mirror of a store subtree, updated by put/patch notifications
use serde_json::{Map, Value};

/// The store treats null and empty objects as "nothing here".
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

pub fn get<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = node.as_object()?.get(*segment)?;
    }
    if is_absent(node) { None } else { Some(node) }
}

/// Replace the value at `segments`. Writing null deletes, and parents left
/// empty are pruned.
pub fn put(root: &mut Value, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *root = if is_absent(&value) { Value::Null } else { value };
        return;
    };

    if !root.is_object() {
        if is_absent(&value) {
            return;
        }
        *root = Value::Object(Map::new());
    }

    if let Value::Object(map) = root {
        let child = map.entry(first.to_string()).or_insert(Value::Null);
        put(child, rest, value);
        if is_absent(child) {
            map.remove(*first);
        }
    }

    if is_absent(root) {
        *root = Value::Null;
    }
}

/// Merge each child of `data` into the node at `segments`. Child keys may
/// themselves be slash-separated paths.
pub fn patch(root: &mut Value, segments: &[&str], data: &Value) -> bool {
    let Some(children) = data.as_object() else {
        return false;
    };
    for (key, value) in children {
        let mut path: Vec<&str> = segments.to_vec();
        path.extend(key.split('/').filter(|s| !s.is_empty()));
        put(root, &path, value.clone());
    }
    true
}

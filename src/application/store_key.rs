// Path and key helpers for the realtime store's key grammar
use crate::application::realtime_store::StoreError;

const ILLEGAL_KEY_CHARS: [char; 5] = ['.', '#', '$', '[', ']'];

/// Turn a free-text identifier (an email address, say) into a usable key.
/// `.` is reserved by the store, so it becomes `_`.
pub fn sanitize_key(raw: &str) -> String {
    raw.replace('.', "_")
}

/// Canonical form of a store path: no leading/trailing or doubled slashes.
/// The empty string addresses the root.
pub fn normalize_path(path: &str) -> Result<String, StoreError> {
    let segments = split_path(path);
    for segment in &segments {
        if segment
            .chars()
            .any(|c| ILLEGAL_KEY_CHARS.contains(&c) || c.is_control())
        {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
    }
    Ok(segments.join("/"))
}

pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// True when a write at one path can change the value seen at the other
pub fn paths_overlap(a: &str, b: &str) -> bool {
    a.is_empty()
        || b.is_empty()
        || a == b
        || a.starts_with(&format!("{b}/"))
        || b.starts_with(&format!("{a}/"))
}

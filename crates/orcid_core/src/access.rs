//! Null-safe traversal of raw registry records.
//!
//! Every read from a raw record goes through [`lookup`]. A path stops
//! resolving at the first node that is missing, null, or not an object;
//! callers then substitute their sentinel. Nothing here can fail.

use serde_json::Value;

use crate::sentinel;

/// Resolves `path` against `root`. `None` if any step is missing, null or
/// not an object, or if the leaf itself is null.
pub fn lookup<'a, K: AsRef<str>>(root: Option<&'a Value>, path: &[K]) -> Option<&'a Value> {
    let mut node = root?;
    for key in path {
        node = node.as_object()?.get(key.as_ref())?;
    }
    if node.is_null() { None } else { Some(node) }
}

/// The leaf at `path` rendered as text, or `default`.
pub fn get<K: AsRef<str>>(root: Option<&Value>, path: &[K], default: &str) -> String {
    lookup(root, path)
        .map(text)
        .unwrap_or_else(|| default.to_string())
}

/// [`get`] with the usual "N/A" default.
pub fn get_na<K: AsRef<str>>(root: Option<&Value>, path: &[K]) -> String {
    get(root, path, sentinel::NOT_APPLICABLE)
}

/// The leaf at `path` rendered as text, if it resolves.
pub fn get_text<K: AsRef<str>>(root: Option<&Value>, path: &[K]) -> Option<String> {
    lookup(root, path).map(text)
}

/// The array at `path`; empty when absent or not an array.
pub fn list<'a, K: AsRef<str>>(root: Option<&'a Value>, path: &[K]) -> &'a [Value] {
    lookup(root, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Renders a leaf for display. Strings are unquoted; everything else uses
/// its JSON form.
pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

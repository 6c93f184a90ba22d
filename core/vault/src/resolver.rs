//! Placeholder resolution.
//!
//! Walks a JSON tree depth first (object entries in insertion order, array
//! elements by ascending index) and replaces every string equal to
//! [`PLACEHOLDER`] with text obtained from a [`ReplacementSource`]. The
//! tree is mutated in place.

use serde_json::Value;
use tracing::debug;

use crate::document::{set_entry, set_index};
use crate::prompt::ReplacementSource;
use jsonvault_common::{JsonPath, Result};

/// Marker value that requests operator input.
pub const PLACEHOLDER: &str = "<ask>";

/// Outcome of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    /// Paths that were replaced, in the order they were asked for.
    pub resolved: Vec<JsonPath>,
}

impl ResolveSummary {
    /// Number of placeholders replaced.
    pub fn count(&self) -> usize {
        self.resolved.len()
    }
}

/// Whether a value is the placeholder marker.
///
/// Only strings qualify; the comparison is exact.
pub fn is_placeholder(value: &Value) -> bool {
    matches!(value, Value::String(s) if s == PLACEHOLDER)
}

/// Replace every placeholder below `root` with input from `source`.
///
/// The root value itself is never replaced; only entries of objects and
/// elements of arrays are candidates.
///
/// # Errors
/// - Any error from the source aborts the walk; replacements already made
///   stay in place
pub fn resolve_placeholders(
    root: &mut Value,
    source: &mut dyn ReplacementSource,
) -> Result<ResolveSummary> {
    let mut summary = ResolveSummary::default();
    walk(root, &JsonPath::root(), source, &mut summary)?;
    debug!("Resolved {} placeholder(s)", summary.count());
    Ok(summary)
}

fn walk(
    node: &mut Value,
    path: &JsonPath,
    source: &mut dyn ReplacementSource,
    summary: &mut ResolveSummary,
) -> Result<()> {
    match node {
        Value::Object(object) => {
            // Snapshot keys so replacements never disturb the iteration.
            let keys: Vec<String> = object.keys().cloned().collect();
            for key in keys {
                let child_path = path.key(&key);
                if object.get(&key).is_some_and(is_placeholder) {
                    let replacement = source.replacement(&child_path)?;
                    set_entry(object, &key, Value::String(replacement))?;
                    debug!("Replaced placeholder at {}", child_path);
                    summary.resolved.push(child_path);
                } else if let Some(child) = object.get_mut(&key) {
                    walk(child, &child_path, source, summary)?;
                }
            }
        }
        Value::Array(array) => {
            let len = array.len();
            for index in 0..len {
                let child_path = path.index(index);
                if is_placeholder(&array[index]) {
                    let replacement = source.replacement(&child_path)?;
                    set_index(array, index, Value::String(replacement))?;
                    debug!("Replaced placeholder at {}", child_path);
                    summary.resolved.push(child_path);
                } else {
                    walk(&mut array[index], &child_path, source, summary)?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Count the placeholders a resolution pass would ask for.
pub fn count_placeholders(root: &Value) -> usize {
    match root {
        Value::Object(object) => object.values().map(count_child).sum(),
        Value::Array(array) => array.iter().map(count_child).sum(),
        _ => 0,
    }
}

fn count_child(value: &Value) -> usize {
    if is_placeholder(value) {
        1
    } else {
        count_placeholders(value)
    }
}

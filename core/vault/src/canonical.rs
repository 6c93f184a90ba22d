//! Canonical text form of a document.
//!
//! Two-space indented JSON with keys in document order. The same text is
//! shown to the operator and encrypted.

use serde_json::Value;

use jsonvault_common::{Error, Result};

/// Render a value as indented JSON text.
pub fn canonicalize(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Serialization(e.to_string()))
}

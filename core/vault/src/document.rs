//! In-memory JSON document.
//!
//! The document owns a `serde_json::Value` tree whose objects keep their
//! insertion order, so prompting order and rendered output follow the
//! source file.

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

use jsonvault_common::{Error, Result};

/// UTF-8 byte-order mark some editors put at the start of a file.
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Parsed JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Parse JSON text into a document.
    ///
    /// # Errors
    /// - `EmptyDocument` if the text is blank or its root is `null`
    /// - `Parse` with the parser's diagnostic if the text is not well-formed
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(Error::EmptyDocument);
        }

        let root: Value = serde_json::from_str(text).map_err(|e| Error::Parse(e.to_string()))?;
        if root.is_null() {
            return Err(Error::EmptyDocument);
        }

        Ok(Self { root })
    }

    /// Read and parse a JSON file.
    ///
    /// A leading byte-order mark is skipped.
    ///
    /// # Errors
    /// - `FileNotFound` if the path does not name an existing file
    /// - `Io` if the file cannot be read
    /// - Any error from [`Document::parse`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }

        let text = fs::read_to_string(path)?;
        debug!("Read {} bytes from {}", text.len(), path.display());
        Self::parse(text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&text))
    }

    /// Get the root value.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Get the root value for in-place mutation.
    pub fn root_mut(&mut self) -> &mut Value {
        &mut self.root
    }

    /// Consume the document, returning the root value.
    pub fn into_value(self) -> Value {
        self.root
    }
}

/// Replace the value bound to an existing key, keeping its position.
///
/// # Errors
/// - `InvalidInput` if the key is absent
pub fn set_entry(object: &mut Map<String, Value>, key: &str, value: Value) -> Result<()> {
    match object.get_mut(key) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(Error::InvalidInput(format!("no entry '{}' in object", key))),
    }
}

/// Replace the array element at `index`.
///
/// # Errors
/// - `InvalidInput` if the index is out of range
pub fn set_index(array: &mut [Value], index: usize, value: Value) -> Result<()> {
    let len = array.len();
    match array.get_mut(index) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(Error::InvalidInput(format!(
            "index {} out of range for array of length {}",
            index, len
        ))),
    }
}

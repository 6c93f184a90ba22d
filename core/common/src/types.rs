//! Common types used throughout JsonVault.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Accepted thumbprint lengths: SHA-1 (40 hex digits) and SHA-256 (64).
pub const IDENTITY_LENGTHS: [usize; 2] = [40, 64];

/// Certificate identity, referenced by its thumbprint.
///
/// A value of this type always holds exactly 40 or 64 hexadecimal digits.
/// The thumbprint is kept as entered so artifact names match what the
/// operator typed; comparisons against a store use [`Identity::normalized`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Parse and validate a thumbprint.
    ///
    /// # Errors
    /// - Returns `InvalidIdentity` if the value is empty, has a length other
    ///   than 40 or 64, or contains a non-hexadecimal character
    pub fn parse(thumbprint: &str) -> crate::Result<Self> {
        if thumbprint.trim().is_empty() {
            return Err(crate::Error::InvalidIdentity(
                "certificate thumbprint is required".to_string(),
            ));
        }

        let length = thumbprint.chars().count();
        if !IDENTITY_LENGTHS.contains(&length) {
            return Err(crate::Error::InvalidIdentity(format!(
                "must be a 40 or 64 character hexadecimal string, got {} characters",
                length
            )));
        }

        if let Some(bad) = thumbprint.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(crate::Error::InvalidIdentity(format!(
                "must be a 40 or 64 character hexadecimal string, found '{}'",
                bad
            )));
        }

        Ok(Self(thumbprint.to_string()))
    }

    /// Get the thumbprint as entered.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercase form used for store lookups.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of a value inside a JSON document, e.g. `db.hosts[2].password`.
///
/// Used as the operator-facing prompt label and as the key of
/// non-interactive answer maps. Object keys are appended with `.`, array
/// indices with `[i]`; at the root neither gets a leading separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonPath(String);

impl JsonPath {
    /// Create the root path.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Check if this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of an object entry below this one.
    pub fn key(&self, key: &str) -> Self {
        if self.is_root() {
            Self(key.to_string())
        } else {
            Self(format!("{}.{}", self.0, key))
        }
    }

    /// Path of an array element below this one.
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    /// Get the path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sensitive data wrapper that zeroizes on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SensitiveBytes(Vec<u8>);

impl SensitiveBytes {
    /// Create new sensitive bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    /// Get a reference to the inner bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SensitiveBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SensitiveBytes([REDACTED; {} bytes])", self.0.len())
    }
}

//! Common error types for JsonVault.

use thiserror::Error;

/// Top-level error type for JsonVault operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing command-line argument.
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Input document does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Input is not well-formed JSON.
    #[error("Failed to parse JSON: {0}")]
    Parse(String),

    /// Input parsed to nothing.
    #[error("JSON document is empty or invalid")]
    EmptyDocument,

    /// Certificate thumbprint failed the format check.
    #[error("Invalid certificate thumbprint: {0}")]
    InvalidIdentity(String),

    /// Encryption primitive failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Decryption primitive failed.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Vault artifact could not be written or read.
    #[error("Vault file I/O failed for {path}: {source}")]
    Persistence {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Vault artifact is not valid Base64.
    #[error("Vault file is corrupt: {0}")]
    CorruptArtifact(String),

    /// Non-interactive answer map has no entry for a placeholder path.
    #[error("No answer supplied for '{0}'")]
    MissingAnswer(String),

    /// Cryptographic operation failed.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

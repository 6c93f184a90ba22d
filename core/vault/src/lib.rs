//! Vault engine for JsonVault.
//!
//! This module provides:
//! - JSON document loading with order-preserving objects
//! - Placeholder resolution from the console or a prepared answer map
//! - Canonical rendering of the filled document
//! - Vault file encoding, persistence and read-back verification
//! - The session that sequences all of the above
//!
//! # Architecture
//! The vault module sits between the command line and the certificate
//! cipher. It never performs cryptography itself; every encryption and
//! decryption goes through a `CertificateCipher`.

pub mod canonical;
pub mod codec;
pub mod config;
pub mod document;
pub mod prompt;
pub mod resolver;
pub mod session;

pub use canonical::canonicalize;
pub use codec::VaultCodec;
pub use config::ToolConfig;
pub use document::Document;
pub use prompt::{AnswerMap, ConsolePrompt, Operator, ReplacementSource};
pub use resolver::{resolve_placeholders, ResolveSummary, PLACEHOLDER};
pub use session::{Session, SessionOptions, SessionReport};

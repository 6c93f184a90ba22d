//! Common utilities and types shared across JsonVault modules.
//!
//! This module provides the error taxonomy and the small value types
//! (identities, document paths, sensitive buffers) that every other crate
//! passes around.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Identity, JsonPath, SensitiveBytes};

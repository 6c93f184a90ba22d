//! Cryptographic boundary for JsonVault.
//!
//! This module provides:
//! - The `CertificateCipher` capability: encrypt or decrypt bytes for a
//!   certificate identity located in a machine or user store
//! - A directory-backed key store implementing that capability with a
//!   hybrid envelope (random data key wrapped under the identity's key)
//! - An in-memory cipher for exercising callers without a store
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged

pub mod aead;
pub mod cipher;
pub mod keys;
pub mod memory;
pub mod store;

pub use aead::{decrypt, encrypt};
pub use cipher::{CertSelector, CertificateCipher, StoreScope};
pub use keys::{DataKey, StoreKey, KEY_LENGTH};
pub use memory::MemoryCipher;
pub use store::KeyStore;

//! Certificate cipher trait definition.

use std::fmt;

use jsonvault_common::{Identity, Result};

/// Which certificate store an identity is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StoreScope {
    /// Machine-wide store.
    #[default]
    LocalMachine,
    /// Store of the current user.
    CurrentUser,
}

impl StoreScope {
    /// Scope selected by the "use current user store" switch.
    pub fn from_user_flag(use_current_user: bool) -> Self {
        if use_current_user {
            Self::CurrentUser
        } else {
            Self::LocalMachine
        }
    }

    /// Whether this is the machine-wide store.
    pub fn is_machine(&self) -> bool {
        matches!(self, Self::LocalMachine)
    }

    /// Short name for messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalMachine => "LocalMachine",
            Self::CurrentUser => "CurrentUser",
        }
    }
}

impl fmt::Display for StoreScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects the certificates an operation runs against.
///
/// `subject` is the certificate whose key protects the data; `issuer` is
/// bound into the ciphertext and must match on decryption. Callers in this
/// workspace always pass the same identity for both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertSelector {
    pub subject: Identity,
    pub issuer: Identity,
    pub scope: StoreScope,
}

impl CertSelector {
    /// Selector using one identity for both roles.
    pub fn for_identity(identity: &Identity, scope: StoreScope) -> Self {
        Self {
            subject: identity.clone(),
            issuer: identity.clone(),
            scope,
        }
    }
}

/// Encryption keyed by a certificate identity.
///
/// Implementations must satisfy `decrypt(encrypt(p, s), s) == p` for every
/// selector they can resolve. Failures (unknown certificate, unusable key,
/// store access denied) are reported as errors and never retried here.
pub trait CertificateCipher: Send + Sync {
    /// Get the implementation name (e.g., "keystore", "memory").
    fn name(&self) -> &str;

    /// Encrypt `plaintext` for the selected certificate.
    fn encrypt(&self, plaintext: &[u8], selector: &CertSelector) -> Result<Vec<u8>>;

    /// Decrypt `ciphertext` previously produced for the selected certificate.
    fn decrypt(&self, ciphertext: &[u8], selector: &CertSelector) -> Result<Vec<u8>>;
}

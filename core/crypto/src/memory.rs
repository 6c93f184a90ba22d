//! In-memory certificate cipher for testing.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::cipher::{CertSelector, CertificateCipher, StoreScope};
use jsonvault_common::{Error, Identity, Result};

/// In-memory certificate cipher.
///
/// Knows a fixed set of identities and applies a reversible keyed XOR
/// derived from the selector. Provides no confidentiality; it exists so
/// callers can be exercised without a key store. Every call is counted.
pub struct MemoryCipher {
    known: RwLock<HashSet<(String, StoreScope)>>,
    fail_decrypt: AtomicBool,
    encrypt_calls: AtomicUsize,
    decrypt_calls: AtomicUsize,
}

impl MemoryCipher {
    /// Create a cipher that knows no identities.
    pub fn new() -> Self {
        Self {
            known: RwLock::new(HashSet::new()),
            fail_decrypt: AtomicBool::new(false),
            encrypt_calls: AtomicUsize::new(0),
            decrypt_calls: AtomicUsize::new(0),
        }
    }

    /// Create a cipher that knows one identity.
    pub fn with_identity(identity: &Identity, scope: StoreScope) -> Self {
        let cipher = Self::new();
        cipher.enroll(identity, scope);
        cipher
    }

    /// Make an identity resolvable in a scope.
    pub fn enroll(&self, identity: &Identity, scope: StoreScope) {
        self.known
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert((identity.normalized(), scope));
    }

    /// Make every subsequent decryption fail.
    pub fn fail_decryption(&self, fail: bool) {
        self.fail_decrypt.store(fail, Ordering::SeqCst);
    }

    /// Number of encrypt calls made so far.
    pub fn encrypt_calls(&self) -> usize {
        self.encrypt_calls.load(Ordering::SeqCst)
    }

    /// Number of decrypt calls made so far.
    pub fn decrypt_calls(&self) -> usize {
        self.decrypt_calls.load(Ordering::SeqCst)
    }

    fn check_known(&self, selector: &CertSelector) -> Result<()> {
        let known = self.known.read().unwrap_or_else(|e| e.into_inner());
        if known.contains(&(selector.subject.normalized(), selector.scope)) {
            Ok(())
        } else {
            Err(Error::NotFound(format!(
                "certificate {} in {} store",
                selector.subject, selector.scope
            )))
        }
    }

    fn keystream(selector: &CertSelector) -> [u8; 32] {
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(b"memory-cipher");
        hasher.update(selector.subject.normalized().as_bytes());
        hasher.update(selector.issuer.normalized().as_bytes());

        let mut stream = [0u8; 32];
        stream.copy_from_slice(&hasher.finalize());
        stream
    }

    fn apply(data: &[u8], selector: &CertSelector) -> Vec<u8> {
        let stream = Self::keystream(selector);
        data.iter()
            .enumerate()
            .map(|(i, b)| b ^ stream[i % stream.len()])
            .collect()
    }
}

impl Default for MemoryCipher {
    fn default() -> Self {
        Self::new()
    }
}

impl CertificateCipher for MemoryCipher {
    fn name(&self) -> &str {
        "memory"
    }

    fn encrypt(&self, plaintext: &[u8], selector: &CertSelector) -> Result<Vec<u8>> {
        self.encrypt_calls.fetch_add(1, Ordering::SeqCst);
        self.check_known(selector)?;
        Ok(Self::apply(plaintext, selector))
    }

    fn decrypt(&self, ciphertext: &[u8], selector: &CertSelector) -> Result<Vec<u8>> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        self.check_known(selector)?;
        if self.fail_decrypt.load(Ordering::SeqCst) {
            return Err(Error::Crypto("private key is not available".to_string()));
        }
        Ok(Self::apply(ciphertext, selector))
    }
}

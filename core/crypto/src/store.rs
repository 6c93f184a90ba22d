//! Directory-backed certificate key store.
//!
//! Each identity owns one key file, `<THUMBPRINT>.key`, holding a Base64
//! encoded 256-bit key. There is one directory for the machine-wide store
//! and one for the current user.
//!
//! # Envelope format
//! ```text
//! wrapped data key : nonce (24) || data key (32) || tag (16)
//! payload          : nonce (24) || ciphertext      || tag (16)
//! ```
//! The data key is fresh per call. Both parts are authenticated with the
//! issuer thumbprint as associated data.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::Zeroize;

use crate::aead::{self, NONCE_SIZE, TAG_SIZE};
use crate::cipher::{CertSelector, CertificateCipher, StoreScope};
use crate::keys::{DataKey, StoreKey, KEY_LENGTH};
use jsonvault_common::{Error, Identity, Result, SensitiveBytes};

/// Extension of key files inside a store directory.
pub const KEY_FILE_EXTENSION: &str = "key";

/// Size of the wrapped data key at the start of every envelope.
pub const WRAPPED_KEY_SIZE: usize = NONCE_SIZE + KEY_LENGTH + TAG_SIZE;

/// Key store rooted in two directories.
#[derive(Debug, Clone)]
pub struct KeyStore {
    machine_root: PathBuf,
    user_root: PathBuf,
}

impl KeyStore {
    /// Create a store over the given machine and user directories.
    ///
    /// Directories are not touched until a key is enrolled or looked up.
    pub fn new(machine_root: impl AsRef<Path>, user_root: impl AsRef<Path>) -> Self {
        Self {
            machine_root: machine_root.as_ref().to_path_buf(),
            user_root: user_root.as_ref().to_path_buf(),
        }
    }

    /// Directory backing a scope.
    pub fn root(&self, scope: StoreScope) -> &Path {
        match scope {
            StoreScope::LocalMachine => &self.machine_root,
            StoreScope::CurrentUser => &self.user_root,
        }
    }

    /// Path of the key file for an identity.
    pub fn key_path(&self, identity: &Identity, scope: StoreScope) -> PathBuf {
        self.root(scope)
            .join(format!("{}.{}", identity.normalized(), KEY_FILE_EXTENSION))
    }

    /// Check if a key is enrolled for an identity.
    pub fn contains(&self, identity: &Identity, scope: StoreScope) -> bool {
        self.key_path(identity, scope).is_file()
    }

    /// Generate and persist a new key for an identity.
    ///
    /// # Postconditions
    /// - Store directory exists
    /// - Key file is readable only by the owner (Unix)
    ///
    /// # Errors
    /// - `AlreadyExists` if the identity already has a key in this scope
    /// - I/O errors
    pub fn enroll(&self, identity: &Identity, scope: StoreScope) -> Result<PathBuf> {
        let path = self.key_path(identity, scope);
        if path.exists() {
            return Err(Error::AlreadyExists(format!(
                "key for certificate {} in {} store",
                identity, scope
            )));
        }

        fs::create_dir_all(self.root(scope))?;

        let key = StoreKey::generate();
        let mut encoded = STANDARD.encode(key.as_bytes());
        encoded.push('\n');
        let written = fs::write(&path, encoded.as_bytes());
        encoded.zeroize();
        written?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        debug!("Enrolled key for {} in {} store", identity, scope);
        Ok(path)
    }

    /// Load the key for an identity.
    ///
    /// # Errors
    /// - `NotFound` if the identity has no key in this scope
    /// - `Crypto` if the key file is malformed
    fn load_key(&self, identity: &Identity, scope: StoreScope) -> Result<StoreKey> {
        let path = self.key_path(identity, scope);
        if !path.is_file() {
            return Err(Error::NotFound(format!(
                "certificate {} in {} store",
                identity, scope
            )));
        }

        let contents = SensitiveBytes::new(fs::read(&path)?);
        let text = std::str::from_utf8(contents.as_bytes())
            .map_err(|_| Error::Crypto(format!("Key file {} is not text", path.display())))?;
        let decoded = SensitiveBytes::new(
            STANDARD
                .decode(text.trim())
                .map_err(|e| Error::Crypto(format!("Key file {} is malformed: {}", path.display(), e)))?,
        );

        debug!("Loaded key for {} from {} store", identity, scope);
        StoreKey::from_slice(decoded.as_bytes())
    }
}

impl CertificateCipher for KeyStore {
    fn name(&self) -> &str {
        "keystore"
    }

    fn encrypt(&self, plaintext: &[u8], selector: &CertSelector) -> Result<Vec<u8>> {
        let store_key = self.load_key(&selector.subject, selector.scope)?;
        let aad = selector.issuer.normalized();

        let data_key = DataKey::generate();
        let wrapped = aead::encrypt(store_key.as_bytes(), data_key.as_bytes(), aad.as_bytes())?;
        let payload = aead::encrypt(data_key.as_bytes(), plaintext, aad.as_bytes())?;

        let mut envelope = Vec::with_capacity(wrapped.len() + payload.len());
        envelope.extend_from_slice(&wrapped);
        envelope.extend_from_slice(&payload);

        debug!(
            "Encrypted {} bytes into {} byte envelope",
            plaintext.len(),
            envelope.len()
        );
        Ok(envelope)
    }

    fn decrypt(&self, ciphertext: &[u8], selector: &CertSelector) -> Result<Vec<u8>> {
        if ciphertext.len() < WRAPPED_KEY_SIZE + NONCE_SIZE + TAG_SIZE {
            return Err(Error::Crypto("Ciphertext too short".to_string()));
        }

        let store_key = self.load_key(&selector.subject, selector.scope)?;
        let aad = selector.issuer.normalized();

        let (wrapped, payload) = ciphertext.split_at(WRAPPED_KEY_SIZE);
        let data_key = SensitiveBytes::new(aead::decrypt(
            store_key.as_bytes(),
            wrapped,
            aad.as_bytes(),
        )?);
        let data_key = DataKey::from_slice(data_key.as_bytes())?;

        aead::decrypt(data_key.as_bytes(), payload, aad.as_bytes())
    }
}

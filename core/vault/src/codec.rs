//! Vault artifact encoding.
//!
//! A vault file is named `<thumbprint>.encVault` and contains nothing but
//! the Base64 text of the ciphertext, broken into 76 character lines.
//! Which identity can open it is recorded only by the file name.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use jsonvault_common::{Error, Identity, Result};
use jsonvault_crypto::{CertSelector, CertificateCipher, StoreScope};

/// File extension of vault artifacts.
pub const ARTIFACT_EXTENSION: &str = "encVault";

/// Base64 characters per line (MIME width).
pub const LINE_WIDTH: usize = 76;

/// Separator between Base64 lines.
pub const LINE_BREAK: &str = "\r\n";

/// Encodes documents into vault files and reads them back.
pub struct VaultCodec {
    cipher: Arc<dyn CertificateCipher>,
    scope: StoreScope,
    output_dir: PathBuf,
}

impl VaultCodec {
    /// Create a codec writing artifacts into `output_dir`.
    pub fn new(
        cipher: Arc<dyn CertificateCipher>,
        scope: StoreScope,
        output_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            cipher,
            scope,
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Store scope used for both directions.
    pub fn scope(&self) -> StoreScope {
        self.scope
    }

    /// Path of the artifact for an identity.
    pub fn artifact_path(&self, identity: &Identity) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", identity.as_str(), ARTIFACT_EXTENSION))
    }

    /// Encrypt canonical JSON for an identity and write the artifact.
    ///
    /// # Postconditions
    /// - On success the artifact exists and any previous one is replaced
    /// - On encryption failure nothing is written
    ///
    /// # Errors
    /// - `Encryption` if the cipher fails
    /// - `Persistence` if the file cannot be written
    pub fn seal(&self, canonical: &str, identity: &Identity) -> Result<PathBuf> {
        let selector = CertSelector::for_identity(identity, self.scope);
        let ciphertext = self
            .cipher
            .encrypt(canonical.as_bytes(), &selector)
            .map_err(|e| Error::Encryption(e.to_string()))?;
        debug!(
            "Encrypted {} bytes with {} cipher",
            canonical.len(),
            self.cipher.name()
        );

        let armored = encode_armored(&ciphertext);
        let path = self.artifact_path(identity);
        fs::write(&path, armored.as_bytes()).map_err(|source| Error::Persistence {
            path: path.display().to_string(),
            source,
        })?;

        info!("Wrote vault {} ({} bytes)", path.display(), armored.len());
        Ok(path)
    }

    /// Read an artifact back and decrypt it.
    ///
    /// # Errors
    /// - `Persistence` if the file cannot be read
    /// - `CorruptArtifact` if the content is not Base64
    /// - `Decryption` if the cipher fails or the plaintext is not UTF-8
    pub fn verify(&self, identity: &Identity) -> Result<String> {
        let path = self.artifact_path(identity);
        let armored = fs::read_to_string(&path).map_err(|source| Error::Persistence {
            path: path.display().to_string(),
            source,
        })?;

        let ciphertext = decode_armored(&armored)?;
        let selector = CertSelector::for_identity(identity, self.scope);
        let plaintext = self
            .cipher
            .decrypt(&ciphertext, &selector)
            .map_err(|e| Error::Decryption(e.to_string()))?;

        let text = String::from_utf8(plaintext)
            .map_err(|e| Error::Decryption(format!("plaintext is not UTF-8: {}", e)))?;
        info!("Decrypted vault {} for verification", path.display());
        Ok(text)
    }
}

/// Base64-encode bytes, breaking lines every [`LINE_WIDTH`] characters.
pub fn encode_armored(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    let mut armored = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH * 2);

    let mut start = 0;
    while start < encoded.len() {
        let end = (start + LINE_WIDTH).min(encoded.len());
        if start > 0 {
            armored.push_str(LINE_BREAK);
        }
        // Base64 output is ASCII, so every byte offset is a char boundary.
        armored.push_str(&encoded[start..end]);
        start = end;
    }
    armored
}

/// Decode Base64 text, ignoring line breaks and other whitespace.
///
/// # Errors
/// - `CorruptArtifact` if the text is not valid Base64
pub fn decode_armored(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::CorruptArtifact(e.to_string()))
}

//! Vault creation session.
//!
//! A session runs one template through the whole pipeline: validate the
//! identity, load the document, resolve placeholders, show the result,
//! wait for confirmation, seal, and read the vault back to prove it opens.
//! The first error ends the session; nothing is retried.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::canonical::canonicalize;
use crate::codec::VaultCodec;
use crate::document::Document;
use crate::prompt::{AnswerMap, Operator};
use crate::resolver::resolve_placeholders;
use jsonvault_common::{Identity, JsonPath, Result};

/// Shown before encryption; any line of input continues.
pub const CONFIRM_PROMPT: &str = "Press Enter to continue or ctrl-c to terminate";

/// Inputs of a session.
#[derive(Debug, Default)]
pub struct SessionOptions {
    /// JSON template to fill in.
    pub input: PathBuf,
    /// Certificate thumbprint as given by the operator.
    pub thumbprint: Option<String>,
    /// Answers used instead of prompting, when present.
    pub answers: Option<AnswerMap>,
}

/// Outcome of a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Vault file that was written.
    pub artifact: PathBuf,
    /// Placeholders that were filled, in prompt order.
    pub resolved: Vec<JsonPath>,
    /// Whether the decrypted vault matched the encrypted text exactly.
    pub verified: bool,
}

/// One run of the vault creation pipeline.
pub struct Session {
    options: SessionOptions,
    codec: VaultCodec,
}

impl Session {
    /// Create a session.
    pub fn new(options: SessionOptions, codec: VaultCodec) -> Self {
        Self { options, codec }
    }

    /// Run the pipeline, interacting with `operator`.
    ///
    /// # Postconditions
    /// - On success the vault file exists and has been decrypted once
    /// - An invalid thumbprint fails before the input is read
    /// - A failure after the vault is written leaves the file in place
    ///
    /// # Errors
    /// - `InvalidIdentity`, `FileNotFound`, `Parse`, `EmptyDocument`
    /// - `MissingAnswer` when answers are supplied but incomplete
    /// - `Encryption`, `Persistence`, `CorruptArtifact`, `Decryption`
    /// - `Io` if the operator's console fails
    pub fn run<O: Operator>(&mut self, operator: &mut O) -> Result<SessionReport> {
        let identity = Identity::parse(self.options.thumbprint.as_deref().unwrap_or(""))?;

        let mut document = Document::load(&self.options.input)?;
        info!("Loaded template {}", self.options.input.display());

        let summary = match self.options.answers.as_mut() {
            Some(answers) => resolve_placeholders(document.root_mut(), answers)?,
            None => resolve_placeholders(document.root_mut(), &mut *operator)?,
        };
        if let Some(answers) = &self.options.answers {
            for path in answers.unused() {
                warn!("Answer for '{}' matched no placeholder", path);
            }
        }

        let canonical = canonicalize(document.root())?;
        drop(document);

        operator.show("")?;
        operator.show("Resulting JSON:")?;
        operator.show(&canonical)?;
        operator.acknowledge(CONFIRM_PROMPT)?;

        let artifact = self.codec.seal(&canonical, &identity)?;
        let decrypted = self.codec.verify(&identity)?;

        operator.show("")?;
        operator.show("Decrypted JSON for verification:")?;
        operator.show(&decrypted)?;

        let verified = decrypted == canonical;
        if verified {
            info!("Vault {} verified", artifact.display());
        } else {
            warn!(
                "Vault {} decrypted to different text than was encrypted",
                artifact.display()
            );
        }

        Ok(SessionReport {
            artifact,
            resolved: summary.resolved,
            verified,
        })
    }
}

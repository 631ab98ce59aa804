//! Credential normalizer.
//!
//! Walks every credential record in document order and replaces plaintext
//! passwords with hashes. Values that already carry the hash marker are left
//! byte-for-byte unchanged, so running the normalizer twice is a no-op.

use serde::Serialize;
use serde_json::Value;

use crate::document::{CredentialPath, MeetCreds};
use crate::error::Result;
use crate::hasher::PasswordHasher;

/// Counts from one normalizer pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    /// Plaintext passwords that were replaced.
    pub hashed: usize,
    /// Passwords that were already hashed.
    pub already_hashed: usize,
    /// Records skipped because they are not a mapping or lack a string password.
    pub skipped: usize,
}

impl NormalizeReport {
    pub fn total(&self) -> usize {
        self.hashed + self.already_hashed + self.skipped
    }

    pub fn changed(&self) -> bool {
        self.hashed > 0
    }
}

/// Hashes every plaintext password in the document in place.
///
/// A hashing failure aborts the pass; the caller must discard the document.
pub fn normalize(doc: &mut MeetCreds, hasher: &dyn PasswordHasher) -> Result<NormalizeReport> {
    let mut report = NormalizeReport::default();

    doc.visit_credentials_mut(|path, record| {
        let Some(Value::String(password)) = record.and_then(|r| r.get_mut("password")) else {
            tracing::debug!("Skipping {}: no string password", path);
            report.skipped += 1;
            return Ok(());
        };

        if hasher.is_hashed(password) {
            report.already_hashed += 1;
            return Ok(());
        }

        *password = hasher.hash(password)?;
        tracing::debug!("Hashed password for {}", path);
        report.hashed += 1;
        Ok(())
    })?;

    Ok(report)
}

/// Lists credentials whose password is still plaintext.
pub fn audit(doc: &MeetCreds, hasher: &dyn PasswordHasher) -> Vec<CredentialPath> {
    let mut plaintext = Vec::new();

    doc.visit_credentials(|path, record| {
        let password = record
            .and_then(|r| r.get("password"))
            .and_then(Value::as_str);
        if let Some(password) = password {
            if !hasher.is_hashed(password) {
                plaintext.push(path);
            }
        }
    });

    plaintext
}

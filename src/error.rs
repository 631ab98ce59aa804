//! Error types for loading, hashing and writing credential documents.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a credentials run.
#[derive(Error, Debug)]
pub enum CredsError {
    /// The document is missing required structure.
    #[error("Malformed configuration at {location}: {reason}")]
    MalformedConfiguration { location: String, reason: String },

    /// The source could not be read or the destination could not be written.
    #[error("I/O error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The password hashing primitive failed.
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl CredsError {
    pub(crate) fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        CredsError::MalformedConfiguration {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CredsError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<bcrypt::BcryptError> for CredsError {
    fn from(e: bcrypt::BcryptError) -> Self {
        CredsError::Hashing(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CredsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display_names_location() {
        let e = CredsError::malformed("meet 'M1' admin", "expected a mapping");
        let msg = e.to_string();
        assert!(msg.contains("meet 'M1' admin"));
        assert!(msg.contains("expected a mapping"));
    }

    #[test]
    fn test_io_display_names_path() {
        let e = CredsError::io(
            "/tmp/meet_creds.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(e.to_string().contains("/tmp/meet_creds.json"));
        assert!(std::error::Error::source(&e).is_some());
    }
}

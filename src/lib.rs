//! Referee lights credentials preparation.
//!
//! Loads the meet credentials document, replaces plaintext passwords with
//! bcrypt hashes and writes the document back for the referee lights server.

pub mod auth;
pub mod document;
pub mod error;
pub mod hasher;
pub mod normalizer;
pub mod pipeline;
pub mod store;

pub use auth::{verify_login, verify_superuser, LoginOutcome};
pub use document::{Credential, CredentialPath, Meet, MeetCreds, Policy, Role};
pub use error::{CredsError, Result};
pub use hasher::{BcryptHasher, PasswordHasher};
pub use normalizer::{audit, normalize, NormalizeReport};
pub use pipeline::Pipeline;
pub use store::{DocumentStore, FileStore, MemoryStore};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

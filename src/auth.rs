//! Login verification against a hashed credentials document.
//!
//! Mirrors how the referee lights server checks a login: find the meet by
//! name, find the record by `username`, then compare with bcrypt.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::{MeetCreds, Role};
use crate::error::Result;
use crate::hasher::PasswordHasher;

/// Result of a login check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoginOutcome {
    Valid { role: Role },
    InvalidPassword,
    UnknownUser,
    UnknownMeet,
    /// The stored password is still plaintext and cannot be checked.
    NotHashed,
}

impl LoginOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, LoginOutcome::Valid { .. })
    }
}

impl std::fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginOutcome::Valid { role } => write!(f, "valid ({})", role),
            LoginOutcome::InvalidPassword => write!(f, "invalid password"),
            LoginOutcome::UnknownUser => write!(f, "unknown user"),
            LoginOutcome::UnknownMeet => write!(f, "unknown meet"),
            LoginOutcome::NotHashed => write!(f, "stored password is not hashed"),
        }
    }
}

/// Checks a meet login.
pub fn verify_login(
    doc: &MeetCreds,
    meet: &str,
    username: &str,
    password: &str,
    hasher: &dyn PasswordHasher,
) -> Result<LoginOutcome> {
    if doc.meet(meet).is_none() {
        return Ok(LoginOutcome::UnknownMeet);
    }
    match doc.find_login(meet, username) {
        Some((role, record)) => check(record, role, password, hasher),
        None => Ok(LoginOutcome::UnknownUser),
    }
}

/// Checks the top-level superuser login.
pub fn verify_superuser(
    doc: &MeetCreds,
    username: &str,
    password: &str,
    hasher: &dyn PasswordHasher,
) -> Result<LoginOutcome> {
    let record = doc
        .superuser
        .as_ref()
        .and_then(Value::as_object)
        .filter(|r| r.get("username").and_then(Value::as_str) == Some(username));
    match record {
        Some(record) => check(record, Role::Superuser, password, hasher),
        None => Ok(LoginOutcome::UnknownUser),
    }
}

fn check(
    record: &Map<String, Value>,
    role: Role,
    password: &str,
    hasher: &dyn PasswordHasher,
) -> Result<LoginOutcome> {
    let Some(stored) = record.get("password").and_then(Value::as_str) else {
        return Ok(LoginOutcome::InvalidPassword);
    };
    if !hasher.is_hashed(stored) {
        return Ok(LoginOutcome::NotHashed);
    }
    match hasher.verify(password, stored) {
        Ok(true) => Ok(LoginOutcome::Valid { role }),
        Ok(false) => Ok(LoginOutcome::InvalidPassword),
        // A value that looks hashed but does not parse can never match.
        Err(e) => {
            tracing::debug!("Stored hash for {} rejected: {}", role, e);
            Ok(LoginOutcome::InvalidPassword)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Policy;
    use crate::hasher::{BcryptHasher, MIN_COST};
    use crate::normalizer::normalize;
    use serde_json::json;

    fn hashed_doc(hasher: &BcryptHasher) -> MeetCreds {
        let mut doc = MeetCreds::from_value(
            json!({
                "meets": [{
                    "name": "Spring Open",
                    "admin": {"username": "director", "password": "dir-pw"},
                    "secondaryAdmins": [{"username": "deputy", "password": "dep-pw"}],
                    "users": [{"username": "left", "password": "left-pw"}]
                }],
                "superuser": {"username": "root", "password": "root-pw"}
            }),
            Policy::Lenient,
        )
        .unwrap();
        normalize(&mut doc, hasher).unwrap();
        doc
    }

    #[test]
    fn test_valid_logins() {
        let hasher = BcryptHasher::new(MIN_COST).unwrap();
        let doc = hashed_doc(&hasher);

        assert_eq!(
            verify_login(&doc, "Spring Open", "director", "dir-pw", &hasher).unwrap(),
            LoginOutcome::Valid { role: Role::Admin }
        );
        assert_eq!(
            verify_login(&doc, "Spring Open", "deputy", "dep-pw", &hasher).unwrap(),
            LoginOutcome::Valid { role: Role::SecondaryAdmin }
        );
        assert_eq!(
            verify_login(&doc, "Spring Open", "left", "left-pw", &hasher).unwrap(),
            LoginOutcome::Valid { role: Role::User }
        );
        assert!(verify_superuser(&doc, "root", "root-pw", &hasher)
            .unwrap()
            .is_valid());
    }

    #[test]
    fn test_rejections() {
        let hasher = BcryptHasher::new(MIN_COST).unwrap();
        let doc = hashed_doc(&hasher);

        assert_eq!(
            verify_login(&doc, "Spring Open", "left", "wrong", &hasher).unwrap(),
            LoginOutcome::InvalidPassword
        );
        assert_eq!(
            verify_login(&doc, "Spring Open", "nobody", "x", &hasher).unwrap(),
            LoginOutcome::UnknownUser
        );
        assert_eq!(
            verify_login(&doc, "Winter Cup", "left", "left-pw", &hasher).unwrap(),
            LoginOutcome::UnknownMeet
        );
        assert_eq!(
            verify_superuser(&doc, "admin", "root-pw", &hasher).unwrap(),
            LoginOutcome::UnknownUser
        );
        assert_eq!(
            verify_superuser(&doc, "root", "nope", &hasher).unwrap(),
            LoginOutcome::InvalidPassword
        );
    }

    #[test]
    fn test_plaintext_not_accepted() {
        let hasher = BcryptHasher::new(MIN_COST).unwrap();
        let doc = MeetCreds::from_value(
            json!({"meets": [{"name": "M1", "admin": {"username": "a", "password": "pw"}}]}),
            Policy::Lenient,
        )
        .unwrap();

        assert_eq!(
            verify_login(&doc, "M1", "a", "pw", &hasher).unwrap(),
            LoginOutcome::NotHashed
        );
    }

    #[test]
    fn test_corrupt_hash_is_rejected_login() {
        let hasher = BcryptHasher::new(MIN_COST).unwrap();
        let doc = MeetCreds::from_value(
            json!({"meets": [{"name": "M2", "admin": {
                "username": "a",
                "password": "$2b$12$alreadyhashedvaluexxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx"
            }}]}),
            Policy::Lenient,
        )
        .unwrap();

        assert_eq!(
            verify_login(&doc, "M2", "a", "x", &hasher).unwrap(),
            LoginOutcome::InvalidPassword
        );
    }

    #[test]
    fn test_outcome_display() {
        let outcome = LoginOutcome::Valid { role: Role::SecondaryAdmin };
        assert_eq!(outcome.to_string(), "valid (secondary admin)");
        assert_eq!(LoginOutcome::UnknownMeet.to_string(), "unknown meet");
    }
}

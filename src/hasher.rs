//! Password hashing primitive.
//!
//! Hashes are bcrypt strings in modular crypt format (`$2b$12$<salt><hash>`),
//! so the algorithm, cost and salt travel with the value and no salt has to
//! be stored elsewhere.

use crate::error::{CredsError, Result};

/// Cost used when none is configured.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Lowest cost bcrypt accepts. Only useful for tests.
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// One-way password hashing as used by the normalizer.
pub trait PasswordHasher {
    /// Hashes a plaintext password with a fresh random salt.
    fn hash(&self, plaintext: &str) -> Result<String>;

    /// Checks a plaintext password against a stored hash.
    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool>;

    /// Returns true if the value already carries the hash-format marker.
    fn is_hashed(&self, value: &str) -> bool;
}

/// bcrypt hasher producing `$2b$` hashes.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Creates a hasher with the given cost factor.
    pub fn new(cost: u32) -> Result<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(CredsError::Hashing(format!(
                "bcrypt cost must be between {} and {}, got {}",
                MIN_COST, MAX_COST, cost
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// The marker this hasher writes, e.g. `$2b$12$`.
    pub fn marker(&self) -> String {
        format!("$2b${:02}$", self.cost)
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> Result<String> {
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool> {
        Ok(bcrypt::verify(plaintext, hash)?)
    }

    fn is_hashed(&self, value: &str) -> bool {
        has_bcrypt_marker(value)
    }
}

/// Matches `$2a$`, `$2b$` or `$2y$` followed by a two-digit cost and `$`.
///
/// Any cost counts, so hashes written with an older cost are never hashed
/// a second time.
pub fn has_bcrypt_marker(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 7
        && bytes[0] == b'$'
        && bytes[1] == b'2'
        && matches!(bytes[2], b'a' | b'b' | b'y')
        && bytes[3] == b'$'
        && bytes[4].is_ascii_digit()
        && bytes[5].is_ascii_digit()
        && bytes[6] == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> BcryptHasher {
        BcryptHasher::new(MIN_COST).unwrap()
    }

    #[test]
    fn test_default_hash_shape() {
        let hash = BcryptHasher::default().hash("abc123").unwrap();

        assert!(hash.starts_with("$2b$12$"));
        assert_eq!(hash.len(), 60);
    }

    #[test]
    fn test_verify_round_trip() {
        let hasher = fast_hasher();
        let hash = hasher.hash("hunter2").unwrap();

        assert!(hasher.verify("hunter2", &hash).unwrap());
        assert!(!hasher.verify("hunter3", &hash).unwrap());
        assert!(!hasher.verify("", &hash).unwrap());
    }

    #[test]
    fn test_fresh_salt_per_call() {
        let hasher = fast_hasher();
        let first = hasher.hash("same").unwrap();
        let second = hasher.hash("same").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same", &first).unwrap());
        assert!(hasher.verify("same", &second).unwrap());
    }

    #[test]
    fn test_marker_detection() {
        assert!(has_bcrypt_marker("$2b$12$abcdef"));
        assert!(has_bcrypt_marker("$2a$10$abcdef"));
        assert!(has_bcrypt_marker("$2y$04$abcdef"));
        assert!(!has_bcrypt_marker("abc123"));
        assert!(!has_bcrypt_marker("$2b$"));
        assert!(!has_bcrypt_marker("$2x$12$abc"));
        assert!(!has_bcrypt_marker("$argon2id$v=19$m=65536"));
        assert!(!has_bcrypt_marker(""));
    }

    #[test]
    fn test_marker_matches_output() {
        let hasher = fast_hasher();
        assert_eq!(hasher.marker(), "$2b$04$");
        assert!(hasher.hash("x").unwrap().starts_with(&hasher.marker()));
    }

    #[test]
    fn test_cost_out_of_range() {
        assert!(matches!(BcryptHasher::new(3), Err(CredsError::Hashing(_))));
        assert!(matches!(BcryptHasher::new(32), Err(CredsError::Hashing(_))));
        assert_eq!(BcryptHasher::new(10).unwrap().cost(), 10);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(fast_hasher().verify("pw", "not-a-hash").is_err());
    }
}

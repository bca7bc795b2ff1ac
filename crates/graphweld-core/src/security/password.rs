//! Argon2 password hashing adapter

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordVerifier};

use crate::error::{Error, Result};

/// Password hasher backed by Argon2 with the library defaults.
#[derive(Debug, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl super::PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = argon2::PasswordHasher::hash_password(&self.argon2, password.as_bytes(), &salt)
            .map_err(|e| Error::security(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::PasswordHasher;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2PasswordHasher::default();
        let hash = hasher.hash("s3cret").unwrap();
        assert!(hasher.verify("s3cret", &hash));
        assert!(!hasher.verify("wrong", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        let hasher = Argon2PasswordHasher::default();
        assert!(!hasher.verify("s3cret", "not-a-phc-string"));
    }
}

//! Password hashing and the strength policy.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::error::DomainError;

/// Hash a password with Argon2id and a fresh salt.
pub fn hash_password(plain: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| DomainError::internal("password hashing failed"))
}

/// Verify a password against a stored hash. Unparseable hashes verify false.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Policy: at least 8 characters with an upper case letter, a lower case
/// letter, and a digit.
pub fn validate_strength(plain: &str) -> Result<(), DomainError> {
    let long_enough = plain.chars().count() >= 8;
    let has_upper = plain.chars().any(|c| c.is_uppercase());
    let has_lower = plain.chars().any(|c| c.is_lowercase());
    let has_digit = plain.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_upper && has_lower && has_digit {
        Ok(())
    } else {
        Err(DomainError::validation(
            "password",
            "must be at least 8 characters with upper case, lower case, and a digit",
        ))
    }
}

use std::sync::Arc;
use uuid::Uuid;

/// Failure while hashing or checking a password
#[derive(Debug, thiserror::Error)]
#[error("Password hashing failed: {0}")]
pub struct PasswordError(String);

/// Hash a password with bcrypt at the given cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(password, cost).map_err(|e| PasswordError(e.to_string()))
}

/// Verify a password against a stored bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(password, hash).map_err(|e| PasswordError(e.to_string()))
}

/// Checks sign-in attempts. Attempts for unknown accounts are verified
/// against a decoy hash at the configured cost, so both outcomes do the same
/// bcrypt work.
#[derive(Clone)]
pub struct PasswordVerifier {
    decoy: Arc<str>,
}

impl PasswordVerifier {
    /// Fails when `cost` is outside bcrypt's accepted range
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        let decoy = hash_password(&Uuid::new_v4().to_string(), cost)?;
        Ok(Self { decoy: decoy.into() })
    }

    /// True only when an account exists and `password` matches its hash
    pub fn verify(&self, password: &str, stored_hash: Option<&str>) -> Result<bool, PasswordError> {
        let matched = verify_password(password, stored_hash.unwrap_or(&self.decoy))?;
        Ok(matched && stored_hash.is_some())
    }
}

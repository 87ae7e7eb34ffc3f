//! Password hashing (bcrypt) and the registration password policy.

use tracing::warn;

use crate::credentials::CredentialError;

/// Symbols accepted by the "at least one special character" rule.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Hash a plaintext password with a fresh salt.
pub fn hash_password(password: &str, cost: u32) -> Result<String, CredentialError> {
    bcrypt::hash(password, cost).map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Compare a plaintext password with a stored hash.
///
/// Only the boolean outcome escapes; a malformed stored hash counts as a
/// mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matched) => matched,
        Err(e) => {
            warn!("stored password hash could not be verified: {e}");
            false
        }
    }
}

/// Complexity rules for new passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    /// Kept below bcrypt's 72-byte input window.
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 64,
        }
    }
}

impl PasswordPolicy {
    /// Return every rule the password violates (empty when acceptable).
    pub fn check(&self, password: &str) -> Vec<String> {
        let mut violations = Vec::new();

        if password.chars().count() < self.min_length {
            violations.push(format!(
                "Password must be at least {} characters long",
                self.min_length
            ));
        }
        if password.chars().count() > self.max_length {
            violations.push(format!(
                "Password must be at most {} characters long",
                self.max_length
            ));
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            violations.push("Password must contain at least one uppercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            violations.push("Password must contain at least one lowercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push("Password must contain at least one number".to_string());
        }
        if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
            violations.push("Password must contain at least one special character".to_string());
        }

        violations
    }
}

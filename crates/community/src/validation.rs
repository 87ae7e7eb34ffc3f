//! Input validation helpers shared by the request types.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use commune_core::DomainError;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9_.-]+@([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]{2,4}$").expect("email pattern is valid");
}

/// Syntactic email check. Word characters are ASCII only.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Every rule an input violated, in the order they were checked.
#[derive(Debug, Error, Clone, Default, PartialEq, Eq)]
#[error("{}", .violations.join("; "))]
pub struct ValidationErrors {
    violations: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: impl Into<String>) {
        self.violations.push(violation.into());
    }

    pub fn extend(&mut self, violations: impl IntoIterator<Item = String>) {
        self.violations.extend(violations);
    }

    /// Record `violation` unless `chars` lies within `min..=max`.
    pub fn check_length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min {
            self.push(format!("{field} must contain at least {min} character(s)"));
        } else if len > max {
            self.push(format!("{field} must contain at most {max} character(s)"));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(value: ValidationErrors) -> Self {
        DomainError::validation(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last-1@mail.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@b.toolongtld"));
        assert!(!is_valid_email("a b@x.com"));
    }

    #[test]
    fn rejects_non_ascii_letters() {
        assert!(!is_valid_email("josé@x.com"));
        assert!(!is_valid_email("a@exämple.com"));
        assert!(!is_valid_email("a@x.сом"));
    }

    #[test]
    fn violations_join_into_one_message() {
        let mut errors = ValidationErrors::new();
        errors.check_length("name", "a", 2, 128);
        errors.push("Please enter a valid email");

        assert_eq!(
            errors.to_string(),
            "name must contain at least 2 character(s); Please enter a valid email"
        );
        assert!(errors.into_result().is_err());
    }
}

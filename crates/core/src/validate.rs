//! Field-level validation helpers shared by the record models.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DomainResult, ValidationErrors};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@.]+$").expect("email pattern is valid")
});

/// Whether `value` has the shape `local@domain.tld`.
pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Accumulates violations across the fields of one payload.
///
/// Lengths are counted in characters, not bytes.
#[derive(Debug, Default)]
pub struct FieldChecks {
    errors: ValidationErrors,
}

impl FieldChecks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let n = value.chars().count();
        if n < min || n > max {
            self.errors
                .push(field, format!("must be between {min} and {max} characters"));
        }
        self
    }

    pub fn exact_length(&mut self, field: &str, value: &str, len: usize) -> &mut Self {
        if value.chars().count() != len {
            self.errors
                .push(field, format!("must be exactly {len} characters"));
        }
        self
    }

    pub fn min_length(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.errors
                .push(field, format!("must be at least {min} characters"));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_email(value) {
            self.errors.push(field, "must be a valid email address");
        }
        self
    }

    pub fn finish(self) -> DomainResult<()> {
        self.errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainError;

    #[test]
    fn email_shape() {
        assert!(is_email("john@x.com"));
        assert!(is_email("first.last+tag@sub.example.org"));
        assert!(!is_email("john"));
        assert!(!is_email("john@x"));
        assert!(!is_email("jo hn@x.com"));
        assert!(!is_email("@x.com"));
    }

    #[test]
    fn length_counts_chars() {
        let mut checks = FieldChecks::new();
        checks.length("name", "Zé", 2, 2);
        assert!(checks.finish().is_ok());
    }

    #[test]
    fn collects_every_failure() {
        let mut checks = FieldChecks::new();
        checks
            .length("name", "Jo", 3, 50)
            .exact_length("cpf", "123", 11)
            .email("email", "nope")
            .min_length("password", "12345", 6);

        let Err(DomainError::Validation(errors)) = checks.finish() else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = errors.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "cpf", "email", "password"]);
    }
}

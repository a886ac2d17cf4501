// src/application/error.rs
use crate::domain::errors::DomainError;
use serde::Serialize;
use thiserror::Error;

pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid input ({} field(s))", .0.len())]
    InvalidInput(Vec<FieldError>),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("infrastructure failure: {0}")]
    Infrastructure(String),
}

impl ApplicationError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn infrastructure(msg: impl Into<String>) -> Self {
        Self::Infrastructure(msg.into())
    }

    pub const fn is_concurrency_conflict(&self) -> bool {
        matches!(
            self,
            Self::Conflict(_) | Self::Domain(DomainError::ConcurrencyConflict(_))
        )
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Domain(DomainError::NotFound(_))
        )
    }
}

/// Collects field-level failures so a request reports all of them at once.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Keep the parsed value, or remember why `field` was rejected.
    pub fn check<T>(&mut self, field: &str, result: Result<T, DomainError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(DomainError::Validation(message)) => {
                self.0.push(FieldError::new(field, message));
                None
            }
            Err(other) => {
                self.0.push(FieldError::new(field, other.to_string()));
                None
            }
        }
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn into_result(self) -> ApplicationResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApplicationError::InvalidInput(self.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_accumulate() {
        let mut errors = FieldErrors::default();
        assert_eq!(errors.check("title", Ok::<_, DomainError>(1)), Some(1));
        assert!(
            errors
                .check::<()>("email", Err(DomainError::validation("bad shape")))
                .is_none()
        );
        errors.push("body", "required");
        match errors.into_result() {
            Err(ApplicationError::InvalidInput(fields)) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0], FieldError::new("email", "bad shape"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn conflicts_are_recognised_through_the_domain_wrapper() {
        let err = ApplicationError::from(DomainError::conflict("stale"));
        assert!(err.is_concurrency_conflict());
        assert!(!err.is_not_found());
    }
}

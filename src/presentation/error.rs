use crate::application::{
    ApplicationResult,
    error::{ApplicationError, FieldError},
};
use crate::domain::errors::DomainError;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Conflict,
    Forbidden,
    Unavailable,
    Internal,
}

impl ErrorKind {
    /// HTTP status a web front end would answer with.
    pub const fn status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Internal => 500,
            Self::Unavailable => 503,
        }
    }
}

const CONFLICT_MESSAGE: &str =
    "the record was changed by someone else; reload it and reapply your changes";
const INTERNAL_MESSAGE: &str = "something went wrong while processing the request";
const UNAVAILABLE_MESSAGE: &str = "the content store is temporarily unavailable";

/// What the presentation tier shows for a failed call. Store failures are
/// logged here and reach the caller only as a generic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl ErrorResponse {
    pub fn from_error(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Validation(msg) => Self::new(ErrorKind::BadRequest, msg),
            ApplicationError::InvalidInput(fields) => Self {
                error: ErrorKind::BadRequest,
                message: "some fields were rejected".into(),
                fields,
            },
            ApplicationError::NotFound(msg) => Self::new(ErrorKind::NotFound, msg),
            ApplicationError::Conflict(_) => Self::new(ErrorKind::Conflict, CONFLICT_MESSAGE),
            ApplicationError::Forbidden(msg) => Self::new(ErrorKind::Forbidden, msg),
            ApplicationError::Infrastructure(msg) => {
                error!(error = %msg, "infrastructure failure");
                Self::new(ErrorKind::Internal, INTERNAL_MESSAGE)
            }
            ApplicationError::Domain(domain_err) => Self::from_domain(domain_err),
        }
    }

    fn from_domain(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::new(ErrorKind::BadRequest, msg),
            DomainError::NotFound(msg) => Self::new(ErrorKind::NotFound, msg),
            DomainError::ConcurrencyConflict(_) => {
                Self::new(ErrorKind::Conflict, CONFLICT_MESSAGE)
            }
            DomainError::Connectivity(msg) => {
                error!(error = %msg, "store unreachable");
                Self::new(ErrorKind::Unavailable, UNAVAILABLE_MESSAGE)
            }
            DomainError::Persistence(msg) => {
                error!(error = %msg, "persistence failure");
                Self::new(ErrorKind::Internal, INTERNAL_MESSAGE)
            }
        }
    }

    fn new(error: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
            fields: Vec::new(),
        }
    }
}

impl From<ApplicationError> for ErrorResponse {
    fn from(err: ApplicationError) -> Self {
        Self::from_error(err)
    }
}

pub type PresentationResult<T> = Result<T, ErrorResponse>;

pub trait IntoPresentationResult<T> {
    fn into_presentation(self) -> PresentationResult<T>;
}

impl<T> IntoPresentationResult<T> for ApplicationResult<T> {
    fn into_presentation(self) -> PresentationResult<T> {
        self.map_err(ErrorResponse::from_error)
    }
}

//! Service-level error taxonomy shared by both transports.
//!
//! Every error leaving the application layer carries an [`ErrorKind`] so the
//! HTTP and gRPC boundaries can map it by direct comparison instead of
//! downcasting. Anything the service cannot classify is `Internal`.

use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

/// Stable classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Internal,
}

impl ErrorKind {
    /// Short wire code used in the HTTP response envelope.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "40",
            ErrorKind::NotFound => "44",
            ErrorKind::Internal => "50",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl ServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl From<RepoError> for ServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => ServiceError::not_found("Product not found"),
            other => ServiceError::internal("Persistence failure").with_detail(other.to_string()),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => ServiceError::not_found(err.to_string()),
            DomainError::Validation { message } => ServiceError::bad_request(message),
        }
    }
}

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::error::{ErrorKind, ServiceError};

use super::models::BaseResponse;

/// REST-side rendering of a [`ServiceError`]: status line from the kind,
/// envelope code from the kind's stable short code.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::BadRequest,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self {
            kind: err.kind,
            message: err.message,
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Internal detail stays in the logs; the envelope carries a terse message.
        let message = match self.kind {
            ErrorKind::Internal => "INTERNAL_SERVER_ERROR".to_string(),
            _ => self.message,
        };
        let body = BaseResponse::error(self.kind.code(), message);
        (status_for(self.kind), Json(body)).into_response()
    }
}

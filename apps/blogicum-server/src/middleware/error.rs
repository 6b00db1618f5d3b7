//! Error handling - RFC 7807 problem documents.

use actix_web::{HttpRequest, HttpResponse, ResponseError, error::InternalError, http::StatusCode};
use thiserror::Error;

use blogicum_core::error::{DomainError, RepoError};
use blogicum_core::ports::AuthError;
use blogicum_shared::{ErrorResponse, FieldErrors};

use crate::observability::RequestId;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid form: {0:?}")]
    InvalidForm(FieldErrors),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidForm(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized(detail) => ErrorResponse::unauthorized().with_detail(detail),
            AppError::Conflict(detail) => ErrorResponse::new(409, "Conflict").with_detail(detail),
            AppError::InvalidForm(errors) => ErrorResponse::invalid_form(errors.clone()),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("{entity_type} {key} not found"))
            }
            DomainError::PageOutOfRange(page) => {
                AppError::NotFound(format!("Page {page} not found"))
            }
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::HashingError(msg) => AppError::Internal(msg),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

/// Render an extractor failure as `body`, tagged with the request ID.
pub fn extractor_error(
    err: impl Into<actix_web::Error>,
    req: &HttpRequest,
    mut body: ErrorResponse,
) -> actix_web::Error {
    if let Some(id) = RequestId::of(req) {
        body = body.with_request_id(id.as_str());
    }
    let status = StatusCode::from_u16(body.status).unwrap_or(StatusCode::BAD_REQUEST);

    InternalError::from_response(err.into(), HttpResponse::build(status).json(body)).into()
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::utils::api_response::{ResponseBuilder, ValidationErrorDetail};

/// Error type shared by every service. Each variant carries a stable,
/// machine readable code that ends up in the response envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{1}")]
    Validation(&'static str, String),

    #[error("validation failed")]
    InvalidFields(Vec<ValidationErrorDetail>),

    #[error("{1}")]
    Unauthorized(&'static str, String),

    #[error("{1}")]
    Forbidden(&'static str, String),

    #[error("{1}")]
    NotFound(&'static str, String),

    #[error("{1}")]
    Conflict(&'static str, String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(code, message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden("PERMISSION_DENIED", message.into())
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound(code, message.into())
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::Unauthorized(code, message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(..) | Self::InvalidFields(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(..) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(..) => StatusCode::FORBIDDEN,
            Self::NotFound(..) => StatusCode::NOT_FOUND,
            Self::Conflict(..) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(code, _)
            | Self::Unauthorized(code, _)
            | Self::Forbidden(code, _)
            | Self::NotFound(code, _)
            | Self::Conflict(code, _) => code,
            Self::InvalidFields(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DB_ERR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// True when the driver reports a unique constraint violation.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        match self {
            Self::InvalidFields(details) => {
                ResponseBuilder::fail_with_data(status, code, "Validation failed", details)
                    .into_response()
            }
            Self::Database(err) => {
                tracing::error!("Database error: {}", err);
                ResponseBuilder::error::<()>(status, code, "A database error occurred")
                    .into_response()
            }
            Self::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ResponseBuilder::error::<()>(status, code, "An internal error occurred")
                    .into_response()
            }
            other => ResponseBuilder::error::<()>(status, code, &other.to_string()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_http_status() {
        assert_eq!(
            AppError::validation("SLUG_TAKEN", "taken").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::forbidden("no").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::not_found("ARTICLE_NOT_FOUND", "missing").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn code_is_carried_through() {
        let err = AppError::Conflict("AUTH_DUPLICATE_EMAIL", "Email is already registered".into());
        assert_eq!(err.code(), "AUTH_DUPLICATE_EMAIL");
        assert_eq!(err.to_string(), "Email is already registered");
    }
}

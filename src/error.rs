use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tokio_postgres::error::SqlState;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// The pool could not be built from the configuration.
    #[error("Pool creation error: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    /// An I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No session, or the session token does not resolve.
    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    /// Authenticated, but not the owner of the record being mutated.
    #[error("Forbidden")]
    Forbidden,

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// The record is not visible to the requester. Reported like `NotFound`.
    #[error("Access denied")]
    AccessDenied,

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A uniqueness conflict (duplicate grant, duplicate login).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A multipart error.
    #[error("Multipart error: {0}")]
    Multipart(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Returns the SQLSTATE carried by a database error, if the server reported one.
pub fn sql_state(err: &tokio_postgres::Error) -> Option<&SqlState> {
    err.code()
}

/// Maps the SQLSTATEs a client can cause to client-side errors.
///
/// Anything else stays a `Database` error and is reported as a 500.
pub fn classify_db_error(err: tokio_postgres::Error, conflict: &str, constraint: &str) -> AppError {
    match sql_state(&err) {
        Some(state) if *state == SqlState::UNIQUE_VIOLATION => {
            tracing::debug!("Unique violation: {}", err);
            AppError::Conflict(conflict.to_string())
        }
        Some(state) if *state == SqlState::FOREIGN_KEY_VIOLATION => {
            tracing::debug!("Foreign key violation: {}", err);
            AppError::Validation(constraint.to_string())
        }
        Some(state)
            if *state == SqlState::INVALID_DATETIME_FORMAT
                || *state == SqlState::DATETIME_FIELD_OVERFLOW
                || *state == SqlState::INVALID_TEXT_REPRESENTATION =>
        {
            tracing::debug!("Rejected value: {}", err);
            AppError::Validation("Invalid value".to_string())
        }
        _ => AppError::Database(err),
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::CreatePool(e) => {
                tracing::error!("Pool creation error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "File system error".to_string())
            }

            AppError::Unauthenticated(msg) => {
                tracing::warn!("Authentication failed: {}", msg);
                (StatusCode::UNAUTHORIZED, "Access denied".to_string())
            }

            AppError::Forbidden => {
                tracing::warn!("Ownership check failed");
                (StatusCode::FORBIDDEN, "Access denied".to_string())
            }

            AppError::NotFound | AppError::AccessDenied => {
                tracing::debug!("Resource not found: {}", self);
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }

            AppError::Validation(msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::Conflict(msg) => {
                tracing::debug!("Conflict: {}", msg);
                (StatusCode::CONFLICT, msg.clone())
            }

            AppError::Multipart(msg) => {
                tracing::warn!("Multipart error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn taxonomy_maps_to_statuses() {
        assert_eq!(status(AppError::Unauthenticated("no cookie".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status(AppError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status(AppError::AccessDenied), StatusCode::NOT_FOUND);
        assert_eq!(status(AppError::Validation("bad".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::Multipart("bad".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::Conflict("dup".into())), StatusCode::CONFLICT);
        assert_eq!(status(AppError::Internal("boom".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let (_, message) = AppError::Internal("connection refused at 10.0.0.3".into()).status_and_message();
        assert_eq!(message, "Internal server error");

        let (_, message) = AppError::Io(std::io::Error::other("/srv/media/x: EACCES")).status_and_message();
        assert_eq!(message, "File system error");
    }

    #[test]
    fn access_denied_looks_like_not_found() {
        let (_, denied) = AppError::AccessDenied.status_and_message();
        let (_, missing) = AppError::NotFound.status_and_message();
        assert_eq!(denied, missing);
    }
}

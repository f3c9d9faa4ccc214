//! Error taxonomy shared by the lifecycle logic, the store, and the HTTP
//! layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// All failure modes a save or lookup can surface.
#[derive(Error, Debug)]
pub enum AppError {
    /// A required field was missing or empty after trimming.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The date could not be parsed into a calendar instant.
    #[error("invalid date format; expected a parseable date")]
    InvalidDateFormat,

    /// The time did not match `HH:MM` with an optional AM/PM marker.
    #[error("invalid time format; expected HH:MM or HH:MM AM/PM")]
    InvalidTimeFormat,

    /// The time matched the pattern but hours or minutes were out of range.
    #[error("invalid time values")]
    InvalidTimeValues,

    /// The email did not match the accepted pattern.
    #[error("invalid email format")]
    InvalidEmailFormat,

    /// A booking referenced an event id that does not exist.
    #[error("referenced event not found")]
    ReferencedEventNotFound,

    /// Lookup by slug found nothing.
    #[error("event not found")]
    EventNotFound,

    /// A slug path parameter did not match the accepted pattern.
    #[error("invalid slug format")]
    InvalidSlug,

    /// The store's unique slug index rejected a write. Raced writers hit
    /// this after the probe loop picked an already-taken candidate.
    #[error("slug already in use: {0}")]
    UniqueConstraintViolation(String),

    /// The store could not be opened or configuration was missing.
    #[error("database unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MissingField(_)
            | AppError::InvalidDateFormat
            | AppError::InvalidTimeFormat
            | AppError::InvalidTimeValues
            | AppError::InvalidEmailFormat
            | AppError::InvalidSlug => StatusCode::BAD_REQUEST,
            AppError::ReferencedEventNotFound | AppError::EventNotFound => StatusCode::NOT_FOUND,
            AppError::UniqueConstraintViolation(_)
            | AppError::ConnectionUnavailable(_)
            | AppError::Storage(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Validation and not-found errors carry their message; anything else
        // is logged server-side and answered with a generic body.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {self}");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn validation_errors_map_to_400() {
        assert_eq!(status_of(AppError::MissingField("title")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::InvalidDateFormat), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::InvalidTimeFormat), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::InvalidTimeValues), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::InvalidEmailFormat), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::InvalidSlug), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_errors_map_to_404() {
        assert_eq!(status_of(AppError::ReferencedEventNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::EventNotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn everything_else_maps_to_500_with_generic_body() {
        assert_eq!(
            status_of(AppError::UniqueConstraintViolation("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::ConnectionUnavailable("no DATABASE_URL".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

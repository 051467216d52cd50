use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Backend(String),

    #[error("{0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthenticated() -> Self {
        AppError::Unauthenticated("Not authenticated".to_string())
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Backend(_) | AppError::Storage(_) => "BACKEND_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Backend(_) | AppError::Storage(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attach the message shown to the user when this failure has none of its own.
    pub fn or_notice(self, fallback: &'static str) -> FormError {
        FormError {
            error: self,
            fallback,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Backend(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.or_notice("Something went wrong").into_response()
    }
}

/// A failure caught at a form boundary, rendered as a user-facing notification.
#[derive(Debug)]
pub struct FormError {
    pub error: AppError,
    pub fallback: &'static str,
}

impl FormError {
    pub fn message(&self) -> String {
        let message = self.error.to_string();
        if message.trim().is_empty() {
            self.fallback.to_string()
        } else {
            message
        }
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        let message = self.message();
        match &self.error {
            AppError::Internal(_) | AppError::Backend(_) | AppError::Storage(_) => {
                tracing::error!(code = self.error.code(), error = %message, "Form operation failed");
            }
            _ => {
                tracing::debug!(code = self.error.code(), error = %message, "Form operation rejected");
            }
        }

        let body = json!({
            "error": message,
            "code": self.error.code(),
        });

        (self.error.status(), axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_passes_through_verbatim() {
        let err = AppError::Backend("duplicate key value violates unique constraint".into());
        assert_eq!(
            err.to_string(),
            "duplicate key value violates unique constraint"
        );
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_empty_message_uses_fallback() {
        let form = AppError::Backend(String::new()).or_notice("Error adding part");
        assert_eq!(form.message(), "Error adding part");

        let form = AppError::unauthenticated().or_notice("Error adding part");
        assert_eq!(form.message(), "Not authenticated");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::unauthenticated().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::NotFound("Part not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Storage("x".into()).code(), "BACKEND_ERROR");
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Response generation failed: {0}")]
    Generation(String),

    #[error("Unexpected error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the log; clients get a generic message.
        let detail = match &self {
            AppError::Database(e) => {
                tracing::error!("❌ Database error: {}", e);
                "An internal server error occurred.".to_string()
            }
            AppError::Other(e) => {
                tracing::error!("❌ Internal error: {}", e);
                "An internal server error occurred.".to_string()
            }
            other => {
                tracing::warn!("Request rejected ({}): {}", status, other);
                other.to_string()
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

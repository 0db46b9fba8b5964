use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

/// Semantic app error, rendered as a JSON body with a matching status code.
///
/// Internal errors are logged server-side and surfaced as a generic 500 so
/// no detail leaks to the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found.")]
    NotFound,
    #[error("Too many submissions. Please try again later.")]
    RateLimited,
    #[error("{reason}")]
    Validation { field: &'static str, reason: String },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            AppError::Internal(e) => {
                tracing::error!("internal error: {e:#}");
                json!({"error": "Internal server error."})
            }
            AppError::Validation { field, reason } => json!({"error": reason, "field": field}),
            other => json!({"error": other.to_string()}),
        };
        (self.status(), Json(body)).into_response()
    }
}

// Conversions from any and all lower-level error types to `AppError`.
macro_rules! impl_from {
    ( $($from:ty),* $(,)? ) => {
        $(
            impl From<$from> for AppError {
                fn from(e: $from) -> Self {
                    AppError::Internal(e.into())
                }
            }
        )*
    }
}
impl_from! {
    sqlx::Error,
    sqlx::migrate::MigrateError,
    lettre::error::Error,
    lettre::address::AddressError,
    lettre::transport::smtp::Error,
    tokio::task::JoinError,
}

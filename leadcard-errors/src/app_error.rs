use serde::{Deserialize, Serialize};

/// Shown whenever a vote mutation does not come back acknowledged.
pub const RETRY_LATER_MESSAGE: &str = "Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Remote service rejected the request (status {status}): {message}")]
    RemoteRejection { status: String, message: String },

    #[error("Failed to reach remote service: {0}")]
    TransportFailure(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Clipboard write failed: {0}")]
    Clipboard(String),

    #[error("Share failed: {0}")]
    Share(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    pub fn rejected(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteRejection {
            status: status.into(),
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> &str {
        match self {
            Self::RemoteRejection { .. } | Self::TransportFailure(_) => RETRY_LATER_MESSAGE,
            Self::CardNotFound(_) => "This lead is no longer available.",
            Self::Clipboard(_) => "Could not copy the information.",
            Self::Share(_) => "Could not share the information.",
            Self::Config(_) => "Something went wrong. Please try again later.",
        }
    }
}

#[cfg(feature = "ssr")]
mod ssr_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        message: String,
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = match &self {
                AppError::RemoteRejection { .. } => StatusCode::BAD_GATEWAY,
                AppError::TransportFailure(_) => StatusCode::BAD_GATEWAY,
                AppError::CardNotFound(_) => StatusCode::NOT_FOUND,
                AppError::Clipboard(_) | AppError::Share(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let message = self.user_message().to_string();
            (status, Json(ErrorResponse { message })).into_response()
        }
    }
}

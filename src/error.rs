use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Sheets HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets returned status {0}")]
    BadStatus(reqwest::StatusCode),

    #[error("Failed to sign service account assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("Missing credentials: set GOOGLE_CREDENTIALS, GOOGLE_CREDENTIALS_FILE or SHEETS_ACCESS_TOKEN")]
    MissingCredentials,

    #[error("Failed to read {path}: {source}")]
    CredentialsFile {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed service account key: {0}")]
    MalformedCredentials(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build Sheets client: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("Server failed: {0}")]
    Serve(std::io::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Invalid credentials")]
    AuthenticationDenied,

    #[error("{0}")]
    ValidationFailed(String),

    #[error("{context}")]
    StoreUnavailable {
        context: &'static str,
        source: StoreError,
    },
}

impl AppError {
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| AppError::StoreUnavailable { context, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::AuthenticationDenied => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "message": self.to_string() })),
            )
                .into_response(),
            AppError::MalformedPayload | AppError::ValidationFailed(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            AppError::StoreUnavailable { context, source } => {
                error!(error = %source, "{context}");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": context })),
                )
                    .into_response()
            }
        }
    }
}

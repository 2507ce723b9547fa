//! Error types for the bots and their webhook server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors that can occur while handling an update or serving the webhook.
#[derive(Debug, Error)]
pub enum BotError {
    /// Telegram Bot API request failed.
    #[error("Telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Upstream REST API failed.
    #[error("upstream error: {0}")]
    Upstream(#[from] hookbot_upstream::UpstreamError),

    /// Session store failed.
    #[error("session store error: {0}")]
    Persistence(#[from] hookbot_persistence::PersistenceError),

    /// Illegal session transition.
    #[error("session error: {0}")]
    Session(#[from] hookbot_models::SessionError),

    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] hookbot_core::ConfigError),

    /// Webhook secret token missing or wrong.
    #[error("invalid webhook secret token")]
    Unauthorized,

    /// Request cannot be served as sent.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Webhook registration failed.
    #[error("failed to register webhook: {0}")]
    WebhookFailed(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BotError::Unauthorized => StatusCode::UNAUTHORIZED,
            BotError::BadRequest(_) => StatusCode::BAD_REQUEST,
            BotError::WebhookFailed(_) | BotError::Telegram(_) | BotError::Upstream(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BotError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));
        (status, body).into_response()
    }
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;

//! Webhook HTTP server.
//!
//! Routes:
//! - `POST /webhook`: Telegram update delivery
//! - `GET /setwebhook`: register `<public base>/webhook` with Telegram
//! - `GET /health`: liveness and version
//!
//! Everything else is a 404.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::HOST, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{BotError, Result};
use crate::handler::UpdateHandler;
use crate::transport::MessageSender;
use crate::update::WebhookUpdate;

/// Header Telegram uses to echo the webhook secret.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Path updates are delivered to.
pub const WEBHOOK_PATH: &str = "/webhook";

/// Shared state of the webhook server.
#[derive(Clone)]
pub struct WebhookState {
    handler: Arc<dyn UpdateHandler>,
    sender: Arc<dyn MessageSender>,
    secret: Option<String>,
    public_url: Option<Url>,
    started_at: Instant,
}

impl WebhookState {
    pub fn new(
        handler: Arc<dyn UpdateHandler>,
        sender: Arc<dyn MessageSender>,
        secret: Option<String>,
        public_url: Option<Url>,
    ) -> Self {
        Self {
            handler,
            sender,
            secret,
            public_url,
            started_at: Instant::now(),
        }
    }

    fn check_secret(&self, headers: &HeaderMap) -> Result<()> {
        let Some(expected) = &self.secret else {
            return Ok(());
        };
        let Some(given) = headers.get(SECRET_HEADER) else {
            return Err(BotError::Unauthorized);
        };
        if secrets_match(given.as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            Err(BotError::Unauthorized)
        }
    }
}

/// Compares two secrets in time independent of where they first differ.
fn secrets_match(given: &[u8], expected: &[u8]) -> bool {
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Builds the webhook URL under `base`.
pub fn webhook_url(base: &Url) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| BotError::BadRequest(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .push(WEBHOOK_PATH.trim_start_matches('/'));
    Ok(url)
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub bot: String,
    pub uptime_seconds: u64,
}

/// POST /webhook - handle one Telegram update.
///
/// Undecodable or irrelevant updates are acknowledged and dropped so
/// Telegram does not redeliver them.
async fn receive_update(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str> {
    state.check_secret(&headers)?;

    let Some(inbound) = WebhookUpdate::parse(&body).and_then(WebhookUpdate::into_inbound) else {
        debug!(bytes = body.len(), "Ignoring update without text or callback data");
        return Ok("OK");
    };

    let chat = inbound.chat();
    if let Err(e) = state.handler.handle(inbound).await {
        warn!(chat_id = %chat, bot = state.handler.name(), error = %e, "Update handling failed");
    }
    Ok("OK")
}

/// GET /setwebhook - register this server with Telegram.
async fn set_webhook(State(state): State<WebhookState>, headers: HeaderMap) -> Result<String> {
    let base = match &state.public_url {
        Some(url) => url.clone(),
        None => {
            let host = headers
                .get(HOST)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| BotError::BadRequest("no public URL configured and no Host header".into()))?;
            Url::parse(&format!("https://{}", host))
                .map_err(|e| BotError::BadRequest(format!("invalid Host header: {}", e)))?
        }
    };
    let url = webhook_url(&base)?;

    state
        .sender
        .register_webhook(url.clone(), state.secret.as_deref())
        .await
        .map_err(|e| BotError::WebhookFailed(e.to_string()))?;

    info!(url = %url, "Webhook registered");
    Ok(format!("Webhook set successfully to {}", url))
}

/// GET /health - health check endpoint.
async fn health(State(state): State<WebhookState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        bot: state.handler.name().to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Creates the webhook router.
pub fn create_router(state: WebhookState) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(receive_update))
        .route("/setwebhook", get(set_webhook))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the webhook router on `addr` until Ctrl+C.
pub async fn serve(addr: &str, state: WebhookState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Webhook server listening on {}", addr);
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C");
            }
        })
        .await?;
    Ok(())
}

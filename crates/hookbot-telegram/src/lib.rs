//! Telegram bots for hookbot.
//!
//! Three bots share one delivery layer:
//!
//! - **crypto**: CoinGecko prices, top coins, trending coins, global stats
//! - **weather**: current weather by city, with a preset-city keyboard
//! - **order**: a coupon, email, password, name and verification-code wizard
//!   against the order API
//!
//! Updates arrive either through the webhook server ([`webhook`]) or by long
//! polling ([`HookBot::start_polling`]); both hand an [`Inbound`] event to the
//! bot's [`UpdateHandler`].
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `OPENWEATHER_API_KEY`: weather bot only
//! - `API_BASE_URL`: order bot only
//!
//! Optional:
//! - `TELEGRAM_WEBHOOK_SECRET`: secret Telegram must echo on every update
//! - `HOOKBOT_PUBLIC_URL`: public base URL of the webhook server
//! - `HOOKBOT_WEBHOOK_HOST` / `HOOKBOT_WEBHOOK_PORT`: bind address (default `0.0.0.0:8443`)
//! - `HOOKBOT_SESSION_BACKEND`, `HOOKBOT_SESSION_DIR`, `HOOKBOT_MAX_CODE_ATTEMPTS`,
//!   `HOOKBOT_SESSION_TTL_SECS`: order bot session handling
//!
//! # Example
//!
//! ```no_run
//! use hookbot_core::HookbotConfig;
//! use hookbot_telegram::{BotKind, HookBot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HookbotConfig::from_env()?;
//!     let bot = HookBot::new(BotKind::Crypto, config)?;
//!
//!     // Polling needs no public endpoint.
//!     bot.start_polling().await?;
//!
//!     // Or serve the webhook:
//!     // bot.start_webhook().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod crypto;
pub mod error;
pub mod handler;
pub mod onboarding;
pub mod transport;
pub mod update;
pub mod weather;
pub mod webhook;

#[cfg(test)]
mod test_support;

pub use bot::{build_handler, open_session_store, BotKind, HookBot};
pub use crypto::{CryptoCommand, CryptoDispatcher};
pub use error::{BotError, Result};
pub use handler::UpdateHandler;
pub use onboarding::{OnboardingPolicy, OnboardingStateMachine};
pub use transport::{MessageSender, Reply};
pub use update::{command_name, normalize_command, Inbound, WebhookUpdate};
pub use weather::{WeatherCommand, WeatherDispatcher};
pub use webhook::{create_router, WebhookState};

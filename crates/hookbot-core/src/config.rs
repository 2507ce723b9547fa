//! Environment-driven configuration for hookbot.
//!
//! Every setting is read from an environment variable (after `.env` files
//! have been loaded by the binary). Settings that only one bot needs are
//! optional here and checked by the accessor that the bot calls, so a
//! crypto bot never has to know about the order API.
//!
//! # Environment Variables
//!
//! Telegram:
//! - `TELEGRAM_BOT_TOKEN` (required)
//! - `TELEGRAM_WEBHOOK_SECRET`: verified against `X-Telegram-Bot-Api-Secret-Token`
//! - `HOOKBOT_PUBLIC_URL`: public base URL used when registering the webhook
//! - `HOOKBOT_WEBHOOK_HOST` (default `0.0.0.0`), `HOOKBOT_WEBHOOK_PORT` (default 8443)
//!
//! Upstream APIs:
//! - `COINGECKO_API_URL` (default `https://api.coingecko.com/api/v3`)
//! - `OPENWEATHER_API_URL` (default `https://api.openweathermap.org`)
//! - `OPENWEATHER_API_KEY`, `OPENWEATHER_LANG` (default `en`)
//! - `API_BASE_URL`: base URL of the order API
//! - `HOOKBOT_HTTP_TIMEOUT_SECS` (default 15)
//!
//! Sessions:
//! - `HOOKBOT_SESSION_BACKEND`: `file` (default) or `memory`
//! - `HOOKBOT_SESSION_DIR` (default `~/.hookbot/sessions`)
//! - `HOOKBOT_MAX_CODE_ATTEMPTS`, `HOOKBOT_SESSION_TTL_SECS` (unset = unbounded)

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Environment variable for a custom state directory.
pub const STATE_DIR_ENV: &str = "HOOKBOT_STATE_DIR";

pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const WEBHOOK_SECRET_ENV: &str = "TELEGRAM_WEBHOOK_SECRET";
pub const PUBLIC_URL_ENV: &str = "HOOKBOT_PUBLIC_URL";
pub const WEBHOOK_HOST_ENV: &str = "HOOKBOT_WEBHOOK_HOST";
pub const WEBHOOK_PORT_ENV: &str = "HOOKBOT_WEBHOOK_PORT";
pub const COINGECKO_URL_ENV: &str = "COINGECKO_API_URL";
pub const OPENWEATHER_URL_ENV: &str = "OPENWEATHER_API_URL";
pub const OPENWEATHER_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const OPENWEATHER_LANG_ENV: &str = "OPENWEATHER_LANG";
pub const ORDER_API_URL_ENV: &str = "API_BASE_URL";
pub const HTTP_TIMEOUT_ENV: &str = "HOOKBOT_HTTP_TIMEOUT_SECS";
pub const SESSION_BACKEND_ENV: &str = "HOOKBOT_SESSION_BACKEND";
pub const SESSION_DIR_ENV: &str = "HOOKBOT_SESSION_DIR";
pub const MAX_CODE_ATTEMPTS_ENV: &str = "HOOKBOT_MAX_CODE_ATTEMPTS";
pub const SESSION_TTL_ENV: &str = "HOOKBOT_SESSION_TTL_SECS";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".hookbot";

const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org";
const DEFAULT_OPENWEATHER_LANG: &str = "en";
const DEFAULT_WEBHOOK_HOST: &str = "0.0.0.0";
const DEFAULT_WEBHOOK_PORT: u16 = 8443;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Result type for configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Get the hookbot state directory.
///
/// The state directory is determined by:
/// 1. `HOOKBOT_STATE_DIR` environment variable if set
/// 2. `~/.hookbot` if home directory is available
/// 3. `.hookbot` in current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned()))
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Get the `.env.local` file inside the state directory.
pub fn env_file() -> PathBuf {
    state_dir().join(".env.local")
}

/// Where onboarding sessions are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionBackend {
    /// One JSON file per chat.
    #[default]
    File,
    /// Process memory; lost on restart.
    Memory,
}

impl FromStr for SessionBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(SessionBackend::File),
            "memory" | "mem" => Ok(SessionBackend::Memory),
            other => Err(format!("unknown session backend '{}' (expected file or memory)", other)),
        }
    }
}

/// Telegram-facing settings.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub token: String,
    /// Secret expected in the webhook header.
    pub webhook_secret: Option<String>,
    /// Public base URL the webhook is reachable at.
    pub public_url: Option<Url>,
    /// Host to bind the webhook server to.
    pub host: String,
    /// Port to bind the webhook server to.
    pub port: u16,
}

impl TelegramConfig {
    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("public_url", &self.public_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Upstream REST API settings.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub coingecko_url: Url,
    pub openweather_url: Url,
    pub openweather_key: Option<String>,
    pub openweather_lang: String,
    pub order_api_url: Option<Url>,
    pub http_timeout: Duration,
}

impl UpstreamConfig {
    /// Returns the OpenWeatherMap key, required by the weather bot.
    pub fn openweather_key(&self) -> Result<&str> {
        self.openweather_key
            .as_deref()
            .ok_or(ConfigError::Missing(OPENWEATHER_KEY_ENV))
    }

    /// Returns the order API base URL, required by the order bot.
    pub fn order_api_url(&self) -> Result<&Url> {
        self.order_api_url
            .as_ref()
            .ok_or(ConfigError::Missing(ORDER_API_URL_ENV))
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("coingecko_url", &self.coingecko_url.as_str())
            .field("openweather_url", &self.openweather_url.as_str())
            .field("openweather_key", &self.openweather_key.as_ref().map(|_| "<redacted>"))
            .field("openweather_lang", &self.openweather_lang)
            .field("order_api_url", &self.order_api_url.as_ref().map(Url::as_str))
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

/// Onboarding session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub dir: PathBuf,
    /// Rejected verification codes allowed before the session is dropped.
    pub max_code_attempts: Option<u32>,
    /// Idle time after which a session is dropped.
    pub ttl: Option<Duration>,
}

/// Complete hookbot configuration.
#[derive(Debug, Clone)]
pub struct HookbotConfig {
    pub telegram: TelegramConfig,
    pub upstream: UpstreamConfig,
    pub sessions: SessionConfig,
}

impl HookbotConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset.
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let token = get(BOT_TOKEN_ENV).ok_or(ConfigError::Missing(BOT_TOKEN_ENV))?;

        let telegram = TelegramConfig {
            token,
            webhook_secret: get(WEBHOOK_SECRET_ENV),
            public_url: get(PUBLIC_URL_ENV)
                .map(|v| parse_url(PUBLIC_URL_ENV, &v))
                .transpose()?,
            host: get(WEBHOOK_HOST_ENV).unwrap_or_else(|| DEFAULT_WEBHOOK_HOST.to_string()),
            port: parse_or(WEBHOOK_PORT_ENV, get(WEBHOOK_PORT_ENV), DEFAULT_WEBHOOK_PORT)?,
        };

        let upstream = UpstreamConfig {
            coingecko_url: parse_url(
                COINGECKO_URL_ENV,
                &get(COINGECKO_URL_ENV).unwrap_or_else(|| DEFAULT_COINGECKO_URL.to_string()),
            )?,
            openweather_url: parse_url(
                OPENWEATHER_URL_ENV,
                &get(OPENWEATHER_URL_ENV).unwrap_or_else(|| DEFAULT_OPENWEATHER_URL.to_string()),
            )?,
            openweather_key: get(OPENWEATHER_KEY_ENV),
            openweather_lang: get(OPENWEATHER_LANG_ENV)
                .unwrap_or_else(|| DEFAULT_OPENWEATHER_LANG.to_string()),
            order_api_url: get(ORDER_API_URL_ENV)
                .map(|v| parse_url(ORDER_API_URL_ENV, &v))
                .transpose()?,
            http_timeout: Duration::from_secs(parse_or(
                HTTP_TIMEOUT_ENV,
                get(HTTP_TIMEOUT_ENV),
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        };

        let backend = match get(SESSION_BACKEND_ENV) {
            Some(v) => v.parse().map_err(|reason| ConfigError::Invalid {
                var: SESSION_BACKEND_ENV,
                reason,
            })?,
            None => SessionBackend::default(),
        };

        let sessions = SessionConfig {
            backend,
            dir: get(SESSION_DIR_ENV)
                .map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned()))
                .unwrap_or_else(|| state_dir().join("sessions")),
            max_code_attempts: get(MAX_CODE_ATTEMPTS_ENV)
                .map(|v| parse_value::<u32>(MAX_CODE_ATTEMPTS_ENV, &v))
                .transpose()?,
            ttl: get(SESSION_TTL_ENV)
                .map(|v| parse_value::<u64>(SESSION_TTL_ENV, &v).map(Duration::from_secs))
                .transpose()?,
        };

        Ok(Self {
            telegram,
            upstream,
            sessions,
        })
    }
}

fn parse_url(var: &'static str, value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            var,
            reason: format!("'{}' is not an http(s) base URL", value),
        });
    }
    Ok(url)
}

fn parse_value<T: FromStr>(var: &'static str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

fn parse_or<T: FromStr>(var: &'static str, value: Option<String>, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => parse_value(var, &v),
        None => Ok(default),
    }
}

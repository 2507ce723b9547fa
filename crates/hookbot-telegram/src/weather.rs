//! Weather bot backed by OpenWeatherMap.
//!
//! `/start` offers a keyboard of preset cities. `/weather <city>` and any
//! other text look a city up.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::utils::command::BotCommands;
use tracing::{debug, warn};

use hookbot_core::{escape_markdown_v2, format_fixed, format_number};
use hookbot_models::ChatKey;
use hookbot_upstream::{CurrentWeather, OpenWeatherClient, UpstreamError};

use crate::error::Result;
use crate::handler::UpdateHandler;
use crate::transport::{MessageSender, Reply};
use crate::update::{command_name, normalize_command, Inbound};

/// Callback data prefix of the preset city buttons.
pub const CALLBACK_PREFIX: &str = "weather_";

/// Preset cities: button label (also accepted as typed input) and the name
/// sent to OpenWeatherMap.
pub const PRESET_CITIES: [(&str, &str); 4] = [
    ("تهران", "Tehran"),
    ("ایلام", "Ilam"),
    ("ساری", "Sari"),
    ("ملایر", "Malayer"),
];

const WELCOME_TEXT: &str =
    "👋 Welcome to the weather bot\\! Send me any city name, or pick one below\\.";

const WEATHER_USAGE: &str = "Usage: /weather \\<city\\> \\(e\\.g\\., /weather London\\)";

/// Commands understood by the weather bot.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum WeatherCommand {
    #[command(description = "Show preset cities")]
    Start,

    #[command(description = "Current weather: /weather <city>")]
    Weather(String),
}

/// Maps a preset label to the name OpenWeatherMap knows; other names pass
/// through unchanged.
pub fn resolve_city(city: &str) -> &str {
    PRESET_CITIES
        .iter()
        .find(|(label, _)| *label == city)
        .map(|(_, name)| *name)
        .unwrap_or(city)
}

/// Formats a weather report for `city` as the user named it.
pub fn format_weather(city: &str, weather: &CurrentWeather) -> String {
    format!(
        "✨ *Weather in {}*\n\
         🌡️ Temperature: {}°C\n\
         💧 Humidity: {}%\n\
         💨 Wind speed: {} m/s\n\
         ☁️ Conditions: {}",
        escape_markdown_v2(city),
        escape_markdown_v2(&format_fixed(weather.celsius(), 1)),
        escape_markdown_v2(&format_number(weather.main.humidity)),
        escape_markdown_v2(&format_number(weather.wind.speed)),
        escape_markdown_v2(weather.description().unwrap_or("unknown")),
    )
}

/// What a text message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Request {
    Welcome,
    Usage,
    Lookup(String),
}

fn classify(text: &str) -> Request {
    let text = normalize_command(text);
    match WeatherCommand::parse(&text, "") {
        Ok(WeatherCommand::Start) => Request::Welcome,
        Ok(WeatherCommand::Weather(city)) if city.trim().is_empty() => Request::Usage,
        Ok(WeatherCommand::Weather(city)) => Request::Lookup(city.trim().to_string()),
        Err(_) => match command_name(&text).as_deref() {
            Some("/start") => Request::Welcome,
            Some("/weather") => Request::Usage,
            _ => Request::Lookup(text),
        },
    }
}

/// Stateless command dispatcher for the weather bot.
pub struct WeatherDispatcher {
    api: OpenWeatherClient,
    sender: Arc<dyn MessageSender>,
}

impl WeatherDispatcher {
    pub fn new(api: OpenWeatherClient, sender: Arc<dyn MessageSender>) -> Self {
        Self { api, sender }
    }

    /// Builds the `/start` reply with the preset city keyboard.
    pub fn welcome() -> Reply {
        Reply::markdown(WELCOME_TEXT).with_buttons(
            PRESET_CITIES
                .iter()
                .map(|(label, name)| (*label, format!("{}{}", CALLBACK_PREFIX, name))),
        )
    }

    /// Looks up `city` and formats the reply.
    pub async fn lookup(&self, city: &str) -> Reply {
        let text = match self.api.current(resolve_city(city)).await {
            Ok(weather) => format_weather(city, &weather),
            Err(e @ (UpstreamError::NotFound(_) | UpstreamError::Status { .. })) => {
                debug!(city, error = %e, "No weather data");
                format!("❌ No weather data found for {}", escape_markdown_v2(city))
            }
            Err(e) => {
                warn!(city, error = %e, "Weather lookup failed");
                "⚠️ The weather service is unavailable\\. Please try again later\\.".to_string()
            }
        };
        Reply::markdown(text)
    }

    async fn handle_text(&self, chat: ChatKey, text: &str) -> Result<()> {
        let reply = match classify(text) {
            Request::Welcome => Self::welcome(),
            Request::Usage => Reply::markdown(WEATHER_USAGE),
            Request::Lookup(city) if city.is_empty() => return Ok(()),
            Request::Lookup(city) => self.lookup(&city).await,
        };
        self.sender.send_reply(chat, reply).await
    }

    async fn handle_callback(&self, chat: ChatKey, id: &str, data: &str) -> Result<()> {
        self.sender.ack_callback(id).await?;
        match data.strip_prefix(CALLBACK_PREFIX) {
            Some(city) if !city.is_empty() => {
                let reply = self.lookup(city).await;
                self.sender.send_reply(chat, reply).await
            }
            _ => {
                debug!(chat_id = %chat, data, "Ignoring unknown callback");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl UpdateHandler for WeatherDispatcher {
    fn name(&self) -> &'static str {
        "weather"
    }

    async fn handle(&self, inbound: Inbound) -> Result<()> {
        match inbound {
            Inbound::Text { chat, text } => self.handle_text(chat, &text).await,
            Inbound::Callback { chat, id, data } => self.handle_callback(chat, &id, &data).await,
        }
    }
}

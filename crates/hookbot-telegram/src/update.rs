//! Inbound Telegram updates.
//!
//! Webhook payloads are decoded into the minimal [`WebhookUpdate`] shape and
//! reduced to an [`Inbound`] event. Polling mode builds the same event from
//! teloxide's own types, so both paths reach the bots identically.

use serde::Deserialize;
use teloxide::types::{CallbackQuery, Message};

use hookbot_models::ChatKey;

/// What a bot reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A text message.
    Text { chat: ChatKey, text: String },
    /// A press on an inline keyboard button.
    Callback {
        chat: ChatKey,
        id: String,
        data: String,
    },
}

impl Inbound {
    /// The chat the event came from.
    pub fn chat(&self) -> ChatKey {
        match self {
            Inbound::Text { chat, .. } | Inbound::Callback { chat, .. } => *chat,
        }
    }

    /// Builds an event from a polled message; non-text messages yield `None`.
    pub fn from_message(msg: &Message) -> Option<Self> {
        Some(Inbound::Text {
            chat: ChatKey(msg.chat.id.0),
            text: msg.text()?.to_string(),
        })
    }

    /// Builds an event from a polled callback query.
    pub fn from_callback(query: &CallbackQuery) -> Option<Self> {
        let chat = query.message.as_ref()?.chat().id.0;
        Some(Inbound::Callback {
            chat: ChatKey(chat),
            id: query.id.to_string(),
            data: query.data.clone()?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookChat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookMessage {
    pub chat: WebhookChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookCallback {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<WebhookMessage>,
}

/// The parts of a Telegram `Update` the bots use. Everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookUpdate {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<WebhookMessage>,
    #[serde(default)]
    pub callback_query: Option<WebhookCallback>,
}

impl WebhookUpdate {
    /// Parses a raw webhook body. Anything that is not a JSON object of the
    /// expected shape yields `None`.
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    /// Reduces the update to the event a bot reacts to.
    pub fn into_inbound(self) -> Option<Inbound> {
        if let Some(message) = self.message {
            return Some(Inbound::Text {
                chat: ChatKey(message.chat.id),
                text: message.text?,
            });
        }
        let callback = self.callback_query?;
        Some(Inbound::Callback {
            chat: ChatKey(callback.message?.chat.id),
            id: callback.id,
            data: callback.data?,
        })
    }
}

/// Returns the lowercased command name of `text` without any `@botname`
/// suffix, or `None` when `text` is not a command.
///
/// `"/Start@HookBot ref123"` yields `Some("/start")`.
pub fn command_name(text: &str) -> Option<String> {
    let head = text.split_whitespace().next()?;
    if !head.starts_with('/') {
        return None;
    }
    let name = head.split_once('@').map_or(head, |(name, _)| name);
    Some(name.to_lowercase())
}

/// Rewrites a leading command token into its [`command_name`] form and
/// keeps the arguments exactly as typed. Non-command text is only trimmed.
pub fn normalize_command(text: &str) -> String {
    let text = text.trim();
    let Some(name) = command_name(text) else {
        return text.to_string();
    };
    let args = text
        .find(char::is_whitespace)
        .map_or("", |at| &text[at..]);
    format!("{}{}", name, args)
}

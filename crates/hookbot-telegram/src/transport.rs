//! Outbound side of the Telegram Bot API.
//!
//! Bots never hold a teloxide [`Bot`] directly; they talk to a
//! [`MessageSender`], which the real bot implements and tests replace with a
//! recorder.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};
use tracing::debug;
use url::Url;

use hookbot_models::ChatKey;

use crate::error::Result;

/// One outbound chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    /// A message sent without any parse mode.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            keyboard: None,
        }
    }

    /// A message whose text is already MarkdownV2-escaped.
    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: Some(ParseMode::MarkdownV2),
            keyboard: None,
        }
    }

    /// Attaches an inline keyboard of callback buttons, one row per entry.
    pub fn with_buttons<I, L, D>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = (L, D)>,
        L: Into<String>,
        D: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|(label, data)| vec![InlineKeyboardButton::callback(label, data)]);
        self.keyboard = Some(InlineKeyboardMarkup::new(rows));
        self
    }
}

/// Sends messages to Telegram.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Sends `reply` to `chat`.
    async fn send_reply(&self, chat: ChatKey, reply: Reply) -> Result<()>;

    /// Acknowledges a callback query so the client stops its spinner.
    async fn ack_callback(&self, callback_id: &str) -> Result<()>;

    /// Points Telegram at `url` for update delivery.
    async fn register_webhook(&self, url: Url, secret: Option<&str>) -> Result<()>;
}

#[async_trait]
impl MessageSender for Bot {
    async fn send_reply(&self, chat: ChatKey, reply: Reply) -> Result<()> {
        let mut request = self.send_message(ChatId(chat.get()), reply.text);
        if let Some(mode) = reply.parse_mode {
            request = request.parse_mode(mode);
        }
        if let Some(keyboard) = reply.keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await?;
        debug!(chat_id = %chat, "Reply sent");
        Ok(())
    }

    async fn ack_callback(&self, callback_id: &str) -> Result<()> {
        self.answer_callback_query(callback_id.to_string()).await?;
        Ok(())
    }

    async fn register_webhook(&self, url: Url, secret: Option<&str>) -> Result<()> {
        let mut request = self.set_webhook(url);
        if let Some(secret) = secret {
            request = request.secret_token(secret.to_string());
        }
        request.await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_markdown() {
        assert_eq!(Reply::plain("hi").parse_mode, None);
        assert_eq!(
            Reply::markdown("hi").parse_mode,
            Some(ParseMode::MarkdownV2)
        );
    }

    #[test]
    fn test_with_buttons_one_per_row() {
        let reply = Reply::plain("pick").with_buttons([("Tehran", "weather_Tehran"), ("Sari", "weather_Sari")]);
        let keyboard = reply.keyboard.unwrap();
        assert_eq!(keyboard.inline_keyboard.len(), 2);
        assert_eq!(keyboard.inline_keyboard[0][0].text, "Tehran");
    }
}

//! Recording doubles shared by the in-crate tests.

use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use hookbot_models::ChatKey;

use crate::error::{BotError, Result};
use crate::transport::{MessageSender, Reply};

/// [`MessageSender`] that records everything instead of calling Telegram.
#[derive(Default)]
pub struct RecordingSender {
    pub replies: Mutex<Vec<(ChatKey, Reply)>>,
    pub acked: Mutex<Vec<String>>,
    pub webhooks: Mutex<Vec<(Url, Option<String>)>>,
    pub fail_webhook: bool,
}

impl RecordingSender {
    pub fn failing_webhook() -> Self {
        Self {
            fail_webhook: true,
            ..Self::default()
        }
    }

    /// Texts sent so far, in order.
    pub fn texts(&self) -> Vec<String> {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .map(|(_, reply)| reply.text.clone())
            .collect()
    }

    /// The most recent reply.
    pub fn last(&self) -> Reply {
        self.replies.lock().unwrap().last().cloned().unwrap().1
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_reply(&self, chat: ChatKey, reply: Reply) -> Result<()> {
        self.replies.lock().unwrap().push((chat, reply));
        Ok(())
    }

    async fn ack_callback(&self, callback_id: &str) -> Result<()> {
        self.acked.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }

    async fn register_webhook(&self, url: Url, secret: Option<&str>) -> Result<()> {
        if self.fail_webhook {
            return Err(BotError::WebhookFailed("Bad Request: bad webhook".into()));
        }
        self.webhooks
            .lock()
            .unwrap()
            .push((url, secret.map(str::to_string)));
        Ok(())
    }
}

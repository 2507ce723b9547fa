//! Order onboarding bot.
//!
//! A linear wizard per chat: coupon, email, password and name are collected
//! one message at a time, then the order is placed and the user is asked for
//! the verification code. Progress lives in a [`SessionStore`]; each message
//! reads the chat's session, advances it by at most one step and writes it
//! back.
//!
//! Replies are plain text.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use hookbot_core::{mask_email, mask_string, SessionConfig};
use hookbot_models::{ChatKey, CreateOrderRequest, OrderStatus, Session, Step};
use hookbot_persistence::SessionStore;
use hookbot_upstream::OrderApi;

use crate::error::Result;
use crate::handler::UpdateHandler;
use crate::transport::{MessageSender, Reply};
use crate::update::{command_name, Inbound};

const START_COMMAND: &str = "/start";

/// Length of the verification code.
const CODE_LENGTH: usize = 6;

pub const WELCOME: &str = "👋 Welcome! Please enter your coupon code to start.";
pub const ASK_EMAIL: &str = "📧 Please enter your email:";
pub const ASK_PASSWORD: &str = "🔑 Please enter your password:";
pub const ASK_NAME: &str = "👤 Please enter your full name:";
pub const ASK_CODE: &str = "📩 Order created. Please enter the 6-digit verification code:";
pub const CODE_FORMAT: &str = "🔢 The verification code must be exactly 6 digits. Please try again:";
pub const CREATE_FAILED: &str = "❌ Error creating order. Please try again.";
pub const INVALID_CODE: &str = "⚠️ Invalid code. Please try again.";
pub const TOO_MANY_CODES: &str = "🚫 Too many invalid codes. Please start again with /start";
pub const STATUS_FAILED: &str = "⚠️ Error fetching status. Please try again later.";
pub const START_AGAIN: &str = "❓ Please start again with /start";
pub const EXPIRED: &str = "⌛ Your session has expired. Please start again with /start";
pub const INTERNAL_ERROR: &str = "⚠️ An internal error occurred. Please try again later.";

/// Limits applied to onboarding sessions. Both are off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OnboardingPolicy {
    /// Rejected verification codes allowed before the session is dropped.
    pub max_code_attempts: Option<u32>,
    /// Idle time after which a session is dropped on its next message.
    pub session_ttl: Option<chrono::Duration>,
}

impl OnboardingPolicy {
    /// Builds the policy from session configuration.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            max_code_attempts: config.max_code_attempts,
            session_ttl: config
                .ttl
                .and_then(|ttl| chrono::Duration::from_std(ttl).ok()),
        }
    }

    fn attempts_exhausted(&self, attempts: u32) -> bool {
        self.max_code_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Returns true if `text` is exactly six ASCII digits.
pub fn is_verification_code(text: &str) -> bool {
    text.len() == CODE_LENGTH && text.bytes().all(|b| b.is_ascii_digit())
}

/// Formats the completion summary with personal data masked.
pub fn format_summary(status: &OrderStatus, password_mask: &str) -> String {
    format!(
        "✅ Order Completed:\n\n\
         📧 Email: {}\n\
         🔑 Password: {}\n\
         👤 Name: {}\n\
         🆔 Order ID: {}\n\
         📦 Status: {}",
        mask_email(&status.email),
        password_mask,
        mask_string(&status.name, 2, 0),
        status.order_id,
        status.status,
    )
}

/// The per-chat onboarding wizard.
pub struct OnboardingStateMachine {
    store: Arc<dyn SessionStore>,
    orders: Arc<dyn OrderApi>,
    sender: Arc<dyn MessageSender>,
    policy: OnboardingPolicy,
}

impl OnboardingStateMachine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        orders: Arc<dyn OrderApi>,
        sender: Arc<dyn MessageSender>,
        policy: OnboardingPolicy,
    ) -> Self {
        Self {
            store,
            orders,
            sender,
            policy,
        }
    }

    /// Handles one message and sends the reply.
    ///
    /// Store failures end the chat's session and produce the generic
    /// internal-error reply.
    pub async fn handle_text(&self, chat: ChatKey, text: &str) -> Result<()> {
        let reply = match self.advance(chat, text.trim()).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(chat_id = %chat, error = %e, "Onboarding step failed");
                if let Err(e) = self.store.delete(chat).await {
                    warn!(chat_id = %chat, error = %e, "Failed to drop session after error");
                }
                INTERNAL_ERROR.to_string()
            }
        };
        self.sender.send_reply(chat, Reply::plain(reply)).await
    }

    /// Runs one wizard transition and returns the reply text.
    async fn advance(&self, chat: ChatKey, text: &str) -> Result<String> {
        if command_name(text).as_deref() == Some(START_COMMAND) {
            // Replaces any previous session for the chat.
            self.store.put(chat, &Session::new()).await?;
            info!(chat_id = %chat, "Onboarding started");
            return Ok(WELCOME.to_string());
        }

        let Some(mut session) = self.store.get(chat).await? else {
            debug!(chat_id = %chat, "No session");
            return Ok(START_AGAIN.to_string());
        };

        if let Some(ttl) = self.policy.session_ttl {
            if session.is_expired(ttl, Utc::now()) {
                self.store.delete(chat).await?;
                info!(chat_id = %chat, step = %session.step, "Session expired");
                return Ok(EXPIRED.to_string());
            }
        }

        match session.step {
            Step::Coupon | Step::Email | Step::Password => {
                let next = session.record_answer(text)?;
                self.store.put(chat, &session).await?;
                debug!(chat_id = %chat, step = %next, "Answer recorded");
                Ok(prompt_for(next).to_string())
            }
            Step::Name => {
                session.record_answer(text)?;
                self.place_order(chat, session).await
            }
            Step::Code => self.verify_code(chat, session, text).await,
            Step::Done => Ok(START_AGAIN.to_string()),
        }
    }

    /// Calls create-order with the four collected answers.
    async fn place_order(&self, chat: ChatKey, mut session: Session) -> Result<String> {
        let (coupon, email, password, name) = session.form_answers()?;
        let request = CreateOrderRequest {
            coupon: coupon.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };

        match self.orders.create_order(&request).await {
            Ok(order_id) => {
                info!(chat_id = %chat, order_id = %order_id, "Order placed");
                let mask = mask_string(&request.password, 1, 1);
                session.assign_order(order_id)?;
                session.seal_password(mask);
                self.store.put(chat, &session).await?;
                Ok(ASK_CODE.to_string())
            }
            Err(e) => {
                warn!(chat_id = %chat, error = %e, "Create order failed");
                self.store.delete(chat).await?;
                Ok(CREATE_FAILED.to_string())
            }
        }
    }

    /// Submits a verification code and, once accepted, reports the order.
    async fn verify_code(&self, chat: ChatKey, mut session: Session, code: &str) -> Result<String> {
        if !is_verification_code(code) {
            return Ok(CODE_FORMAT.to_string());
        }
        let Some(order_id) = session.order_id.clone() else {
            return Err(hookbot_models::SessionError::MissingField("order_id").into());
        };

        if let Err(e) = self.orders.submit_code(&order_id, code).await {
            let attempts = session.record_rejected_code();
            warn!(chat_id = %chat, order_id = %order_id, attempts, error = %e, "Code rejected");
            if self.policy.attempts_exhausted(attempts) {
                self.store.delete(chat).await?;
                return Ok(TOO_MANY_CODES.to_string());
            }
            self.store.put(chat, &session).await?;
            return Ok(INVALID_CODE.to_string());
        }

        session.complete()?;
        let reply = match self.orders.get_order_status(&order_id).await {
            Ok(status) => {
                info!(chat_id = %chat, order_id = %order_id, status = %status.status, "Onboarding completed");
                let mask = session.password_mask.as_deref().unwrap_or_default();
                format_summary(&status, mask)
            }
            Err(e) => {
                warn!(chat_id = %chat, order_id = %order_id, error = %e, "Order status failed");
                STATUS_FAILED.to_string()
            }
        };
        self.store.delete(chat).await?;
        Ok(reply)
    }
}

/// The prompt shown when the wizard reaches `step`.
fn prompt_for(step: Step) -> &'static str {
    match step {
        Step::Coupon => WELCOME,
        Step::Email => ASK_EMAIL,
        Step::Password => ASK_PASSWORD,
        Step::Name => ASK_NAME,
        Step::Code => ASK_CODE,
        Step::Done => START_AGAIN,
    }
}

#[async_trait]
impl UpdateHandler for OnboardingStateMachine {
    fn name(&self) -> &'static str {
        "order"
    }

    async fn handle(&self, inbound: Inbound) -> Result<()> {
        match inbound {
            Inbound::Text { chat, text } => self.handle_text(chat, &text).await,
            Inbound::Callback { chat, .. } => {
                debug!(chat_id = %chat, "Ignoring callback query");
                Ok(())
            }
        }
    }
}

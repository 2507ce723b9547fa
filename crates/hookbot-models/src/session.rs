//! Onboarding session types.
//!
//! A [`Session`] records how far a chat has progressed through the order
//! wizard. The wizard is strictly linear; [`Step::next`] is the only way a
//! session moves forward.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::OrderId;

/// Position in the onboarding wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Waiting for a coupon code.
    #[default]
    Coupon,
    /// Waiting for an email address.
    Email,
    /// Waiting for a password.
    Password,
    /// Waiting for the full name; completing it places the order.
    Name,
    /// Waiting for the 6-digit verification code.
    Code,
    /// Wizard finished.
    Done,
}

impl Step {
    /// All steps in wizard order.
    pub const SEQUENCE: [Step; 6] = [
        Step::Coupon,
        Step::Email,
        Step::Password,
        Step::Name,
        Step::Code,
        Step::Done,
    ];

    /// Returns the step that follows this one, or `None` for [`Step::Done`].
    pub fn next(self) -> Option<Step> {
        match self {
            Step::Coupon => Some(Step::Email),
            Step::Email => Some(Step::Password),
            Step::Password => Some(Step::Name),
            Step::Name => Some(Step::Code),
            Step::Code => Some(Step::Done),
            Step::Done => None,
        }
    }

    /// Returns true if the wizard is finished.
    pub fn is_terminal(self) -> bool {
        self == Step::Done
    }

    /// Returns the step as a lowercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Coupon => "coupon",
            Step::Email => "email",
            Step::Password => "password",
            Step::Name => "name",
            Step::Code => "code",
            Step::Done => "done",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by illegal session mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The wizard is already finished.
    #[error("session already completed")]
    AlreadyDone,

    /// An order id was already assigned.
    #[error("order id already assigned: {0}")]
    OrderAlreadyAssigned(OrderId),

    /// A field required by the current step is missing.
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

/// Per-chat onboarding progress.
///
/// The cleartext password only lives here between the password turn and
/// the create-order call. [`Session::seal_password`] swaps it for a
/// display mask before the record is written back. A wizard abandoned
/// between those two turns keeps the cleartext in the stored record until
/// the chat's next message restarts it or finds it expired.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Current wizard position.
    pub step: Step,

    /// Coupon code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,

    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Cleartext password, present only until the order is placed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Full name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Order id assigned by the order API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,

    /// Masked password kept for the completion summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_mask: Option<String>,

    /// Number of verification codes the order API rejected.
    #[serde(default)]
    pub code_attempts: u32,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the session was last advanced.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates a fresh session waiting for a coupon.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            step: Step::Coupon,
            coupon: None,
            email: None,
            password: None,
            name: None,
            order_id: None,
            password_mask: None,
            code_attempts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stores the answer for the current step and moves to the next one.
    ///
    /// Only the four form steps accept answers; the code step is driven by
    /// [`Session::assign_order`] and [`Session::complete`].
    pub fn record_answer(&mut self, answer: impl Into<String>) -> Result<Step, SessionError> {
        let answer = answer.into();
        match self.step {
            Step::Coupon => self.coupon = Some(answer),
            Step::Email => self.email = Some(answer),
            Step::Password => self.password = Some(answer),
            Step::Name => self.name = Some(answer),
            Step::Code | Step::Done => return Err(SessionError::AlreadyDone),
        }
        // The name answer does not advance on its own: the order has to be
        // placed first.
        if self.step != Step::Name {
            self.advance()?;
        }
        self.touch();
        Ok(self.step)
    }

    /// Records the order id returned by create-order and moves to the code step.
    pub fn assign_order(&mut self, order_id: OrderId) -> Result<(), SessionError> {
        if let Some(existing) = &self.order_id {
            return Err(SessionError::OrderAlreadyAssigned(existing.clone()));
        }
        if self.step != Step::Name {
            return Err(SessionError::MissingField("name"));
        }
        self.order_id = Some(order_id);
        self.advance()?;
        self.touch();
        Ok(())
    }

    /// Marks the wizard as finished.
    pub fn complete(&mut self) -> Result<(), SessionError> {
        if self.step != Step::Code {
            return Err(SessionError::MissingField("order_id"));
        }
        self.advance()?;
        self.touch();
        Ok(())
    }

    /// Counts a rejected verification code and returns the new total.
    pub fn record_rejected_code(&mut self) -> u32 {
        self.code_attempts = self.code_attempts.saturating_add(1);
        self.touch();
        self.code_attempts
    }

    /// Removes the cleartext password, keeping only the given display mask.
    pub fn seal_password(&mut self, mask: impl Into<String>) {
        self.password = None;
        self.password_mask = Some(mask.into());
    }

    /// Returns the four form answers once all of them are present.
    pub fn form_answers(&self) -> Result<(&str, &str, &str, &str), SessionError> {
        let coupon = self.coupon.as_deref().ok_or(SessionError::MissingField("coupon"))?;
        let email = self.email.as_deref().ok_or(SessionError::MissingField("email"))?;
        let password = self
            .password
            .as_deref()
            .ok_or(SessionError::MissingField("password"))?;
        let name = self.name.as_deref().ok_or(SessionError::MissingField("name"))?;
        Ok((coupon, email, password, name))
    }

    /// Returns true if the session was last advanced more than `ttl` ago.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.updated_at) > ttl
    }

    /// Updates the last-advanced timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn advance(&mut self) -> Result<(), SessionError> {
        self.step = self.step.next().ok_or(SessionError::AlreadyDone)?;
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("step", &self.step)
            .field("coupon", &self.coupon)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .field("order_id", &self.order_id)
            .field("password_mask", &self.password_mask)
            .field("code_attempts", &self.code_attempts)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

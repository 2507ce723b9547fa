//! Core data models for hookbot.
//!
//! This crate provides the data types shared by the bots: the onboarding
//! [`Session`] and its [`Step`] tag, typed identifiers, and the wire types
//! of the order API.

pub mod ids;
pub mod order;
pub mod session;

// Re-export main types
pub use ids::{ChatKey, OrderId};
pub use order::{ApiEnvelope, CreateOrderRequest, CreatedOrder, OrderStatus, SubmitCodeRequest};
pub use session::{Session, SessionError, Step};

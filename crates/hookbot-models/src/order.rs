//! Wire types of the order API.
//!
//! Every response is wrapped in an [`ApiEnvelope`] carrying a `success` flag;
//! the payload is only meaningful when the flag is set.

use serde::{Deserialize, Serialize};

use crate::ids::OrderId;

/// Response envelope shared by all order API operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the operation succeeded.
    #[serde(default)]
    pub success: bool,

    /// Operation payload, absent for acknowledgement-only responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Returns the payload when the operation succeeded and carried one.
    pub fn into_data(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}

/// Body of `POST /api/v1/order`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub coupon: String,
    pub email: String,
    pub password: String,
    pub name: String,
}

impl std::fmt::Debug for CreateOrderRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateOrderRequest")
            .field("coupon", &self.coupon)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Payload of a successful create-order response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order_id: OrderId,
}

/// Body of `POST /api/v1/order/{orderId}/code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitCodeRequest {
    pub code: String,
}

/// Payload of `GET /api/v1/order/{orderId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub order_id: OrderId,
    #[serde(default)]
    pub status: String,
}

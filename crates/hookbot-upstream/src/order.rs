//! Order API client.
//!
//! The order bot depends on [`OrderApi`] rather than the HTTP client so the
//! onboarding flow can be driven against a stub.

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use hookbot_models::{
    ApiEnvelope, CreateOrderRequest, CreatedOrder, OrderId, OrderStatus, SubmitCodeRequest,
};

use crate::error::{Result, UpstreamError};
use crate::http::{endpoint, read_json};

const SERVICE: &str = "order";

/// Operations of the order API used by the onboarding flow.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Places an order and returns its id.
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderId>;

    /// Submits the verification code for `order`.
    async fn submit_code(&self, order: &OrderId, code: &str) -> Result<()>;

    /// Fetches the current status of `order`.
    async fn get_order_status(&self, order: &OrderId) -> Result<OrderStatus>;
}

/// [`OrderApi`] over HTTP:
///
/// - `POST {base}/api/v1/order`
/// - `POST {base}/api/v1/order/{orderId}/code`
/// - `GET {base}/api/v1/order/{orderId}`
#[derive(Clone)]
pub struct HttpOrderApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpOrderApi {
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn order_url(&self, tail: &[&str]) -> Result<Url> {
        let mut segments = vec!["api", "v1", "order"];
        segments.extend_from_slice(tail);
        endpoint(&self.base_url, &segments)
    }
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderId> {
        let response = self
            .client
            .post(self.order_url(&[])?)
            .json(request)
            .send()
            .await?;
        let envelope: ApiEnvelope<CreatedOrder> = read_json(SERVICE, response).await?;
        let created = envelope
            .into_data()
            .ok_or(UpstreamError::Rejected("create-order"))?;
        info!(order_id = %created.order_id, "Order created");
        Ok(created.order_id)
    }

    async fn submit_code(&self, order: &OrderId, code: &str) -> Result<()> {
        let body = SubmitCodeRequest {
            code: code.to_string(),
        };
        let response = self
            .client
            .post(self.order_url(&[order.as_str(), "code"])?)
            .json(&body)
            .send()
            .await?;
        let envelope: ApiEnvelope<serde_json::Value> = read_json(SERVICE, response).await?;
        if !envelope.success {
            debug!(order_id = %order, "Verification code rejected");
            return Err(UpstreamError::Rejected("submit-code"));
        }
        Ok(())
    }

    async fn get_order_status(&self, order: &OrderId) -> Result<OrderStatus> {
        let response = self
            .client
            .get(self.order_url(&[order.as_str()])?)
            .send()
            .await?;
        let envelope: ApiEnvelope<OrderStatus> = read_json(SERVICE, response).await?;
        envelope
            .into_data()
            .ok_or(UpstreamError::Rejected("get-order-status"))
    }
}

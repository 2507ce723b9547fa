//! Shared HTTP plumbing for the upstream clients.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use tracing::{trace, warn};
use url::Url;

use crate::error::{Result, UpstreamError};

/// User agent sent with every upstream request.
pub const USER_AGENT: &str = concat!("hookbot/", env!("CARGO_PKG_VERSION"));

/// Builds the `reqwest` client shared by all upstream APIs.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| UpstreamError::Configuration(format!("failed to build HTTP client: {}", e)))
}

/// Appends path segments to `base`, percent-encoding each one.
///
/// `base` may or may not end with a slash; `https://host/api/v3` and
/// `https://host/api/v3/` both yield `https://host/api/v3/<segments>`.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| UpstreamError::Configuration(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Checks the status of `response` and decodes its JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(service, status = status.as_u16(), "Upstream returned an error");
        return Err(UpstreamError::Status {
            service,
            status: status.as_u16(),
            body,
        });
    }

    let text = response.text().await?;
    trace!(service, body = %text, "Upstream response");
    serde_json::from_str(&text)
        .map_err(|e| UpstreamError::ResponseParse(format!("{} response: {}", service, e)))
}

//! Shared reqwest plumbing.

use std::time::Duration;

use reqwest::{Client, Response};
use voxlingo_core::ProviderError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a client whose requests are bounded by `timeout`.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Network(format!("failed to build HTTP client: {e}")))
}

/// Classify a transport failure.
pub(crate) fn send_error(err: &reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout)
    } else {
        ProviderError::Network(err.to_string())
    }
}

/// Pass successful responses through; turn anything else into a status error.
pub(crate) async fn check_status(resp: Response) -> Result<Response, ProviderError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(ProviderError::from_status(status, &body))
}

pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

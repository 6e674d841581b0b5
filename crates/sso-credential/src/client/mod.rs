//! HTTP clients for the identity provider and the simple-auth service.
//!
//! Both share one reqwest configuration:
//! - Connection pooling via reqwest
//! - Request and connect timeouts from [`AuthConfig`]
//! - Structured request logging
//!
//! Nothing here retries; retry decisions belong to the caller.

mod aad;
mod simple_auth;

pub use aad::AadTokenClient;
pub use simple_auth::{ServiceErrorBody, SimpleAuthClient, TokenExchangeRequest};

use std::time::Instant;

use reqwest::{Client, RequestBuilder, Response};

use crate::config::{AuthConfig, api};
use crate::error::AuthResult;

/// Build the shared HTTP client.
pub(crate) fn build_http_client(config: &AuthConfig) -> AuthResult<Client> {
    let client = Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(api::MAX_KEEPALIVE)
        .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
        .gzip(true)
        .build()?;

    Ok(client)
}

/// Send a request, logging status and latency.
pub(crate) async fn send_logged(
    request: RequestBuilder,
    operation: &'static str,
) -> reqwest::Result<Response> {
    let started = Instant::now();
    let result = request.send().await;
    let elapsed_ms = started.elapsed().as_millis();

    match &result {
        Ok(response) => tracing::debug!(
            operation,
            status = response.status().as_u16(),
            elapsed_ms,
            "HTTP request completed"
        ),
        Err(e) => tracing::warn!(operation, error = %e, elapsed_ms, "HTTP request failed"),
    }

    result
}

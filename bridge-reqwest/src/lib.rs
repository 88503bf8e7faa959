//! HTTP Client Implementation using Reqwest
//!
//! Provides the production [`HttpClient`] backed by a pooled `reqwest`
//! client. The client executes exactly one request per call; retry,
//! backoff and rate limiting live in `provider-realdebrid`, which also
//! interprets non-2xx statuses. Only transport failures become errors
//! here.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Reqwest-based HTTP client.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a client with the given default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying TLS backend cannot be
    /// initialised.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("debrid-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BridgeError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an externally configured `reqwest::Client`.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn convert_error(error: reqwest::Error) -> BridgeError {
        if error.is_timeout() {
            BridgeError::Timeout
        } else if error.is_connect() {
            BridgeError::Connect(error.to_string())
        } else if error.is_builder() || error.is_request() {
            BridgeError::InvalidRequest(error.to_string())
        } else {
            BridgeError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        debug!(?method, url = %url, "executing HTTP request");

        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response.bytes().await.map_err(Self::convert_error)?;

        debug!(status, bytes = body.len(), "HTTP response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_conversion() {
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Get),
            reqwest::Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Post),
            reqwest::Method::POST
        );
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Delete),
            reqwest::Method::DELETE
        );
    }

    #[test]
    fn client_builds_with_timeout() {
        let client = ReqwestHttpClient::new(Duration::from_secs(5));
        assert!(client.is_ok());
    }
}

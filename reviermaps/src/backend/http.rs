//! HTTP client abstraction for testability.
//!
//! The strategies and the preloader talk to the map backends exclusively
//! through [`AsyncHttpClient`], which enables mock clients in tests. The real
//! implementation wraps `reqwest`.

use super::types::BackendError;
use bytes::Bytes;
use std::future::Future;
use tracing::{debug, trace, warn};

/// Response from the map backend, any status.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header, empty string when absent
    pub content_type: String,
    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for asynchronous HTTP operations against the map backends.
///
/// Uses non-blocking I/O via async/await. Timeouts are applied by callers
/// (per resource class), not by implementations.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// Returns the response for any HTTP status; `Err` only for transport
    /// failures.
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, BackendError>> + Send;

    /// Performs an HTTP POST request with a JSON body.
    fn post_json(
        &self,
        url: &str,
        body: &[u8],
    ) -> impl Future<Output = Result<HttpResponse, BackendError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client tuned for many small tile fetches.
    ///
    /// No request timeout is set on the client itself; the strategy engine
    /// applies its per-class budgets around every call.
    pub fn new() -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| BackendError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn read_response(
        url: &str,
        response: reqwest::Response,
    ) -> Result<HttpResponse, BackendError> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        match response.bytes().await {
            Ok(body) => {
                trace!(url, status, bytes = body.len(), "HTTP response body read");
                Ok(HttpResponse {
                    status,
                    content_type,
                    body,
                })
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to read response body");
                Err(BackendError::InvalidResponse(format!(
                    "Failed to read response: {}",
                    e
                )))
            }
        }
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, BackendError> {
        trace!(url, "HTTP GET request starting");

        match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(url, status = resp.status().as_u16(), "HTTP response received");
                Self::read_response(url, resp).await
            }
            Err(e) => {
                warn!(
                    url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                Err(BackendError::Http(format!("Request failed: {}", e)))
            }
        }
    }

    async fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, BackendError> {
        trace!(url, bytes = body.len(), "HTTP POST request starting");

        match self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .await
        {
            Ok(resp) => {
                debug!(url, status = resp.status().as_u16(), "HTTP response received");
                Self::read_response(url, resp).await
            }
            Err(e) => {
                warn!(url, error = %e, "HTTP POST request failed");
                Err(BackendError::Http(format!("POST request failed: {}", e)))
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Mock HTTP client returning a fixed result.
    #[derive(Clone)]
    pub struct MockHttpClient {
        pub response: Result<HttpResponse, BackendError>,
    }

    impl MockHttpClient {
        pub fn ok(status: u16, content_type: &str, body: &[u8]) -> Self {
            Self {
                response: Ok(HttpResponse {
                    status,
                    content_type: content_type.to_string(),
                    body: Bytes::copy_from_slice(body),
                }),
            }
        }

        pub fn failing() -> Self {
            Self {
                response: Err(BackendError::Http("connection refused".to_string())),
            }
        }
    }

    impl AsyncHttpClient for MockHttpClient {
        async fn get(&self, _url: &str) -> Result<HttpResponse, BackendError> {
            self.response.clone()
        }

        async fn post_json(&self, _url: &str, _body: &[u8]) -> Result<HttpResponse, BackendError> {
            self.response.clone()
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockHttpClient::ok(200, "application/json", b"{}");

        let result = mock.get("http://example.com").await.unwrap();
        assert!(result.is_success());
        assert_eq!(&result.body[..], b"{}");
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = MockHttpClient::failing();
        assert!(mock.get("http://example.com").await.is_err());
    }

    #[test]
    fn test_is_success_boundaries() {
        let mk = |status| HttpResponse {
            status,
            content_type: String::new(),
            body: Bytes::new(),
        };
        assert!(mk(200).is_success());
        assert!(mk(299).is_success());
        assert!(!mk(199).is_success());
        assert!(!mk(404).is_success());
        assert!(!mk(503).is_success());
    }
}

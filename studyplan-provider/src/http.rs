//! HTTP transport backed by `reqwest`.
//!
//! One call is one exchange: connection failures, timeouts and body read
//! errors become [`PlanError::Transport`]; every status code, including 429
//! and 5xx, is returned as a [`RawResponse`] for the layers above to judge.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use studyplan_core::config::DEFAULT_REQUEST_TIMEOUT;
use studyplan_core::error::PlanError;
use studyplan_core::transport::{Transport, TransportInfo};
use studyplan_core::types::{HttpMethod, HttpRequest, RawResponse};

/// `reqwest`-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    info: Arc<TransportInfo>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("info", &self.info)
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport with the default timeout
    pub fn new() -> Result<Self, PlanError> {
        Self::builder().build()
    }

    /// Create a builder for more configuration options
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }

    fn convert_headers(req: &HttpRequest) -> Result<HeaderMap, PlanError> {
        let mut headers = HeaderMap::with_capacity(req.headers.len());
        for (name, value) in &req.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                PlanError::configuration(format!("invalid header name {:?}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                PlanError::configuration(format!("invalid header value for {}: {}", name, e))
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    fn describe(err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn info(&self) -> Arc<TransportInfo> {
        self.info.clone()
    }

    async fn send(&self, req: &HttpRequest) -> Result<RawResponse, PlanError> {
        let headers = Self::convert_headers(req)?;

        let response = self
            .client
            .request(Self::convert_method(req.method), &req.url)
            .headers(headers)
            .body(req.body.clone())
            .send()
            .await
            .map_err(|e| PlanError::transport(Self::describe(&e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PlanError::transport(Self::describe(&e)))?;

        tracing::trace!(status, body_bytes = body.len(), "received response");
        Ok(RawResponse { status, body })
    }
}

/// Builder for [`HttpTransport`]
#[derive(Default)]
pub struct HttpTransportBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpTransportBuilder {
    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the transport
    pub fn build(self) -> Result<HttpTransport, PlanError> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("studyplan/", env!("CARGO_PKG_VERSION")).to_string());

        let client = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
            .user_agent(user_agent)
            .build()
            .map_err(|e| PlanError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpTransport {
            client,
            info: Arc::new(TransportInfo {
                id: "http".to_string(),
                name: "HTTP".to_string(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_headers() {
        let req = HttpRequest::new(HttpMethod::Post, "https://example.test")
            .with_header("Content-Type", "application/json");
        let headers = HttpTransport::convert_headers(&req).unwrap();
        assert_eq!(headers["content-type"], "application/json");
    }

    #[test]
    fn test_invalid_header_rejected() {
        let req = HttpRequest::new(HttpMethod::Post, "https://example.test")
            .with_header("bad header", "x");
        assert!(matches!(
            HttpTransport::convert_headers(&req),
            Err(PlanError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = HttpTransport::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        // Port 9 on localhost (discard) is closed on test machines.
        let req = HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:9/");

        let err = transport.send(&req).await.unwrap_err();
        assert!(matches!(err, PlanError::Transport(_)));
    }
}

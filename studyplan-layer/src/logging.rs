//! Logging layer for transport operations.

use async_trait::async_trait;
use studyplan_core::error::PlanError;
use studyplan_core::layer::{Layer, LayeredTransport};
use studyplan_core::transport::Transport;
use studyplan_core::types::{HttpRequest, RawResponse};

/// Logging layer that logs every exchange with its timing.
///
/// URLs are logged with the `key` query parameter masked.
#[derive(Debug, Clone)]
pub struct LoggingLayer {
    prefix: String,
}

impl LoggingLayer {
    /// Create a new logging layer
    pub fn new() -> Self {
        Self {
            prefix: "[studyplan]".to_string(),
        }
    }

    /// Create a logging layer with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Layer<T> for LoggingLayer {
    type LayeredTransport = LoggingTransport<T>;

    fn layer(&self, inner: T) -> Self::LayeredTransport {
        LoggingTransport {
            inner,
            prefix: self.prefix.clone(),
        }
    }
}

/// Transport wrapped with logging
#[derive(Debug)]
pub struct LoggingTransport<T> {
    inner: T,
    prefix: String,
}

#[async_trait]
impl<T: Transport> LayeredTransport for LoggingTransport<T> {
    type Inner = T;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }

    async fn layered_send(&self, req: &HttpRequest) -> Result<RawResponse, PlanError> {
        tracing::debug!(
            "{} send request: method={}, url={}, body_bytes={}",
            self.prefix,
            req.method,
            req.redacted_url(),
            req.body.len()
        );

        let start = std::time::Instant::now();
        let result = self.inner.send(req).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::debug!(
                    "{} send response: status={}, body_bytes={}, elapsed={:?}",
                    self.prefix,
                    response.status,
                    response.body.len(),
                    elapsed
                );
            }
            Err(e) => {
                tracing::error!("{} send error: {:?}, elapsed={:?}", self.prefix, e, elapsed);
            }
        }

        result
    }
}

studyplan_core::impl_layered_transport!(LoggingTransport<T>);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use studyplan_core::transport::TransportInfo;
    use studyplan_core::types::HttpMethod;

    #[derive(Debug)]
    struct FixedTransport(u16);

    #[async_trait]
    impl Transport for FixedTransport {
        fn info(&self) -> Arc<TransportInfo> {
            Arc::new(TransportInfo {
                id: "fixed".to_string(),
                name: "Fixed".to_string(),
            })
        }

        async fn send(&self, _req: &HttpRequest) -> Result<RawResponse, PlanError> {
            match self.0 {
                0 => Err(PlanError::transport("unreachable host")),
                status => Ok(RawResponse::new(status, "{}")),
            }
        }
    }

    #[tokio::test]
    async fn test_logging_passes_results_through() {
        let req = HttpRequest::new(HttpMethod::Get, "https://example.test/?key=secret");

        let ok = LoggingLayer::new().layer(FixedTransport(429));
        assert_eq!(ok.send(&req).await.unwrap().status, 429);
        assert_eq!(ok.info().id, "fixed");

        let failing = LoggingLayer::with_prefix("[test]").layer(FixedTransport(0));
        assert!(matches!(
            failing.send(&req).await,
            Err(PlanError::Transport(_))
        ));
    }
}

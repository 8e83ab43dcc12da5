//! PlanExecutor implementation.
//!
//! The executor owns the composed transport stack and turns a study request
//! into a rendered plan: build the payload, send it, parse the JSON body and
//! hand it to the renderer.

use crate::config::Endpoint;
use crate::error::PlanError;
use crate::layer::Layer;
use crate::prompt::build_payload;
use crate::render::render;
use crate::transport::{Transport, TransportInfo};
use crate::types::{GeneratedPlan, HttpRequest, StudyRequest};
use std::sync::Arc;
use tracing::Instrument;

/// Type-erased transport that can be shared across threads
type BoxedTransport = Arc<dyn Transport>;

/// Builder for composing a transport with layers.
///
/// Each call to [`layer`](Self::layer) wraps the previous transport in a new
/// concrete type; the stack is type-erased once in [`finish`](Self::finish).
///
/// # Example
///
/// ```ignore
/// let executor = PlanExecutor::builder(HttpTransport::new()?, config.endpoint)
///     .layer(RetryLayer::new().with_policy(config.retry))
///     .layer(LoggingLayer::new())
///     .finish();
/// ```
pub struct PlanExecutorBuilder<T> {
    transport: T,
    endpoint: Endpoint,
}

impl<T: Transport> PlanExecutorBuilder<T> {
    /// Create a new builder with a transport
    pub fn new(transport: T, endpoint: Endpoint) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// Add a layer to wrap the transport
    pub fn layer<L>(self, layer: L) -> PlanExecutorBuilder<L::LayeredTransport>
    where
        L: Layer<T>,
    {
        PlanExecutorBuilder {
            transport: layer.layer(self.transport),
            endpoint: self.endpoint,
        }
    }

    /// Finish building and create a PlanExecutor
    pub fn finish(self) -> PlanExecutor {
        PlanExecutor {
            transport: Arc::new(self.transport),
            endpoint: self.endpoint,
        }
    }
}

/// Main entry point for generating plans.
///
/// Holds no per-request state, so one executor can serve concurrent calls.
pub struct PlanExecutor {
    transport: BoxedTransport,
    endpoint: Endpoint,
}

impl PlanExecutor {
    /// Create a new builder
    pub fn builder<T: Transport>(transport: T, endpoint: Endpoint) -> PlanExecutorBuilder<T> {
        PlanExecutorBuilder::new(transport, endpoint)
    }

    /// Get transport information
    pub fn info(&self) -> Arc<TransportInfo> {
        self.transport.info()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Send a request through the transport stack and parse the body as JSON.
    ///
    /// A non-2xx response that reaches this point (no retry layer in the
    /// stack) is reported as if it were the final attempt. A 2xx body that is
    /// not valid JSON fails with [`PlanError::MalformedResponse`].
    pub async fn execute(&self, req: &HttpRequest) -> Result<serde_json::Value, PlanError> {
        let response = self.transport.send(req).await?;

        if response.is_rate_limited() {
            return Err(PlanError::RateLimited { attempts: 1 });
        }
        if !response.is_success() {
            return Err(PlanError::Http {
                status: response.status,
            });
        }

        serde_json::from_str(&response.body)
            .map_err(|e| PlanError::malformed(format!("response body is not JSON: {}", e)))
    }

    /// Generate and render a study plan
    pub async fn generate_plan(&self, study: &StudyRequest) -> Result<GeneratedPlan, PlanError> {
        study.validate()?;

        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "generate_plan",
            %request_id,
            model = %self.endpoint.model,
        );

        async {
            let payload = build_payload(study);
            let req = HttpRequest::post_json(self.endpoint.generate_content_url(), &payload)?;

            let json = self.execute(&req).await?;
            let plan = render(&json)?;

            tracing::info!(
                html_len = plan.rendered_html.len(),
                citations = plan.citations.len(),
                "plan generated"
            );

            Ok::<_, PlanError>(plan)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawResponse;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<RawResponse, PlanError>>>,
        requests: Arc<Mutex<Vec<HttpRequest>>>,
    }

    impl ScriptedTransport {
        fn with(responses: Vec<Result<RawResponse, PlanError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        fn info(&self) -> Arc<TransportInfo> {
            Arc::new(TransportInfo {
                id: "scripted".to_string(),
                name: "Scripted".to_string(),
            })
        }

        async fn send(&self, req: &HttpRequest) -> Result<RawResponse, PlanError> {
            self.requests.lock().unwrap().push(req.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(PlanError::transport("script exhausted")))
        }
    }

    const URL: &str = "https://example.test";

    fn endpoint() -> Endpoint {
        Endpoint::new("https://example.test/v1beta", "gemini-test", "secret")
    }

    fn study() -> StudyRequest {
        StudyRequest::new("Learn Rust", "7", "3").unwrap()
    }

    #[tokio::test]
    async fn test_generate_plan_sends_grounded_payload() {
        let body = serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "# Day 1\n* Ownership"}]},
                "groundingMetadata": {
                    "groundingAttributions": [
                        {"web": {"uri": "https://doc.rust-lang.org/book/", "title": "The Book"}}
                    ]
                }
            }]
        });
        let transport = ScriptedTransport::with(vec![Ok(RawResponse::new(200, body.to_string()))]);
        let requests = transport.requests.clone();

        let executor = PlanExecutor::builder(transport, endpoint()).finish();
        let plan = executor.generate_plan(&study()).await.unwrap();

        assert_eq!(
            plan.rendered_html,
            "<h3>Day 1</h3><br><ul><li>Ownership</li></ul>"
        );
        assert_eq!(plan.citations.len(), 1);
        assert_eq!(plan.citations[0].title, "The Book");

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].url,
            "https://example.test/v1beta/models/gemini-test:generateContent?key=secret"
        );
        let payload: serde_json::Value = serde_json::from_slice(&sent[0].body).unwrap();
        assert_eq!(payload["tools"][0]["google_search"], serde_json::json!({}));
        assert!(payload["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("\"Learn Rust\""));
    }

    #[tokio::test]
    async fn test_generate_plan_rejects_empty_fields_without_sending() {
        let transport = ScriptedTransport::default();
        let requests = transport.requests.clone();
        let executor = PlanExecutor::builder(transport, endpoint()).finish();

        let study = StudyRequest {
            goal: "Learn Rust".into(),
            total_days: " ".into(),
            hours_per_day: "2".into(),
        };
        let err = executor.generate_plan(&study).await.unwrap_err();

        assert!(matches!(err, PlanError::InvalidInput(_)));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_non_json_body_is_malformed() {
        let transport =
            ScriptedTransport::with(vec![Ok(RawResponse::new(200, "<html>oops</html>"))]);
        let executor = PlanExecutor::builder(transport, endpoint()).finish();

        let req = HttpRequest::post_json(URL, &serde_json::json!({})).unwrap();
        let err = executor.execute(&req).await.unwrap_err();
        assert!(matches!(err, PlanError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_generate_plan_without_text_is_malformed() {
        let body = serde_json::json!({"candidates": [{"finishReason": "SAFETY"}]});
        let transport = ScriptedTransport::with(vec![Ok(RawResponse::new(200, body.to_string()))]);
        let executor = PlanExecutor::builder(transport, endpoint()).finish();

        let err = executor.generate_plan(&study()).await.unwrap_err();
        assert!(matches!(err, PlanError::MalformedResponse(_)));
        assert_eq!(err.user_message(), crate::error::GENERATION_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_execute_without_retry_layer_reports_status() {
        let transport = ScriptedTransport::with(vec![
            Ok(RawResponse::new(429, "")),
            Ok(RawResponse::new(503, "unavailable")),
        ]);
        let executor = PlanExecutor::builder(transport, endpoint()).finish();
        let req = HttpRequest::post_json(URL, &serde_json::json!({})).unwrap();

        assert!(matches!(
            executor.execute(&req).await,
            Err(PlanError::RateLimited { attempts: 1 })
        ));
        assert!(matches!(
            executor.execute(&req).await,
            Err(PlanError::Http { status: 503 })
        ));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let transport = ScriptedTransport::with(vec![Err(PlanError::transport("refused"))]);
        let executor = PlanExecutor::builder(transport, endpoint()).finish();

        let err = executor.generate_plan(&study()).await.unwrap_err();
        assert!(matches!(err, PlanError::Transport(_)));
        assert_eq!(executor.info().id, "scripted");
    }
}

//! Transport trait and core abstractions.

use crate::error::PlanError;
use crate::types::{HttpRequest, RawResponse};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Transport information
#[derive(Debug, Clone)]
pub struct TransportInfo {
    pub id: String,
    pub name: String,
}

/// Core transport trait for the outbound HTTP exchange.
///
/// A transport performs exactly one exchange per call. It reports connectivity
/// failures as [`PlanError::Transport`] and hands every status code back
/// unchanged in a [`RawResponse`]; deciding what a status means is left to
/// the layers above it.
#[async_trait]
pub trait Transport: Send + Sync + Debug + 'static {
    /// Get transport information
    fn info(&self) -> Arc<TransportInfo>;

    /// Send one request and return the raw response
    async fn send(&self, req: &HttpRequest) -> Result<RawResponse, PlanError>;
}

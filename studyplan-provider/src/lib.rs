//! # Studyplan Providers
//!
//! Transport implementations for talking to the generation API.

pub mod http;

// Re-exports
pub use http::{HttpTransport, HttpTransportBuilder};

use studyplan_core::config::PlannerConfig;
use studyplan_core::error::PlanError;

/// Create an HTTP transport using the timeout from `config`
///
/// # Example
///
/// ```ignore
/// use studyplan_provider::http_transport;
///
/// let transport = http_transport(&PlannerConfig::from_env()?)?;
/// ```
pub fn http_transport(config: &PlannerConfig) -> Result<HttpTransport, PlanError> {
    HttpTransport::builder()
        .timeout(config.request_timeout)
        .build()
}

//! # Studyplan Layers
//!
//! Built-in transport layers.
//!
//! Currently implemented layers:
//! - `LoggingLayer`: Logs every HTTP exchange with timing information
//! - `RetryLayer`: Exponential backoff with jitter for rate limits and transient failures
//!
//! ## Usage
//!
//! ```ignore
//! use studyplan_core::PlanExecutor;
//! use studyplan_layer::{LoggingLayer, RetryLayer};
//!
//! let executor = PlanExecutor::builder(transport, endpoint)
//!     .layer(LoggingLayer::new())
//!     .layer(RetryLayer::new().with_max_attempts(5))
//!     .finish();
//! ```

pub mod logging;
pub mod retry;

// Re-exports
pub use logging::LoggingLayer;
pub use retry::{execute, RetryLayer};
pub use tokio_util::sync::CancellationToken;

//! # Studyplan Core
//!
//! Core abstractions for generating grounded study plans.
//!
//! This crate provides the transport and layer traits, the retry state
//! machine, the response renderer and the [`PlanExecutor`] runtime that ties
//! them together.

pub mod config;
pub mod error;
pub mod layer;
pub mod prompt;
pub mod render;
pub mod retry;
pub mod runtime;
pub mod session;
pub mod transport;
pub mod types;

// Re-exports
pub use config::{Endpoint, PlannerConfig, PlannerConfigBuilder};
pub use error::PlanError;
pub use layer::{Layer, LayeredTransport};
pub use render::{render, sources_html};
pub use retry::{AttemptOutcome, RetryPolicy, RetryState};
pub use runtime::{PlanExecutor, PlanExecutorBuilder};
pub use session::SessionContext;
pub use transport::{Transport, TransportInfo};
pub use types::*;

/// Result type alias for plan operations
pub type Result<T> = std::result::Result<T, PlanError>;

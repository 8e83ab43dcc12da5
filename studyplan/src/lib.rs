//! # Studyplan
//!
//! Grounded AI study schedules, rendered as HTML.
//!
//! A study goal, a duration and a daily time budget go in; a day-by-day plan
//! produced by the Gemini API comes out, converted from its Markdown subset
//! into HTML together with the web sources the model cited.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! studyplan = { version = "0.1", features = ["http", "layers"] }
//! ```
//!
//! ```ignore
//! use studyplan::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PlannerConfig::from_env()?;
//!
//! let executor = PlanExecutor::builder(http_transport(&config)?, config.endpoint.clone())
//!     .layer(LoggingLayer::new())
//!     .layer(RetryLayer::new().with_policy(config.retry.clone()))
//!     .finish();
//!
//! let study = StudyRequest::new("Learn Rust", "14", "2")?;
//! let plan = executor.generate_plan(&study).await?;
//! println!("{}", plan.rendered_html);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `http`: `reqwest` transport
//! - `layers`: retry and logging layers
//! - `cli`: the `studyplan` binary
//! - `full`: all features enabled

// Re-export core types and traits
pub use studyplan_core::*;

// Re-export transports under `provider` module
#[cfg(feature = "studyplan-provider")]
pub mod provider {
    //! HTTP transport implementations.
    pub use studyplan_provider::*;
}

// Re-export layers under `layer` module
#[cfg(feature = "studyplan-layer")]
pub mod layers {
    //! Built-in transport layers.
    pub use studyplan_layer::*;
}

/// Prelude module for convenient imports
pub mod prelude {
    //! Prelude module containing the most commonly used types and traits.
    //!
    //! ```
    //! use studyplan::prelude::*;
    //! ```

    pub use crate::{
        Citation, GeneratedPlan, Layer, PlanError, PlanExecutor, PlannerConfig, Result,
        RetryPolicy, SessionContext, StudyRequest, Transport,
    };

    #[cfg(feature = "studyplan-provider")]
    pub use crate::provider::*;

    #[cfg(feature = "studyplan-layer")]
    pub use crate::layers::*;
}

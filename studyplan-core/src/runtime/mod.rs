//! Runtime layer.
//!
//! Sits between the caller's study request and the transport stack:
//! builds the request payload, runs it through the composed layers and
//! renders the response.

pub mod executor;

pub use executor::{PlanExecutor, PlanExecutorBuilder};

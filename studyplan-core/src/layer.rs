//! Layer trait and abstractions.
//!
//! Layers provide a composable way to wrap transports with cross-cutting
//! concerns like retry and logging.

use crate::error::PlanError;
use crate::transport::{Transport, TransportInfo};
use crate::types::{HttpRequest, RawResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// Layer trait for wrapping transports.
///
/// Each layer wraps an inner transport and returns a new transport with
/// enhanced behaviour.
pub trait Layer<T: Transport> {
    /// The type of the layered transport
    type LayeredTransport: Transport;

    /// Wrap the inner transport with this layer
    fn layer(&self, inner: T) -> Self::LayeredTransport;
}

/// Helper trait for layered transports.
///
/// Provides default forwarding implementations; implementers only override
/// the methods they want to intercept.
#[async_trait]
pub trait LayeredTransport: Sized + Send + Sync {
    /// The inner transport type
    type Inner: Transport;

    /// Get a reference to the inner transport
    fn inner(&self) -> &Self::Inner;

    /// Default implementation for info - forwards to inner
    fn layered_info(&self) -> Arc<TransportInfo> {
        self.inner().info()
    }

    /// Default implementation for send - forwards to inner
    async fn layered_send(&self, req: &HttpRequest) -> Result<RawResponse, PlanError> {
        self.inner().send(req).await
    }
}

/// Implement `Transport` for a generic layered transport by forwarding to its
/// `LayeredTransport` methods.
///
/// ```ignore
/// studyplan_core::impl_layered_transport!(RetryTransport<T>);
/// ```
#[macro_export]
macro_rules! impl_layered_transport {
    ($type:ident < $param:ident >) => {
        #[async_trait::async_trait]
        impl<$param: $crate::transport::Transport> $crate::transport::Transport for $type<$param> {
            fn info(&self) -> std::sync::Arc<$crate::transport::TransportInfo> {
                $crate::layer::LayeredTransport::layered_info(self)
            }

            async fn send(
                &self,
                req: &$crate::types::HttpRequest,
            ) -> Result<$crate::types::RawResponse, $crate::error::PlanError> {
                $crate::layer::LayeredTransport::layered_send(self, req).await
            }
        }
    };
}

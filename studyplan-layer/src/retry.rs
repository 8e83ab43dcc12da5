//! Retry layer with exponential backoff and jitter.
//!
//! Drives [`RetryState`] from `studyplan-core`: every attempt outcome and
//! every finished wait is fed back into the state machine, which decides
//! whether to send again, back off, or stop.

use async_trait::async_trait;
use std::time::Duration;
use studyplan_core::error::PlanError;
use studyplan_core::layer::{Layer, LayeredTransport};
use studyplan_core::retry::{AttemptOutcome, RetryPolicy, RetryState};
use studyplan_core::transport::Transport;
use studyplan_core::types::{HttpRequest, RawResponse};
use tokio_util::sync::CancellationToken;

/// Retry layer configuration
#[derive(Debug, Clone, Default)]
pub struct RetryLayer {
    policy: RetryPolicy,
    cancellation: Option<CancellationToken>,
}

impl RetryLayer {
    /// Create a new retry layer with the default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set maximum number of attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.policy = self.policy.with_max_attempts(max_attempts);
        self
    }

    /// Set base delay
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.policy = self.policy.with_base_delay(base_delay);
        self
    }

    /// Set jitter bound
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.policy = self.policy.with_jitter(jitter);
        self
    }

    /// Abort retry sequences when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<T: Transport> Layer<T> for RetryLayer {
    type LayeredTransport = RetryTransport<T>;

    fn layer(&self, inner: T) -> Self::LayeredTransport {
        RetryTransport {
            inner,
            config: self.clone(),
        }
    }
}

/// Transport wrapped with retry logic
#[derive(Debug)]
pub struct RetryTransport<T> {
    inner: T,
    config: RetryLayer,
}

#[async_trait]
impl<T: Transport> LayeredTransport for RetryTransport<T> {
    type Inner = T;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }

    async fn layered_send(&self, req: &HttpRequest) -> Result<RawResponse, PlanError> {
        execute(
            &self.inner,
            req,
            &self.config.policy,
            self.config.cancellation.as_ref(),
        )
        .await
    }
}

studyplan_core::impl_layered_transport!(RetryTransport<T>);

/// Send `req` until it succeeds or `policy` runs out of attempts.
///
/// Returns the first 2xx response. On exhaustion the error from the last
/// attempt is returned: [`PlanError::RateLimited`], [`PlanError::Http`] or
/// [`PlanError::Transport`]. Errors of any other kind stop the sequence
/// immediately. `cancel` is checked before every attempt and raced against
/// every send and every backoff wait.
pub async fn execute<T>(
    transport: &T,
    req: &HttpRequest,
    policy: &RetryPolicy,
    cancel: Option<&CancellationToken>,
) -> Result<RawResponse, PlanError>
where
    T: Transport + ?Sized,
{
    let mut state = RetryState::start();

    loop {
        state = match state {
            RetryState::Attempting { attempt } => {
                if cancel.is_some_and(CancellationToken::is_cancelled) {
                    return Err(PlanError::Cancelled);
                }

                let result = send_once(transport, req, cancel).await?;
                let outcome = AttemptOutcome::classify(result);
                if !matches!(outcome, AttemptOutcome::Success(_)) {
                    tracing::debug!(
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts(),
                        ?outcome,
                        "attempt failed"
                    );
                }

                RetryState::Attempting { attempt }.on_outcome(
                    outcome,
                    policy,
                    policy.sample_jitter(),
                )
            }
            backing_off @ RetryState::BackingOff { attempt, delay } => {
                tracing::debug!(
                    "Retry attempt {}/{}, waiting {:?}",
                    attempt + 2,
                    policy.max_attempts(),
                    delay
                );

                wait(delay, cancel).await?;
                backing_off.on_backoff_elapsed()
            }
            RetryState::Succeeded(response) => return Ok(response),
            RetryState::Failed(err) => {
                tracing::warn!(error = %err, "giving up on request");
                return Err(err);
            }
        };
    }
}

/// One transport call; the outer `Err` means the call was abandoned.
async fn send_once<T>(
    transport: &T,
    req: &HttpRequest,
    cancel: Option<&CancellationToken>,
) -> Result<Result<RawResponse, PlanError>, PlanError>
where
    T: Transport + ?Sized,
{
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(PlanError::Cancelled),
            result = transport.send(req) => Ok(result),
        },
        None => Ok(transport.send(req).await),
    }
}

async fn wait(delay: Duration, cancel: Option<&CancellationToken>) -> Result<(), PlanError> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(PlanError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        },
        None => {
            tokio::time::sleep(delay).await;
            Ok(())
        }
    }
}

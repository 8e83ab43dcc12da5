//! Retry policy, backoff and the retry state machine.
//!
//! The state machine is pure: every transition takes the attempt outcome and
//! the jitter sample as arguments, so a sequence of transitions is fully
//! determined by its inputs. Drivers (see `studyplan-layer`) perform the
//! actual sends and waits between transitions.

use crate::error::PlanError;
use crate::types::RawResponse;
use rand::Rng;
use std::time::Duration;

/// Default number of attempts, including the first
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default base delay
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Default upper bound (exclusive) of the random jitter
pub const DEFAULT_JITTER: Duration = Duration::from_millis(1000);

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    jitter: Duration,
}

impl RetryPolicy {
    /// Create a policy with default settings
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            jitter: DEFAULT_JITTER,
        }
    }

    /// Set the maximum number of attempts (clamped to at least one)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the base delay
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the jitter bound
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn jitter(&self) -> Duration {
        self.jitter
    }

    /// Delay before the attempt following zero-based attempt `attempt`:
    /// `2^attempt * base + jitter`, with `jitter` clamped below the bound.
    pub fn backoff_delay(&self, attempt: u32, jitter: Duration) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let exponential = self.base_delay.checked_mul(factor).unwrap_or(Duration::MAX);

        let jitter = if self.jitter.is_zero() {
            Duration::ZERO
        } else {
            jitter.min(self.jitter - Duration::from_nanos(1))
        };

        exponential.saturating_add(jitter)
    }

    /// Draw a jitter sample uniformly from `[0, jitter)`
    pub fn sample_jitter(&self) -> Duration {
        let bound = self.jitter.as_micros() as u64;
        if bound == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(rand::thread_rng().gen_range(0..bound))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// How a single attempt ended
#[derive(Debug)]
pub enum AttemptOutcome {
    /// 2xx response
    Success(RawResponse),
    /// HTTP 429
    RateLimited,
    /// Any other non-2xx status
    HttpStatus(u16),
    /// No response was obtained
    Transport(String),
    /// An error that no amount of retrying will fix
    Fatal(PlanError),
}

impl AttemptOutcome {
    /// Classify the result of one transport call
    pub fn classify(result: Result<RawResponse, PlanError>) -> Self {
        match result {
            Ok(response) if response.is_success() => AttemptOutcome::Success(response),
            Ok(response) if response.is_rate_limited() => AttemptOutcome::RateLimited,
            Ok(response) => AttemptOutcome::HttpStatus(response.status),
            Err(PlanError::Transport(msg)) => AttemptOutcome::Transport(msg),
            Err(err) => AttemptOutcome::Fatal(err),
        }
    }
}

/// State of one request sequence.
///
/// `attempt` is always the zero-based index of the attempt in flight (or the
/// one that just failed, while backing off).
#[derive(Debug)]
pub enum RetryState {
    Attempting { attempt: u32 },
    BackingOff { attempt: u32, delay: Duration },
    Succeeded(RawResponse),
    Failed(PlanError),
}

impl RetryState {
    /// Initial state: about to make the first attempt
    pub fn start() -> Self {
        RetryState::Attempting { attempt: 0 }
    }

    /// Apply the outcome of the attempt in flight.
    ///
    /// States other than `Attempting` are returned unchanged.
    pub fn on_outcome(
        self,
        outcome: AttemptOutcome,
        policy: &RetryPolicy,
        jitter: Duration,
    ) -> Self {
        let attempt = match self {
            RetryState::Attempting { attempt } => attempt,
            other => return other,
        };

        let failure = match outcome {
            AttemptOutcome::Success(response) => return RetryState::Succeeded(response),
            AttemptOutcome::Fatal(err) => return RetryState::Failed(err),
            AttemptOutcome::RateLimited => PlanError::RateLimited {
                attempts: attempt + 1,
            },
            AttemptOutcome::HttpStatus(status) => PlanError::Http { status },
            AttemptOutcome::Transport(msg) => PlanError::Transport(msg),
        };

        if attempt + 1 >= policy.max_attempts() {
            RetryState::Failed(failure)
        } else {
            RetryState::BackingOff {
                attempt,
                delay: policy.backoff_delay(attempt, jitter),
            }
        }
    }

    /// The backoff wait finished; move on to the next attempt.
    ///
    /// States other than `BackingOff` are returned unchanged.
    pub fn on_backoff_elapsed(self) -> Self {
        match self {
            RetryState::BackingOff { attempt, .. } => RetryState::Attempting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RetryState::Succeeded(_) | RetryState::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_backoff_delay_lies_in_window() {
        let policy = RetryPolicy::new();

        for attempt in 0..5u32 {
            let floor = ms(1000 * 2u64.pow(attempt));
            for _ in 0..50 {
                let delay = policy.backoff_delay(attempt, policy.sample_jitter());
                assert!(delay >= floor, "attempt {}: {:?} < {:?}", attempt, delay, floor);
                assert!(
                    delay < floor + ms(1000),
                    "attempt {}: {:?} >= {:?}",
                    attempt,
                    delay,
                    floor + ms(1000)
                );
            }
        }
    }

    #[test]
    fn test_backoff_delay_clamps_oversized_jitter() {
        let policy = RetryPolicy::new();
        let delay = policy.backoff_delay(0, ms(5000));
        assert!(delay < ms(2000));
    }

    #[test]
    fn test_backoff_delay_saturates() {
        let policy = RetryPolicy::new();
        assert_eq!(
            policy.backoff_delay(64, Duration::ZERO),
            Duration::from_secs(u32::MAX as u64)
        );

        let huge = RetryPolicy::new().with_base_delay(Duration::MAX);
        assert_eq!(huge.backoff_delay(3, ms(10)), Duration::MAX);
    }

    #[test]
    fn test_zero_jitter_bound() {
        let policy = RetryPolicy::new().with_jitter(Duration::ZERO);
        assert_eq!(policy.sample_jitter(), Duration::ZERO);
        assert_eq!(policy.backoff_delay(2, ms(300)), ms(4000));
    }

    #[test]
    fn test_max_attempts_clamped() {
        assert_eq!(RetryPolicy::new().with_max_attempts(0).max_attempts(), 1);
    }

    #[test]
    fn test_classify() {
        assert!(matches!(
            AttemptOutcome::classify(Ok(RawResponse::new(200, "{}"))),
            AttemptOutcome::Success(_)
        ));
        assert!(matches!(
            AttemptOutcome::classify(Ok(RawResponse::new(429, ""))),
            AttemptOutcome::RateLimited
        ));
        assert!(matches!(
            AttemptOutcome::classify(Ok(RawResponse::new(503, ""))),
            AttemptOutcome::HttpStatus(503)
        ));
        assert!(matches!(
            AttemptOutcome::classify(Err(PlanError::transport("reset"))),
            AttemptOutcome::Transport(_)
        ));
        assert!(matches!(
            AttemptOutcome::classify(Err(PlanError::Cancelled)),
            AttemptOutcome::Fatal(PlanError::Cancelled)
        ));
    }

    #[test]
    fn test_only_transport_errors_are_retried() {
        for err in [
            PlanError::configuration("bad header"),
            PlanError::malformed("not json"),
            PlanError::invalid_input("goal"),
            PlanError::RateLimited { attempts: 5 },
            PlanError::Http { status: 503 },
        ] {
            let state = RetryState::start().on_outcome(
                AttemptOutcome::classify(Err(err)),
                &RetryPolicy::new(),
                Duration::ZERO,
            );
            assert!(matches!(state, RetryState::Failed(_)), "{:?}", state);
        }

        let state = RetryState::start().on_outcome(
            AttemptOutcome::classify(Err(PlanError::transport("reset"))),
            &RetryPolicy::new(),
            Duration::ZERO,
        );
        assert!(matches!(state, RetryState::BackingOff { attempt: 0, .. }));
    }

    #[test]
    fn test_success_ends_sequence() {
        let policy = RetryPolicy::new();
        let state = RetryState::start().on_outcome(
            AttemptOutcome::Success(RawResponse::new(200, "{}")),
            &policy,
            Duration::ZERO,
        );
        assert!(matches!(state, RetryState::Succeeded(ref r) if r.status == 200));
        assert!(state.is_terminal());
    }

    #[test]
    fn test_rate_limit_backs_off_then_advances() {
        let policy = RetryPolicy::new();
        let outcome = AttemptOutcome::RateLimited;
        let state = RetryState::start().on_outcome(outcome, &policy, ms(250));

        match state {
            RetryState::BackingOff { attempt, delay } => {
                assert_eq!(attempt, 0);
                assert_eq!(delay, ms(1250));
            }
            other => panic!("Expected BackingOff, got {:?}", other),
        }

        let next = RetryState::BackingOff {
            attempt: 2,
            delay: ms(4000),
        }
        .on_backoff_elapsed();
        assert!(matches!(next, RetryState::Attempting { attempt: 3 }));
    }

    #[test]
    fn test_last_attempt_surfaces_most_recent_error() {
        let policy = RetryPolicy::new().with_max_attempts(3);
        let last = || RetryState::Attempting { attempt: 2 };

        assert!(matches!(
            last().on_outcome(AttemptOutcome::RateLimited, &policy, Duration::ZERO),
            RetryState::Failed(PlanError::RateLimited { attempts: 3 })
        ));
        assert!(matches!(
            last().on_outcome(AttemptOutcome::HttpStatus(500), &policy, Duration::ZERO),
            RetryState::Failed(PlanError::Http { status: 500 })
        ));
        assert!(matches!(
            last().on_outcome(
                AttemptOutcome::Transport("refused".into()),
                &policy,
                Duration::ZERO
            ),
            RetryState::Failed(PlanError::Transport(ref msg)) if msg == "refused"
        ));
    }

    #[test]
    fn test_fatal_error_is_not_retried() {
        let policy = RetryPolicy::new();
        let state = RetryState::start().on_outcome(
            AttemptOutcome::Fatal(PlanError::Cancelled),
            &policy,
            Duration::ZERO,
        );
        assert!(matches!(state, RetryState::Failed(PlanError::Cancelled)));
    }

    #[test]
    fn test_full_sequence_of_rate_limits() {
        let policy = RetryPolicy::new();
        let mut state = RetryState::start();
        let mut attempts = 0;

        while !state.is_terminal() {
            state = match state {
                RetryState::Attempting { .. } => {
                    attempts += 1;
                    let outcome = AttemptOutcome::RateLimited;
                    state.on_outcome(outcome, &policy, Duration::ZERO)
                }
                backing_off => backing_off.on_backoff_elapsed(),
            };
        }

        assert_eq!(attempts, 5);
        assert!(matches!(
            state,
            RetryState::Failed(PlanError::RateLimited { attempts: 5 })
        ));
    }

    #[test]
    fn test_terminal_states_ignore_transitions() {
        let policy = RetryPolicy::new();
        let state = RetryState::Failed(PlanError::Cancelled)
            .on_outcome(AttemptOutcome::RateLimited, &policy, Duration::ZERO)
            .on_backoff_elapsed();
        assert!(matches!(state, RetryState::Failed(PlanError::Cancelled)));
    }
}

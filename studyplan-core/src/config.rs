//! Planner configuration.
//!
//! Built either with [`PlannerConfigBuilder`] or from `STUDYPLAN_*`
//! environment variables. Explicit builder calls win over the environment
//! when both are used (`PlannerConfig::env_builder()` then setters).

use crate::error::PlanError;
use crate::retry::RetryPolicy;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_APP_ID: &str = "default-app-id";

pub const ENV_API_KEY: &str = "STUDYPLAN_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "GEMINI_API_KEY";
pub const ENV_API_BASE: &str = "STUDYPLAN_API_BASE";
pub const ENV_MODEL: &str = "STUDYPLAN_MODEL";
pub const ENV_MAX_ATTEMPTS: &str = "STUDYPLAN_MAX_ATTEMPTS";
pub const ENV_TIMEOUT_SECS: &str = "STUDYPLAN_TIMEOUT_SECS";
pub const ENV_APP_ID: &str = "STUDYPLAN_APP_ID";

/// Where generation requests go
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub api_base: String,
    pub model: String,
    api_key: String,
}

impl Endpoint {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// `{api_base}/models/{model}:generateContent?key={api_key}`
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base.trim_end_matches('/'),
            self.model,
            self.api_key
        )
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("api_key", &"***")
            .finish()
    }
}

/// Complete planner configuration
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub endpoint: Endpoint,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub app_id: String,
}

impl PlannerConfig {
    /// Create a builder with defaults and nothing set
    pub fn builder() -> PlannerConfigBuilder {
        PlannerConfigBuilder::default()
    }

    /// Create a builder seeded from the process environment
    pub fn env_builder() -> Result<PlannerConfigBuilder, PlanError> {
        PlannerConfigBuilder::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, PlanError> {
        Self::env_builder()?.build()
    }
}

/// Builder for [`PlannerConfig`]
#[derive(Default)]
pub struct PlannerConfigBuilder {
    api_key: Option<String>,
    api_base: Option<String>,
    model: Option<String>,
    max_attempts: Option<u32>,
    request_timeout: Option<Duration>,
    app_id: Option<String>,
}

impl PlannerConfigBuilder {
    /// Seed a builder from a variable lookup function
    pub fn from_vars<F>(lookup: F) -> Result<Self, PlanError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let max_attempts = get(ENV_MAX_ATTEMPTS)
            .map(|v| parse_number::<u32>(ENV_MAX_ATTEMPTS, &v))
            .transpose()?;
        let timeout_secs = get(ENV_TIMEOUT_SECS)
            .map(|v| parse_number::<u64>(ENV_TIMEOUT_SECS, &v))
            .transpose()?;

        Ok(Self {
            api_key: get(ENV_API_KEY).or_else(|| get(ENV_API_KEY_FALLBACK)),
            api_base: get(ENV_API_BASE),
            model: get(ENV_MODEL),
            max_attempts,
            request_timeout: timeout_secs.map(Duration::from_secs),
            app_id: get(ENV_APP_ID),
        })
    }

    /// Set API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set API base URL
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set model name
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the maximum number of attempts per request
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Set the per-attempt transport timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the application id used for the session context
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<PlannerConfig, PlanError> {
        let api_key = self
            .api_key
            .ok_or_else(|| PlanError::configuration("API key is required"))?;

        if self.max_attempts == Some(0) {
            return Err(PlanError::configuration("max attempts must be at least 1"));
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(PlanError::configuration("request timeout must be positive"));
        }

        let mut retry = RetryPolicy::new();
        if let Some(max_attempts) = self.max_attempts {
            retry = retry.with_max_attempts(max_attempts);
        }

        Ok(PlannerConfig {
            endpoint: Endpoint::new(
                self.api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                api_key,
            ),
            retry,
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            app_id: self.app_id.unwrap_or_else(|| DEFAULT_APP_ID.to_string()),
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, PlanError> {
    value
        .trim()
        .parse()
        .map_err(|_| {
            PlanError::configuration(format!("{} must be a number, got {:?}", name, value))
        })
}

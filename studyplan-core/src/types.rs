//! Core types for plan generation.

use crate::error::PlanError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound HTTP request.
///
/// Built once per call and never mutated afterwards; retries resend the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a request with no headers and an empty body
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Create a `POST` request carrying `payload` as JSON
    pub fn post_json<T: Serialize>(url: impl Into<String>, payload: &T) -> Result<Self, PlanError> {
        let body = serde_json::to_vec(payload)?;
        Ok(Self::new(HttpMethod::Post, url)
            .with_header("Content-Type", "application/json")
            .with_body(body))
    }

    /// Set a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The URL with the value of any `key` query parameter masked, for logs.
    pub fn redacted_url(&self) -> String {
        let Some((base, query)) = self.url.split_once('?') else {
            return self.url.clone();
        };

        let query = query
            .split('&')
            .map(|pair| match pair.split_once('=') {
                Some(("key", _)) => "key=***".to_string(),
                _ => pair.to_string(),
            })
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", base, query)
    }
}

/// Status and body of an HTTP exchange, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// The three inputs collected by the form layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRequest {
    pub goal: String,
    pub total_days: String,
    pub hours_per_day: String,
}

impl StudyRequest {
    /// Build a request, trimming the goal and rejecting empty fields.
    pub fn new(
        goal: impl Into<String>,
        total_days: impl Into<String>,
        hours_per_day: impl Into<String>,
    ) -> Result<Self, PlanError> {
        let request = Self {
            goal: goal.into().trim().to_string(),
            total_days: total_days.into(),
            hours_per_day: hours_per_day.into(),
        };
        request.validate()?;
        Ok(request)
    }

    /// Presence check on all three fields
    pub fn validate(&self) -> Result<(), PlanError> {
        let missing = [
            ("study goal", self.goal.trim()),
            ("total days", self.total_days.trim()),
            ("hours per day", self.hours_per_day.trim()),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PlanError::invalid_input(format!(
                "missing {}",
                missing.join(", ")
            )))
        }
    }
}

/// A web source the model cited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub uri: String,
    pub title: String,
}

/// Rendered plan plus its sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPlan {
    pub rendered_html: String,
    pub citations: Vec<Citation>,
}

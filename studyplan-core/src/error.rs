//! Error types for study plan generation.

/// Shown when the model answered but the plan could not be extracted.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate a plan. Please try a different goal or parameters.";

/// Shown when the form is missing one of its three fields.
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields (Study Goal, Days, and Hours).";

/// Shown for every connection or processing failure.
pub const CONNECTION_FAILED_MESSAGE: &str =
    "An error occurred while connecting to the AI. Run with --log-level debug for details.";

/// The main error type for study plan operations.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// No response was obtained (DNS, connect, timeout, body read)
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP 429 on the final attempt
    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Any other non-2xx status on the final attempt
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// A 2xx response whose body did not carry a plan
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The request sequence was cancelled by the caller
    #[error("Request cancelled")]
    Cancelled,

    /// A required form field is empty
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlanError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// The message the display layer shows for this error.
    ///
    /// Internal error kinds are collapsed into "could not generate" and
    /// "connection/processing error"; the detail goes to the log instead.
    pub fn user_message(&self) -> &'static str {
        match self {
            PlanError::MalformedResponse(_) => GENERATION_FAILED_MESSAGE,
            PlanError::InvalidInput(_) => MISSING_FIELDS_MESSAGE,
            _ => CONNECTION_FAILED_MESSAGE,
        }
    }
}

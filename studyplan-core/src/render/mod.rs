//! Response rendering.
//!
//! Turns a successful `generateContent` JSON payload into a [`GeneratedPlan`].
//! Rendering is a pure function of the payload and never retries.

pub mod citations;
pub mod markdown;

pub use citations::{extract_citations, sources_html};
pub use markdown::{escape_html, to_html};

use crate::error::PlanError;
use crate::types::GeneratedPlan;
use serde_json::Value;

/// Render the first candidate of a response payload.
///
/// Fails with [`PlanError::MalformedResponse`] when
/// `candidates[0].content.parts[0].text` is absent or empty.
pub fn render(payload: &Value) -> Result<GeneratedPlan, PlanError> {
    let candidate = payload
        .get("candidates")
        .and_then(|candidates| candidates.get(0))
        .ok_or_else(|| PlanError::malformed("response has no candidates"))?;

    let text = candidate
        .pointer("/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| PlanError::malformed("first candidate has no text part"))?;

    Ok(GeneratedPlan {
        rendered_html: to_html(text),
        citations: extract_citations(candidate),
    })
}

//! Prompt text and the `generateContent` request body.

use crate::types::StudyRequest;
use serde::Serialize;

/// Persona and formatting rules sent as the system instruction
pub const SYSTEM_PROMPT: &str = "You are an expert, encouraging AI Study Planner and Tutor. \
Your goal is to create a detailed, actionable, and time-bound study schedule based on the user's input.
Format the entire response clearly using Markdown headings (for days), bold text, and numbered or bulleted lists.
Ensure the plan is broken down into manageable sessions that fit the 'Hours Per Day' constraint.
Do not include any introductory or concluding conversational text, just the plan itself.";

/// A single text part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    pub text: String,
}

/// A list of parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// Empty marker enabling Google Search grounding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoogleSearch {}

/// Tool declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    pub google_search: GoogleSearch,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub tools: Vec<ToolSpec>,
    pub system_instruction: Content,
}

/// The user query for a study request
pub fn user_query(request: &StudyRequest) -> String {
    format!(
        "Create a complete study schedule.
The Study Goal is: \"{}\".
The Total Duration is: {} days.
The Time available per day is: {} hours.
Make sure to structure the plan by day, and include specific topics and estimated time for each session within the daily limit.",
        request.goal, request.total_days, request.hours_per_day
    )
}

/// Build the full request body, with search grounding enabled
pub fn build_payload(request: &StudyRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::text(user_query(request))],
        tools: vec![ToolSpec {
            google_search: GoogleSearch::default(),
        }],
        system_instruction: Content::text(SYSTEM_PROMPT),
    }
}

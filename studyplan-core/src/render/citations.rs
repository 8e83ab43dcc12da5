//! Grounding citation extraction.

use super::markdown::escape_html;
use crate::types::Citation;
use serde_json::Value;

/// Extract citations from a candidate's grounding metadata.
///
/// Reads `groundingMetadata.groundingAttributions[].web`, or
/// `groundingMetadata.groundingChunks[].web` when no attributions are present.
/// Entries without a non-empty `uri` and `title` are dropped; order is kept.
pub fn extract_citations(candidate: &Value) -> Vec<Citation> {
    let Some(metadata) = candidate.get("groundingMetadata") else {
        return Vec::new();
    };

    let entries = metadata
        .get("groundingAttributions")
        .and_then(Value::as_array)
        .or_else(|| metadata.get("groundingChunks").and_then(Value::as_array));

    entries
        .map(|entries| entries.iter().filter_map(citation_from_entry).collect())
        .unwrap_or_default()
}

fn citation_from_entry(entry: &Value) -> Option<Citation> {
    let web = entry.get("web")?;
    let uri = non_empty_str(web.get("uri"))?;
    let title = non_empty_str(web.get("title"))?;

    Some(Citation {
        uri: uri.to_string(),
        title: title.to_string(),
    })
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Render citations as `<li>` links, one per source
pub fn sources_html(citations: &[Citation]) -> String {
    citations
        .iter()
        .map(|citation| {
            format!(
                r#"<li><a href="{}" target="_blank">{}</a></li>"#,
                escape_html(&citation.uri),
                escape_html(&citation.title)
            )
        })
        .collect()
}

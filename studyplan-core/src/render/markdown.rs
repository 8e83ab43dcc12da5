//! Markdown subset to HTML.
//!
//! The conversion is a fixed sequence of rewrite passes. Each pass works on
//! the output of the one before it, so the order in [`PASSES`] matters: list
//! wrapping only sees `<li>` lines because list-item detection already ran.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"));

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+ (.*)$").expect("valid regex"));

static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\* (.*)$").expect("valid regex"));

static LIST_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^<li>.*</li>$(?:\n<li>.*</li>$)*").expect("valid regex"));

/// One rewrite pass
pub type Pass = fn(&str) -> String;

/// All passes, in application order
pub const PASSES: &[(&str, Pass)] = &[
    ("line_endings", normalize_line_endings),
    ("bold", bold),
    ("headings", headings),
    ("list_items", list_items),
    ("lists", wrap_lists),
    ("paragraphs", paragraphs),
    ("line_breaks", line_breaks),
];

/// Convert plan text into display HTML
pub fn to_html(text: &str) -> String {
    PASSES.iter().fold(text.to_string(), |html, (name, pass)| {
        let html = pass(&html);
        tracing::trace!(pass = *name, bytes = html.len(), "markdown pass applied");
        html
    })
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// `**text**` becomes `<strong>text</strong>`
fn bold(text: &str) -> String {
    BOLD.replace_all(text, "<strong>${1}</strong>").into_owned()
}

/// `# Title`, `## Title`, ... all become `<h3>Title</h3>`
fn headings(text: &str) -> String {
    HEADING.replace_all(text, "<h3>${1}</h3>").into_owned()
}

/// `* item` becomes `<li>item</li>`
fn list_items(text: &str) -> String {
    LIST_ITEM.replace_all(text, "<li>${1}</li>").into_owned()
}

/// Consecutive `<li>` lines become one `<ul>`.
///
/// Only single newlines join a run; a blank line ends the list. The newline
/// after the run is left in place so it still turns into a break.
///
/// Items inside a run are concatenated with no separator, so no `<br>` ends
/// up between two `<li>`s. The web form kept those newlines and rendered a
/// break inside the `<ul>`.
fn wrap_lists(text: &str) -> String {
    LIST_RUN
        .replace_all(text, |caps: &Captures| {
            let items = caps[0].split('\n').collect::<String>();
            format!("<ul>{}</ul>", items)
        })
        .into_owned()
}

fn paragraphs(text: &str) -> String {
    text.replace("\n\n", "<p></p>")
}

fn line_breaks(text: &str) -> String {
    text.replace('\n', "<br>")
}

/// Escape text for use inside HTML text or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

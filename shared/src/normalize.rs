//! Webhook response normalization.
//!
//! The webhook is free to answer in whatever shape its workflow produced: the
//! answer may live at the top level or under `body`, the sources may be a list,
//! a single object, a bare string, or missing entirely. Everything here is
//! total over [`serde_json::Value`]: any JSON input yields an answer (possibly
//! empty) and an ordered, possibly empty, list of [`SourceEntry`].

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::{NormalizedAnswer, SourceEntry};

const TITLE_KEYS: &[&str] = &["title", "name", "url", "snippet"];
const URL_KEYS: &[&str] = &["url", "link"];
const SNIPPET_KEYS: &[&str] = &["snippet", "summary"];

/// Ordered field paths tried when reading a webhook response.
///
/// Each path is a dot-separated chain of object keys (`body.answer`). The first
/// path holding a present value wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPolicy {
    pub answer_paths: Vec<String>,
    pub source_paths: Vec<String>,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            answer_paths: vec![
                "answer".to_string(),
                "perplexity_raw".to_string(),
                "body.answer".to_string(),
            ],
            source_paths: vec![
                "sources".to_string(),
                "search_results".to_string(),
                "body.search_results".to_string(),
            ],
        }
    }
}

/// Answer plus sources derived from one response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub answer: NormalizedAnswer,
    pub sources: Vec<SourceEntry>,
}

/// A source element no entry can be derived from.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShapeError {
    #[error("source element is null")]
    Null,
}

/// Normalize a parsed webhook body.
pub fn normalize(body: &Value, policy: &ExtractionPolicy) -> Normalized {
    let raw_sources = extract_sources(body, policy).unwrap_or(&Value::Null);

    Normalized {
        answer: extract_answer(body, policy),
        sources: coerce_sources(raw_sources).iter().map(render_source).collect(),
    }
}

/// Pull the answer text out of a response body.
pub fn extract_answer(body: &Value, policy: &ExtractionPolicy) -> NormalizedAnswer {
    let text = first_present(body, policy.answer_paths.as_slice())
        .map(display_text)
        .unwrap_or_default();
    NormalizedAnswer { text }
}

/// Find the raw source value in a response body, if any.
pub fn extract_sources<'a>(body: &'a Value, policy: &ExtractionPolicy) -> Option<&'a Value> {
    first_present(body, policy.source_paths.as_slice())
}

/// Coerce whatever was found under a sources field into a list.
pub fn coerce_sources(raw: &Value) -> Vec<Value> {
    match raw {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

/// Derive a displayable entry from one source element, never failing.
pub fn render_source(element: &Value) -> SourceEntry {
    try_render_source(element).unwrap_or_else(|e| {
        debug!("Substituting fallback source entry: {}", e);
        SourceEntry::fallback()
    })
}

/// Derive a displayable entry from one source element.
///
/// Scalars are shown by their display string, but a `null` element has no
/// meaningful one (it would read as "null"), so it is reported as
/// [`ShapeError::Null`] and [`render_source`] substitutes the fallback entry.
pub fn try_render_source(element: &Value) -> Result<SourceEntry, ShapeError> {
    match element {
        Value::Null => Err(ShapeError::Null),
        Value::Object(_) => Ok(SourceEntry {
            title: first_key(element, TITLE_KEYS).unwrap_or_else(|| "source".to_string()),
            url: first_key(element, URL_KEYS).unwrap_or_default(),
            snippet: first_key(element, SNIPPET_KEYS).unwrap_or_default(),
        }),
        other => {
            let text = display_text(other);
            if text.starts_with("http://") || text.starts_with("https://") {
                Ok(SourceEntry::new(text.clone(), text, ""))
            } else {
                Ok(SourceEntry::new(text, "", ""))
            }
        }
    }
}

/// Whether a field counts as set: not null, false, zero, or empty.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Walk a dot-separated key path through nested objects.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}

fn first_present<'a, S: AsRef<str>>(value: &'a Value, paths: &[S]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| lookup(value, path.as_ref()))
        .find(|found| is_present(found))
}

fn first_key(element: &Value, keys: &[&str]) -> Option<String> {
    first_present(element, keys).map(display_text)
}

/// Strings verbatim, everything else as compact JSON.
fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! Shared data models.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Smallest max-token value the form accepts.
pub const MIN_MAX_TOKENS: u32 = 50;
/// Largest max-token value the form accepts.
pub const MAX_MAX_TOKENS: u32 = 2000;
/// Max-token value preselected in the form.
pub const DEFAULT_MAX_TOKENS: u32 = 500;
/// Temperature preselected in the form.
pub const DEFAULT_TEMPERATURE: f64 = 0.2;
/// Question prefilled in the form.
pub const DEFAULT_QUESTION: &str = "What is the capital of France?";

/// One question as sent to the webhook.
///
/// Built once per submission by [`crate::request::build_query`] and never modified.
#[derive(Debug, Clone, Serialize)]
pub struct Query {
    #[serde(rename = "question")]
    text: String,
    secret: String,
    max_tokens: u32,
    temperature: f64,
    #[serde(rename = "timestamp", serialize_with = "serialize_utc")]
    issued_at: DateTime<Utc>,
}

impl Query {
    pub(crate) fn new(
        text: String,
        secret: String,
        max_tokens: u32,
        temperature: f64,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            text,
            secret,
            max_tokens,
            temperature,
            issued_at,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

fn serialize_utc<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Raw form (or JSON) submission before the input bounds are applied.
///
/// Numbers are kept as loose JSON values: urlencoded forms deliver them as
/// strings, JSON clients as numbers.
#[derive(Debug, Default, Deserialize)]
pub struct AskInput {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub max_tokens: Option<Value>,
    #[serde(default)]
    pub temperature: Option<Value>,
}

/// Form values after the widget bounds have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FormValues {
    pub question: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            question: DEFAULT_QUESTION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl From<AskInput> for FormValues {
    fn from(input: AskInput) -> Self {
        let max_tokens = input
            .max_tokens
            .as_ref()
            .and_then(loose_number)
            .map(|n| n.round().clamp(MIN_MAX_TOKENS as f64, MAX_MAX_TOKENS as f64) as u32)
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let temperature = input
            .temperature
            .as_ref()
            .and_then(loose_number)
            .map(|t| t.clamp(0.0, 1.0))
            .unwrap_or(DEFAULT_TEMPERATURE);

        Self {
            question: input.question,
            max_tokens,
            temperature,
        }
    }
}

fn loose_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Answer text pulled out of a webhook response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedAnswer {
    pub text: String,
}

/// One displayable citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SourceEntry {
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }

    /// Entry shown when nothing usable can be derived.
    pub fn fallback() -> Self {
        Self::new("source", "", "")
    }
}

/// A webhook response that parsed as JSON with a success status.
#[derive(Debug, Clone)]
pub struct WebhookReply {
    /// Body exactly as received, offered for download
    pub raw: String,
    pub body: Value,
}

/// Everything the page needs after a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct AskOutcome {
    pub answer: NormalizedAnswer,
    pub sources: Vec<SourceEntry>,
    #[serde(skip)]
    pub raw_text: String,
    #[serde(rename = "raw")]
    pub raw_json: Value,
}

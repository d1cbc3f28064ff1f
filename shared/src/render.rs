//! HTML rendering for the single-page form.

use base64::Engine;

use crate::models::{AskOutcome, FormValues, SourceEntry, MAX_MAX_TOKENS, MIN_MAX_TOKENS};
use crate::Error;

/// File name offered for the raw response download.
pub const DOWNLOAD_FILE_NAME: &str = "webhook_response.json";

const PAGE_TITLE: &str = "Ask the Agent (Perplexity via n8n)";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 720px; margin: 40px auto; padding: 0 20px; color: #111; }
h1 { font-size: 1.6em; }
label { display: block; margin-top: 12px; font-weight: 500; }
textarea { width: 100%; height: 140px; padding: 8px; box-sizing: border-box; font: inherit; }
.row { display: flex; gap: 24px; }
.row > div { flex: 1; }
input[type="number"], input[type="range"] { width: 100%; margin-top: 4px; }
button { margin-top: 20px; padding: 10px 24px; background: #111; color: #fff; border: none; cursor: pointer; font-size: 1em; }
.banner { padding: 12px 16px; margin-top: 20px; border-radius: 4px; }
.banner.error { background: #fdecea; color: #611a15; }
.banner.warning { background: #fff4e5; color: #663c00; }
.answer { white-space: pre-wrap; }
.caption { color: #666; font-size: 0.9em; margin: 2px 0 8px; }
pre { background: #f6f8fa; padding: 12px; overflow-x: auto; }
"#;

/// What the page shows below the form.
pub enum PageState<'a> {
    /// Nothing submitted yet
    Fresh,
    /// A submission that reached the normalizer
    Answered(&'a AskOutcome),
    /// A submission that ended in an error
    Failed(&'a Error),
}

/// Render the form page, keeping the submitted values in the inputs.
pub fn form_page(form: &FormValues, state: PageState<'_>) -> String {
    let mut content = render_form(form);
    match state {
        PageState::Fresh => {}
        PageState::Answered(outcome) => content.push_str(&render_outcome(outcome)),
        PageState::Failed(err) => content.push_str(&render_failure(err)),
    }
    page(&content)
}

/// Page shown instead of the form when the webhook is not configured.
pub fn setup_error_page(message: &str) -> String {
    page(&format!(
        r#"<div class="banner error">{}</div>"#,
        html_escape(message)
    ))
}

fn page(content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Ask Agent</title>
<style>{style}</style>
</head>
<body>
<h1>{title}</h1>
<p>This app forwards your question to an n8n webhook which calls Perplexity. The app then displays a short answer plus a list of sources.</p>
{content}
</body>
</html>
"#,
        style = STYLE,
        title = PAGE_TITLE,
        content = content,
    )
}

fn render_form(form: &FormValues) -> String {
    format!(
        r#"<form method="POST" action="/">
<label for="question">Question</label>
<textarea id="question" name="question">{question}</textarea>
<div class="row">
<div>
<label for="max_tokens">Max tokens</label>
<input type="number" id="max_tokens" name="max_tokens" min="{min}" max="{max}" step="50" value="{max_tokens}">
</div>
<div>
<label for="temperature">Temperature <output id="temperature_value">{temperature:.2}</output></label>
<input type="range" id="temperature" name="temperature" min="0" max="1" step="0.05" value="{temperature:.2}" oninput="document.getElementById('temperature_value').value = Number(this.value).toFixed(2)">
</div>
</div>
<button type="submit">Ask</button>
</form>
"#,
        question = html_escape(&form.question),
        min = MIN_MAX_TOKENS,
        max = MAX_MAX_TOKENS,
        max_tokens = form.max_tokens,
        temperature = form.temperature,
    )
}

fn render_outcome(outcome: &AskOutcome) -> String {
    let mut html = format!(
        "<h2>Answer</h2>\n<div class=\"answer\">{}</div>\n",
        html_escape(&outcome.answer.text)
    );

    if outcome.sources.is_empty() {
        html.push_str("<p class=\"caption\">No sources returned.</p>\n");
    } else {
        html.push_str("<h2>Sources</h2>\n<ul class=\"sources\">\n");
        for source in &outcome.sources {
            html.push_str(&render_source_item(source));
        }
        html.push_str("</ul>\n");
    }

    let encoded = base64::engine::general_purpose::STANDARD.encode(outcome.raw_text.as_bytes());
    html.push_str(&format!(
        "<p><a download=\"{name}\" href=\"data:application/json;base64,{encoded}\">Download full response (JSON)</a></p>\n",
        name = DOWNLOAD_FILE_NAME,
        encoded = encoded,
    ));
    html.push_str(&format!(
        "<details><summary>Raw response JSON</summary>\n<pre><code>{}</code></pre>\n</details>\n",
        html_escape(&pretty_json(&outcome.raw_json))
    ));

    html
}

/// One list item: a link when a url is known, the title otherwise, snippet as a caption.
fn render_source_item(source: &SourceEntry) -> String {
    let label = if source.url.is_empty() {
        html_escape(&source.title)
    } else {
        format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
            html_escape(safe_href(&source.url)),
            html_escape(&source.title)
        )
    };

    if source.snippet.is_empty() {
        format!("<li>{}</li>\n", label)
    } else {
        format!(
            "<li>{}<div class=\"caption\">{}</div></li>\n",
            label,
            html_escape(&source.snippet)
        )
    }
}

fn render_failure(err: &Error) -> String {
    match err {
        Error::EmptyInput => format!(
            "<div class=\"banner warning\">{}</div>\n",
            html_escape(&err.to_string())
        ),
        Error::Parse { body, .. } => format!(
            "<div class=\"banner error\">{}</div>\n<pre><code>{}</code></pre>\n",
            html_escape(&err.to_string()),
            html_escape(body)
        ),
        Error::Remote { body, .. } => format!(
            "<div class=\"banner error\">{}</div>\n<pre><code>{}</code></pre>\n",
            html_escape(&err.to_string()),
            html_escape(&pretty_json(body))
        ),
        other => format!(
            "<div class=\"banner error\">{}</div>\n",
            html_escape(&other.to_string())
        ),
    }
}

fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Script-capable schemes are not rendered as live links.
fn safe_href(url: &str) -> &str {
    let lowered = url.trim_start().to_ascii_lowercase();
    if ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        "#"
    } else {
        url
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

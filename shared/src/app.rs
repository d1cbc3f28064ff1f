//! Request routing for the form Lambda.
//!
//! Routes:
//! - GET / - The question form
//! - POST / - Submit the form, render answer and sources
//! - POST /v1/ask - Same submission, JSON in and out

use lambda_http::{Body, Error, Request, Response};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::http::{html_response, json_response, not_found, parse_ask_input, ApiResponse};
use crate::models::{AskOutcome, FormValues};
use crate::normalize::normalize;
use crate::render::{self, PageState};
use crate::request::build_query;
use crate::webhook::WebhookClient;
use crate::Config;

/// Application state shared across requests.
pub enum AppState {
    /// Configured and accepting submissions
    Ready {
        config: Config,
        client: WebhookClient,
    },
    /// Setup problem; every request shows it instead of the form
    Misconfigured { message: String },
}

impl AppState {
    /// Build state from the environment, once per cold start.
    pub fn from_env() -> Self {
        match Config::from_env() {
            Ok(config) => Self::from_config(config),
            Err(e) => {
                error!("Refusing submissions: {}", e);
                Self::Misconfigured {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Build state from an explicit configuration.
    pub fn from_config(config: Config) -> Self {
        match WebhookClient::new(&config) {
            Ok(client) => Self::Ready { config, client },
            Err(e) => {
                error!("Refusing submissions: {}", e);
                Self::Misconfigured {
                    message: e.to_string(),
                }
            }
        }
    }
}

/// Run one submission: build the query, call the webhook, normalize the reply.
pub async fn submit(
    config: &Config,
    client: &WebhookClient,
    form: &FormValues,
) -> crate::Result<AskOutcome> {
    let submission_id = Uuid::new_v4();

    let query = build_query(form, config).inspect_err(|_| {
        warn!("Submission {} rejected: blank question", submission_id);
    })?;

    info!(
        "Submission {}: sending question ({} chars, max_tokens={}, temperature={})",
        submission_id,
        query.text().chars().count(),
        query.max_tokens(),
        query.temperature()
    );

    let reply = client.ask(&query).await.inspect_err(|e| {
        error!("Submission {} failed ({}): {}", submission_id, e.kind(), e);
    })?;

    let normalized = normalize(&reply.body, &config.policy);

    info!(
        "Submission {}: answer of {} chars with {} sources",
        submission_id,
        normalized.answer.text.chars().count(),
        normalized.sources.len()
    );

    Ok(AskOutcome {
        answer: normalized.answer,
        sources: normalized.sources,
        raw_text: reply.raw,
        raw_json: reply.body,
    })
}

/// Route a single Lambda HTTP event.
pub async fn handle(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = event.uri().path();

    info!("Form request: {} {}", method, path);

    let (config, client) = match state.as_ref() {
        AppState::Ready { config, client } => (config, client),
        AppState::Misconfigured { message } => {
            return match (method, path) {
                ("POST", "/v1/ask") => {
                    json_response(500, &ApiResponse::<()>::error(message.as_str()))
                }
                ("GET", "/") | ("POST", "/") => {
                    html_response(500, render::setup_error_page(message))
                }
                _ => not_found(),
            };
        }
    };

    match (method, path) {
        ("GET", "/") => html_response(200, render::form_page(&FormValues::default(), PageState::Fresh)),

        ("POST", "/") => {
            let input = match parse_ask_input(&event) {
                Ok(input) => input,
                Err(e) => {
                    warn!("Could not decode form: {}", e);
                    return html_response(
                        400,
                        render::form_page(&FormValues::default(), PageState::Failed(&e)),
                    );
                }
            };

            let form = FormValues::from(input);
            let page = match submit(config, client, &form).await {
                Ok(outcome) => render::form_page(&form, PageState::Answered(&outcome)),
                Err(e) => render::form_page(&form, PageState::Failed(&e)),
            };
            html_response(200, page)
        }

        ("POST", "/v1/ask") => {
            let form = match parse_ask_input(&event) {
                Ok(input) => FormValues::from(input),
                Err(e) => return json_response(e.status_code(), &ApiResponse::<()>::from_error(&e)),
            };

            match submit(config, client, &form).await {
                Ok(outcome) => json_response(200, &ApiResponse::success(outcome)),
                Err(e) => json_response(e.status_code(), &ApiResponse::<()>::from_error(&e)),
            }
        }

        _ => not_found(),
    }
}

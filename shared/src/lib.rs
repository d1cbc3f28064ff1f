//! Shared library for the Ask Agent form Lambda.
//!
//! This crate holds the configuration, the webhook client, the response
//! normalizer, and the page rendering used by the `ask_form` function.

pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod normalize;
pub mod render;
pub mod request;
pub mod webhook;

pub use app::{handle, submit, AppState};
pub use config::Config;
pub use error::{Error, Result};
pub use http::ApiResponse;
pub use models::{AskInput, AskOutcome, FormValues, NormalizedAnswer, Query, SourceEntry, WebhookReply};
pub use normalize::{coerce_sources, normalize, render_source, ExtractionPolicy, Normalized};
pub use request::build_query;
pub use webhook::WebhookClient;

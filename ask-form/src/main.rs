//! Ask Form Lambda - Serves the question form and forwards submissions to n8n.
//!
//! The webhook configuration is read once at cold start. When `N8N_WEBHOOK`
//! is missing the function still starts, but every page shows the setup error
//! and no submissions are accepted.

use lambda_http::{run, service_fn, Error};
use shared::AppState;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::from_env());
    if matches!(state.as_ref(), AppState::Ready { .. }) {
        info!("Ask form ready");
    }

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { shared::handle(state, event).await }
    }))
    .await
}

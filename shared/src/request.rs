//! Builds the payload sent to the webhook.

use chrono::Utc;

use crate::models::{FormValues, Query};
use crate::{Config, Error, Result};

/// Build a query from form values and the static configuration.
///
/// The question is sent as typed; only the blank check trims it. Numeric
/// bounds are already applied by the form decoder.
pub fn build_query(form: &FormValues, config: &Config) -> Result<Query> {
    if form.question.trim().is_empty() {
        return Err(Error::EmptyInput);
    }

    Ok(Query::new(
        form.question.clone(),
        config.shared_secret.clone(),
        form.max_tokens,
        form.temperature,
        Utc::now(),
    ))
}

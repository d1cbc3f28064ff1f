//! HTTP helpers for the form Lambda.

use lambda_http::{Body, Request, RequestPayloadExt, Response};
use serde::Serialize;

use crate::models::AskInput;
use crate::{Error, Result};

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Extra failure context (status and body of a failed webhook call)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
        }
    }

    pub fn error(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
            details: None,
        }
    }
}

impl ApiResponse<()> {
    /// Failure envelope for an error, carrying webhook status/body when present.
    pub fn from_error(err: &Error) -> Self {
        let details = match err {
            Error::Parse { status, body } => Some(serde_json::json!({
                "status": status,
                "raw": body,
            })),
            Error::Remote { status, body } => Some(serde_json::json!({
                "status": status,
                "body": body,
            })),
            _ => None,
        };

        Self {
            details,
            ..ApiResponse::<()>::error(err.to_string())
        }
    }
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(status: u16, data: &T) -> std::result::Result<Response<Body>, lambda_http::Error> {
    let response = Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(data)?))?;
    Ok(response)
}

/// Create an HTML page response.
pub fn html_response(status: u16, html: String) -> std::result::Result<Response<Body>, lambda_http::Error> {
    let response = Response::builder()
        .status(status)
        .header("content-type", "text/html; charset=utf-8")
        .body(Body::from(html))?;
    Ok(response)
}

/// Plain-text 404.
pub fn not_found() -> std::result::Result<Response<Body>, lambda_http::Error> {
    let response = Response::builder()
        .status(404)
        .header("content-type", "text/plain")
        .body(Body::from("Not found"))?;
    Ok(response)
}

/// Decode a form-urlencoded or JSON submission body.
pub fn parse_ask_input(event: &Request) -> Result<AskInput> {
    match event.payload::<AskInput>() {
        Ok(Some(input)) => Ok(input),
        Ok(None) => Err(Error::InvalidInput("Missing request body".to_string())),
        Err(e) => Err(Error::InvalidInput(e.to_string())),
    }
}

//! End-to-end submissions through the router against a local webhook stub.

use std::sync::Arc;
use std::time::Duration;

use lambda_http::{Body, Request};
use serde_json::{json, Value};
use shared::{handle, AppState, Config};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const FRANCE_FORM: &str =
    "question=What+is+the+capital+of+France%3F&max_tokens=500&temperature=0.2";

/// Serve exactly one canned HTTP response and hand back the request body.
async fn spawn_webhook(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/webhook/ask", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request_body = read_request_body(&mut stream).await;

        let reason = if status < 400 { "OK" } else { "Error" };
        let response = format!(
            "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            reason,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        request_body
    });

    (url, handle)
}

async fn read_request_body(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                return String::from_utf8_lossy(&buf[header_end + 4..header_end + 4 + content_length])
                    .to_string();
            }
        }
    }

    String::new()
}

fn state_for(url: &str) -> Arc<AppState> {
    let mut config = Config::new(url, "letmein");
    config.timeout = Duration::from_secs(5);
    Arc::new(AppState::from_config(config))
}

fn form_post(path: &str, body: &str) -> Request {
    lambda_http::http::Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_post(path: &str, body: Value) -> Request {
    lambda_http::http::Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(path: &str) -> Request {
    lambda_http::http::Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::Empty)
        .unwrap()
}

fn body_text(body: &Body) -> String {
    String::from_utf8_lossy(body.as_ref()).to_string()
}

#[tokio::test]
async fn test_answer_with_url_source() {
    let (url, webhook) = spawn_webhook(
        200,
        r#"{"answer":"Paris","sources":["https://en.wikipedia.org/wiki/Paris"]}"#,
    )
    .await;

    let response = handle(state_for(&url), form_post("/", FRANCE_FORM)).await.unwrap();
    assert_eq!(response.status(), 200);

    let html = body_text(response.body());
    assert!(html.contains("<div class=\"answer\">Paris</div>"));
    assert!(html.contains(
        "<li><a href=\"https://en.wikipedia.org/wiki/Paris\" target=\"_blank\" rel=\"noopener noreferrer\">https://en.wikipedia.org/wiki/Paris</a></li>"
    ));
    assert!(!html.contains("class=\"caption\">No sources"));
    assert!(html.contains("Download full response (JSON)"));

    let sent: Value = serde_json::from_str(&webhook.await.unwrap()).unwrap();
    assert_eq!(sent["question"], "What is the capital of France?");
    assert_eq!(sent["secret"], "letmein");
    assert_eq!(sent["max_tokens"], 500);
    assert_eq!(sent["temperature"], 0.2);
    assert!(sent["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_remote_error_shows_status_and_body() {
    let (url, webhook) = spawn_webhook(500, r#"{"error":"down"}"#).await;

    let response = handle(state_for(&url), form_post("/", FRANCE_FORM)).await.unwrap();
    let html = body_text(response.body());

    assert!(html.contains("n8n returned HTTP 500"));
    assert!(html.contains("&quot;error&quot;: &quot;down&quot;"));
    assert!(!html.contains("<h2>Answer</h2>"));
    assert!(!html.contains("<h2>Sources</h2>"));
    webhook.await.unwrap();
}

#[tokio::test]
async fn test_non_json_reply_shows_raw_text() {
    let (url, webhook) = spawn_webhook(200, "not json").await;

    let response = handle(state_for(&url), form_post("/", FRANCE_FORM)).await.unwrap();
    let html = body_text(response.body());

    assert!(html.contains("n8n returned non-JSON (HTTP 200)"));
    assert!(html.contains("<pre><code>not json</code></pre>"));
    assert!(!html.contains("<h2>Answer</h2>"));
    webhook.await.unwrap();
}

#[tokio::test]
async fn test_non_json_error_status_is_parse_error() {
    let (url, webhook) = spawn_webhook(500, "<html>oops</html>").await;

    let response = handle(state_for(&url), form_post("/", FRANCE_FORM)).await.unwrap();
    let html = body_text(response.body());

    assert!(html.contains("n8n returned non-JSON (HTTP 500)"));
    assert!(html.contains("<pre><code>&lt;html&gt;oops&lt;/html&gt;</code></pre>"));
    assert!(!html.contains("n8n returned HTTP 500"));
    assert!(!html.contains("<h2>Answer</h2>"));
    webhook.await.unwrap();
}

#[tokio::test]
async fn test_json_with_status_400_is_remote_error() {
    let (url, webhook) = spawn_webhook(400, r#"{"answer":"x"}"#).await;

    let response = handle(state_for(&url), form_post("/", FRANCE_FORM)).await.unwrap();
    let html = body_text(response.body());

    assert!(html.contains("n8n returned HTTP 400"));
    assert!(html.contains("&quot;answer&quot;: &quot;x&quot;"));
    assert!(!html.contains("<h2>Answer</h2>"));
    assert!(!html.contains("<div class=\"answer\">"));
    webhook.await.unwrap();
}

#[tokio::test]
async fn test_blank_question_sends_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/webhook/ask", listener.local_addr().unwrap());

    let response = handle(
        state_for(&url),
        form_post("/", "question=+++%0A&max_tokens=500&temperature=0.2"),
    )
    .await
    .unwrap();
    let html = body_text(response.body());

    assert!(html.contains("<div class=\"banner warning\">Please type a question.</div>"));
    let accepted = tokio::time::timeout(Duration::from_millis(200), listener.accept()).await;
    assert!(accepted.is_err(), "blank question must not reach the webhook");
}

#[tokio::test]
async fn test_unreachable_webhook_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/webhook/ask", listener.local_addr().unwrap());
    drop(listener);

    let response = handle(state_for(&url), form_post("/", FRANCE_FORM)).await.unwrap();
    let html = body_text(response.body());

    assert!(html.contains("Request to n8n failed:"));
    assert!(!html.contains("<h2>Answer</h2>"));
}

#[tokio::test]
async fn test_slow_webhook_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/webhook/ask", listener.local_addr().unwrap());
    let _silent = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(stream);
    });

    let mut config = Config::new(url, "");
    config.timeout = Duration::from_millis(200);
    let state = Arc::new(AppState::from_config(config));

    let response = handle(state, form_post("/", FRANCE_FORM)).await.unwrap();
    let html = body_text(response.body());
    assert!(html.contains("Request to n8n failed:"));
}

#[tokio::test]
async fn test_nested_body_shape_and_no_sources() {
    let (url, webhook) = spawn_webhook(200, r#"{"body":{"answer":"Nested answer"}}"#).await;

    let response = handle(state_for(&url), form_post("/", FRANCE_FORM)).await.unwrap();
    let html = body_text(response.body());

    assert!(html.contains("<div class=\"answer\">Nested answer</div>"));
    assert!(html.contains("No sources returned."));
    webhook.await.unwrap();
}

#[tokio::test]
async fn test_json_api_returns_normalized_sources() {
    let (url, webhook) = spawn_webhook(
        200,
        r#"{"answer":"Paris","search_results":{"name":"Britannica","link":"https://britannica.com/place/Paris","summary":"Capital of France"}}"#,
    )
    .await;

    let response = handle(
        state_for(&url),
        json_post("/v1/ask", json!({"question": "Capital of France?", "max_tokens": 9999})),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), 200);

    let envelope: Value = serde_json::from_str(&body_text(response.body())).unwrap();
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["data"]["answer"], "Paris");
    assert_eq!(
        envelope["data"]["sources"],
        json!([{
            "title": "Britannica",
            "url": "https://britannica.com/place/Paris",
            "snippet": "Capital of France"
        }])
    );
    assert_eq!(envelope["data"]["raw"]["answer"], "Paris");

    let sent: Value = serde_json::from_str(&webhook.await.unwrap()).unwrap();
    assert_eq!(sent["max_tokens"], 2000);
    assert_eq!(sent["temperature"], 0.2);
}

#[tokio::test]
async fn test_json_api_remote_error_envelope() {
    let (url, webhook) = spawn_webhook(503, r#"{"error":"down"}"#).await;

    let response = handle(state_for(&url), json_post("/v1/ask", json!({"question": "Hi"})))
        .await
        .unwrap();
    assert_eq!(response.status(), 502);

    let envelope: Value = serde_json::from_str(&body_text(response.body())).unwrap();
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["details"]["status"], 503);
    assert_eq!(envelope["details"]["body"], json!({"error": "down"}));
    webhook.await.unwrap();
}

#[tokio::test]
async fn test_missing_webhook_shows_setup_error() {
    let state = Arc::new(AppState::Misconfigured {
        message: shared::Error::ConfigMissing.to_string(),
    });

    let response = handle(Arc::clone(&state), get("/")).await.unwrap();
    assert_eq!(response.status(), 500);
    let html = body_text(response.body());
    assert!(html.contains("N8N_WEBHOOK is not set"));
    assert!(!html.contains("<form"));

    let response = handle(state, form_post("/", FRANCE_FORM)).await.unwrap();
    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn test_form_page_and_unknown_route() {
    let state = state_for("http://127.0.0.1:9/unused");

    let response = handle(Arc::clone(&state), get("/")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(body_text(response.body()).contains("<form method=\"POST\" action=\"/\">"));

    let response = handle(state, get("/admin")).await.unwrap();
    assert_eq!(response.status(), 404);
}

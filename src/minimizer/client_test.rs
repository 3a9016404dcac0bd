use std::sync::{Arc, Mutex};

use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;

use super::*;
use crate::minimizer::config::MinimizerTimeouts;

fn sample_body() -> serde_json::Value {
    serde_json::json!({
        "original": {
            "estados": ["q0", "q1", "q2"],
            "finais": ["q1", "q2"],
            "inicial": "q0",
            "transicoes": { "q0,a": "q1", "q0,b": "q2", "q1,a": "q1", "q2,a": "q2" }
        },
        "minimizado": {
            "estados": ["q0", "{q1,q2}"],
            "finais": ["{q1,q2}"],
            "inicial": "q0",
            "transicoes": { "q0,a": "{q1,q2}", "q0,b": "{q1,q2}", "{q1,q2},a": "{q1,q2}" }
        },
        "log": "merged q1 and q2"
    })
}

// =============================================================================
// PARSING
// =============================================================================

#[test]
fn parse_success_response() {
    let resp = parse_response(200, &sample_body().to_string()).unwrap();
    assert_eq!(resp.original, sample_body()["original"]);
    assert_eq!(resp.minimized["estados"], serde_json::json!(["q0", "{q1,q2}"]));
    assert_eq!(resp.log.as_deref(), Some("merged q1 and q2"));
}

#[test]
fn parse_accepts_english_minimized_key() {
    let body = serde_json::json!({
        "original": { "states": ["q0"] },
        "minimized": { "states": ["q0"] }
    });
    let resp = parse_response(200, &body.to_string()).unwrap();
    assert_eq!(resp.minimized, serde_json::json!({ "states": ["q0"] }));
    assert_eq!(resp.log, None);
}

#[test]
fn parse_tolerates_malformed_log() {
    let mut body = sample_body();
    body["log"] = serde_json::json!(["not", "a", "string"]);
    let resp = parse_response(200, &body.to_string()).unwrap();
    assert_eq!(resp.log, None);

    body["log"] = serde_json::json!("");
    let resp = parse_response(200, &body.to_string()).unwrap();
    assert_eq!(resp.log, None);

    body["log"] = serde_json::Value::Null;
    let resp = parse_response(200, &body.to_string()).unwrap();
    assert_eq!(resp.log, None);
}

#[test]
fn parse_keeps_missing_minimized_as_null() {
    let body = serde_json::json!({ "original": { "states": ["q0"] } });
    let resp = parse_response(200, &body.to_string()).unwrap();
    assert_eq!(resp.original, serde_json::json!({ "states": ["q0"] }));
    assert_eq!(resp.minimized, serde_json::Value::Null);
}

#[test]
fn parse_keeps_description_shape_problems_for_later() {
    let body = serde_json::json!({
        "original": { "estados": ["q0"], "finais": null, "transicoes": { "q0,a": null } },
        "minimizado": { "estados": "q0" }
    });
    let resp = parse_response(200, &body.to_string()).unwrap();
    assert_eq!(resp.original["finais"], serde_json::Value::Null);
    assert_eq!(resp.minimized, serde_json::json!({ "estados": "q0" }));
}

#[test]
fn parse_non_object_success_body_is_malformed() {
    let err = parse_response(200, r#"["q0"]"#).unwrap_err();
    assert!(matches!(err, MinimizerError::MalformedResponse(_)));
    assert!(err.is_connectivity());
}

#[test]
fn interpret_response_takes_parsed_value() {
    let resp = interpret_response(200, sample_body()).unwrap();
    assert_eq!(resp.log.as_deref(), Some("merged q1 and q2"));

    let err = interpret_response(404, serde_json::json!({ "error": "not found" })).unwrap_err();
    assert!(matches!(&err, MinimizerError::Service { status: 404, message } if message == "not found"));
}

#[test]
fn parse_invalid_json_is_malformed() {
    let err = parse_response(200, "<html>oops</html>").unwrap_err();
    assert!(matches!(err, MinimizerError::MalformedResponse(_)));
}

#[test]
fn parse_service_error_message() {
    let body = serde_json::json!({ "error": "Estado 'q9' não declarado" });
    let err = parse_response(400, &body.to_string()).unwrap_err();
    assert!(
        matches!(&err, MinimizerError::Service { status: 400, message } if message == "Estado 'q9' não declarado")
    );
    assert!(!err.is_connectivity());
}

#[test]
fn parse_service_error_without_message() {
    let err = parse_response(500, "{}").unwrap_err();
    assert!(matches!(&err, MinimizerError::Service { status: 500, message } if message == "unknown error"));

    let err = parse_response(500, r#"{"error":""}"#).unwrap_err();
    assert!(matches!(&err, MinimizerError::Service { message, .. } if message == "unknown error"));
}

#[test]
fn parse_service_error_with_structured_message() {
    let err = parse_response(422, r#"{"error":{"line":3}}"#).unwrap_err();
    assert!(matches!(&err, MinimizerError::Service { message, .. } if message == r#"{"line":3}"#));
}

#[test]
fn parse_error_status_with_non_json_body_is_malformed() {
    let err = parse_response(502, "Bad Gateway").unwrap_err();
    assert!(matches!(err, MinimizerError::MalformedResponse(_)));
}

// =============================================================================
// HTTP EXCHANGE
// =============================================================================

type Seen = Arc<Mutex<Vec<(Option<String>, String)>>>;

/// Serve `body` with `status` on an ephemeral port, recording each request's
/// content type and body.
async fn spawn_stub(status: StatusCode, body: String) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let recorder = seen.clone();
    let app = Router::new().route(
        "/",
        post(move |headers: HeaderMap, request: String| {
            let recorder = recorder.clone();
            let body = body.clone();
            async move {
                let content_type = headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .map(ToOwned::to_owned);
                recorder.lock().unwrap().push((content_type, request));
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), seen)
}

fn client_for(url: &str) -> MinimizerClient {
    let config = MinimizerConfig {
        url: url.to_owned(),
        timeouts: MinimizerTimeouts { request_secs: 5, connect_secs: 2 },
    };
    MinimizerClient::new(&config).unwrap()
}

#[tokio::test]
async fn submit_posts_raw_text_once() {
    let (url, seen) = spawn_stub(StatusCode::OK, sample_body().to_string()).await;
    let client = client_for(&url);
    let source = "estados: q0 q1\n  not validated locally \"at all\"\n";

    let resp = client.submit(source).await.unwrap();
    assert_eq!(resp.original, sample_body()["original"]);
    assert_eq!(resp.minimized, sample_body()["minimizado"]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0.as_deref(), Some("text/plain"));
    assert_eq!(seen[0].1, source);
}

#[tokio::test]
async fn submit_surfaces_service_error_without_retry() {
    let body = serde_json::json!({ "error": "AFD inválido" }).to_string();
    let (url, seen) = spawn_stub(StatusCode::BAD_REQUEST, body).await;
    let client = client_for(&url);

    let err = client.submit("garbage").await.unwrap_err();
    assert!(matches!(&err, MinimizerError::Service { status: 400, message } if message == "AFD inválido"));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn submit_reports_malformed_body_as_connectivity() {
    let (url, _seen) = spawn_stub(StatusCode::OK, "not json".to_owned()).await;
    let client = client_for(&url);

    let err = client.submit("q0").await.unwrap_err();
    assert!(err.is_connectivity());
    assert!(matches!(err, MinimizerError::MalformedResponse(_)));
}

#[tokio::test]
async fn submit_reports_unreachable_service() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{addr}");
    let client = client_for(&url);
    assert_eq!(client.url(), url);

    let err = client.submit("q0").await.unwrap_err();
    assert!(err.is_connectivity());
    assert!(matches!(&err, MinimizerError::Unreachable { url: reported, .. } if *reported == url));
}

use super::*;
use serde::Deserialize;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Pong {
    pong: bool,
}

fn client_for(server: &MockServer) -> JsonClient {
    let base_url = Url::parse(&server.uri()).expect("mock server uri is a valid url");
    JsonClient::new(base_url, Service::VectorStore, Some(Duration::from_secs(5)))
}

#[test]
fn error_detail_reads_ollama_errors() {
    assert_eq!(
        error_detail(r#"{"error":"model 'nope' not found"}"#),
        "model 'nope' not found"
    );
}

#[test]
fn error_detail_reads_qdrant_errors() {
    let body = r#"{"status":{"error":"Wrong input: Vector dimension error: expected dim: 4, got 3"},"time":0.0}"#;
    assert_eq!(
        error_detail(body),
        "Wrong input: Vector dimension error: expected dim: 4, got 3"
    );
}

#[test]
fn error_detail_falls_back_to_body() {
    assert_eq!(error_detail("  Bad Gateway \n"), "Bad Gateway");
    assert_eq!(error_detail(""), "<empty body>");

    let long = "x".repeat(MAX_ERROR_DETAIL_CHARS + 10);
    let detail = error_detail(&long);
    assert!(detail.ends_with("..."));
    assert_eq!(detail.chars().count(), MAX_ERROR_DETAIL_CHARS + 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn post_sends_json_and_decodes_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ping"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(serde_json::json!({"hello": "world"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"pong": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let pong: Pong = client
        .post("/ping", &serde_json::json!({"hello": "world"}))
        .expect("request should succeed");

    assert_eq!(pong, Pong { pong: true });
}

#[tokio::test(flavor = "multi_thread")]
async fn non_success_status_is_upstream_error_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"status": {"error": "Not found: Collection `demo` doesn't exist!"}})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get::<Value>("/broken")
        .expect_err("404 should be an error");

    assert_eq!(err.service(), Some(Service::VectorStore));
    let message = err.to_string();
    assert!(message.contains("HTTP 404"), "unexpected message: {message}");
    assert!(message.contains("doesn't exist"), "unexpected message: {message}");
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_body_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get::<Pong>("/garbage")
        .expect_err("garbage should not decode");

    assert!(matches!(
        err,
        RagError::Upstream {
            service: Service::VectorStore,
            ..
        }
    ));
    assert!(err.to_string().contains("Malformed response"));
}

#[test]
fn unreachable_server_is_upstream_error() {
    // Port 9 (discard) is essentially never listening on loopback.
    let base_url = Url::parse("http://127.0.0.1:9").expect("valid url");
    let client = JsonClient::new(base_url, Service::Embedding, Some(Duration::from_secs(2)));

    let err = client
        .get::<Value>("/anything")
        .expect_err("connection should fail");

    assert_eq!(err.service(), Some(Service::Embedding));
}

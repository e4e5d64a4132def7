use super::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn embedder_for(server: &MockServer) -> OllamaEmbedder {
    let base_url = Url::parse(&server.uri()).expect("mock server uri is a valid url");
    OllamaEmbedder::with_url(
        base_url,
        "mxbai-embed-large".to_string(),
        Some(Duration::from_secs(5)),
    )
}

async fn mount_tags(server: &MockServer, names: &[&str]) {
    let models: Vec<_> = names
        .iter()
        .map(|name| json!({"name": name, "size": 669_615_493, "digest": "abc"}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": models})))
        .mount(server)
        .await;
}

#[test]
fn client_configuration() {
    let mut config = Config::default();
    config.ollama.host = "test-host".to_string();
    config.ollama.port = 1234;
    config.embedding.model = "test-model".to_string();

    let embedder = OllamaEmbedder::new(&config).expect("Failed to create client");

    assert_eq!(embedder.model(), "test-model");
    assert_eq!(embedder.client.base_url().host_str(), Some("test-host"));
    assert_eq!(embedder.client.base_url().port(), Some(1234));
    assert_eq!(embedder.client.service(), Service::Embedding);
}

#[test]
fn model_name_matching() {
    assert!(model_matches("mxbai-embed-large:latest", "mxbai-embed-large"));
    assert!(model_matches("gemma3:12b-it-qat", "gemma3:12b-it-qat"));
    assert!(!model_matches("gemma3:4b", "gemma3:12b-it-qat"));
    assert!(!model_matches("gemma3:4b", "gemma3"));
}

#[tokio::test(flavor = "multi_thread")]
async fn embed_returns_first_embedding() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_json(json!({"model": "mxbai-embed-large", "input": "I like to play cricket"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "mxbai-embed-large",
            "embeddings": [[0.25, -0.5, 1.0]],
            "total_duration": 14143917,
            "prompt_eval_count": 8
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = embedder_for(&server);
    let vector = embedder
        .embed("I like to play cricket")
        .expect("embedding should succeed");

    assert_eq!(vector, vec![0.25, -0.5, 1.0]);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_embeddings_field_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"model": "mxbai-embed-large"})))
        .mount(&server)
        .await;

    let embedder = embedder_for(&server);
    let err = embedder.embed("hello").expect_err("should fail");

    assert_eq!(err.service(), Some(Service::Embedding));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_embeddings_list_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embeddings": []})))
        .mount(&server)
        .await;

    let embedder = embedder_for(&server);
    let err = embedder.embed("hello").expect_err("should fail");

    assert!(err.to_string().contains("returned no embeddings"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_model_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"error": "model \"mxbai-embed-large\" not found, try pulling it first"})),
        )
        .mount(&server)
        .await;

    let embedder = embedder_for(&server);
    let err = embedder.embed("hello").expect_err("should fail");

    assert_eq!(err.service(), Some(Service::Embedding));
    assert!(err.to_string().contains("try pulling it first"));
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = embedder_for(&server);
    assert!(embedder.embed("hello").is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn health_check_accepts_latest_tag() {
    let server = MockServer::start().await;
    mount_tags(&server, &["gemma3:12b-it-qat", "mxbai-embed-large:latest"]).await;

    let embedder = embedder_for(&server);
    embedder.health_check().expect("model should be found");

    let models = embedder.list_models().expect("models should list");
    assert_eq!(models.len(), 2);
    assert_eq!(models[1].size, Some(669_615_493));
}

#[tokio::test(flavor = "multi_thread")]
async fn health_check_reports_missing_model() {
    let server = MockServer::start().await;
    mount_tags(&server, &["nomic-embed-text:latest"]).await;

    let embedder = embedder_for(&server);
    let err = embedder.health_check().expect_err("model is missing");

    let message = err.to_string();
    assert!(message.contains("'mxbai-embed-large' is not available"));
    assert!(message.contains("nomic-embed-text:latest"));
}

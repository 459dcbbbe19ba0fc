//! HTTP-level tests for [`OllamaClient`] against a mock Ollama server.
//!
//! These exercise the real wire path: request bodies, status handling, and
//! NDJSON stream decoding over an actual HTTP connection.

use futures::StreamExt;
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ghostwriter_core::backend::CompletionBackend;
use ghostwriter_core::{OllamaClient, OllamaError, Role, Turn};

fn ndjson(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/x-ndjson")
        .set_body_raw(body.as_bytes().to_vec(), "application/x-ndjson")
}

async fn mount_version(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "version": "0.5.1"
        })))
        .mount(server)
        .await;
}

async fn mount_tags(server: &MockServer, models: &[&str]) {
    let models: Vec<_> = models
        .iter()
        .map(|name| serde_json::json!({"name": name, "modified_at": "2024-01-01T00:00:00Z", "size": 1}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "models": models })),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn version_and_liveness() {
    let server = MockServer::start().await;
    mount_version(&server).await;

    let client = OllamaClient::new(server.uri());
    assert!(client.is_running().await);
    assert_eq!(client.version().await.unwrap(), "0.5.1");
}

#[tokio::test]
async fn unreachable_server() {
    // Port 1 is never listening.
    let client = OllamaClient::new("http://127.0.0.1:1");

    assert!(!client.is_running().await);
    assert!(matches!(
        client.version().await,
        Err(OllamaError::Connectivity { .. })
    ));

    // The chat call fails fast with remediation text, before any request.
    let err = client
        .stream_chat("llama3", &[Turn::new(Role::User, "hi")])
        .await
        .err()
        .unwrap();
    assert!(matches!(err, OllamaError::Connectivity { .. }));
    assert!(err.to_string().contains("ollama serve"));
}

#[tokio::test]
async fn installed_models_listing_and_degradation() {
    let server = MockServer::start().await;
    mount_tags(&server, &["llama3", "mistral"]).await;

    let client = OllamaClient::new(server.uri());
    assert_eq!(
        client.installed_models().await,
        vec!["llama3".to_string(), "mistral".to_string()]
    );

    // A failing registry degrades to empty rather than erroring.
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&broken)
        .await;
    let client = OllamaClient::new(broken.uri());
    assert!(client.installed_models().await.is_empty());
}

#[tokio::test]
async fn chat_streams_deltas_in_order() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    mount_tags(&server, &["llama3"]).await;

    let body = concat!(
        "{\"model\":\"llama3\",\"created_at\":\"t0\",\"response\":\"Hel\",\"done\":false}\n",
        "{\"model\":\"llama3\",\"created_at\":\"t1\",\"response\":\"lo\",\"done\":false}\n",
        "{\"model\":\"llama3\",\"created_at\":\"t2\",\"response\":\"\",\"done\":true}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "model": "llama3",
            "stream": true,
            "messages": [
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": ""},
            ],
        })))
        .respond_with(ndjson(body))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri());
    let turns = vec![
        Turn::new(Role::System, "sys"),
        Turn::new(Role::User, "hi"),
        Turn::new(Role::Assistant, ""),
    ];
    let mut stream = client.stream_chat("llama3", &turns).await.unwrap();

    let mut deltas = Vec::new();
    while let Some(item) = stream.next().await {
        deltas.push(item.unwrap());
    }
    // The empty terminal record produces no delta.
    assert_eq!(deltas, vec!["Hel".to_string(), "lo".to_string()]);
}

#[tokio::test]
async fn chat_rejects_missing_model_with_listing() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    mount_tags(&server, &["mistral", "phi"]).await;

    let client = OllamaClient::new(server.uri());
    let err = client
        .stream_chat("llama3", &[Turn::new(Role::User, "hi")])
        .await
        .err()
        .unwrap();

    match &err {
        OllamaError::ModelUnavailable { model, available } => {
            assert_eq!(model, "llama3");
            assert_eq!(available, &vec!["mistral".to_string(), "phi".to_string()]);
        }
        other => panic!("expected ModelUnavailable, got {other}"),
    }
    let text = err.to_string();
    assert!(text.contains("mistral"));
    assert!(text.contains("ollama pull llama3"));
}

#[tokio::test]
async fn chat_proceeds_when_model_listing_is_down() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ndjson("{\"response\":\"ok\",\"done\":true}\n"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri());
    let mut stream = client
        .stream_chat("llama3", &[Turn::new(Role::User, "hi")])
        .await
        .unwrap();
    assert_eq!(stream.next().await.unwrap().unwrap(), "ok");
}

#[tokio::test]
async fn malformed_record_reported_and_stream_continues() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    mount_tags(&server, &["llama3"]).await;

    let body = concat!(
        "{\"response\":\"Hel\",\"done\":false}\n",
        "this is not json\n",
        "{\"response\":\"lo\",\"done\":true}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ndjson(body))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri());
    let mut stream = client
        .stream_chat("llama3", &[Turn::new(Role::User, "hi")])
        .await
        .unwrap();

    assert_eq!(stream.next().await.unwrap().unwrap(), "Hel");
    let err = stream.next().await.unwrap().unwrap_err();
    assert!(err.is_recoverable());
    assert!(matches!(err, OllamaError::Decode(_)));
    // Streaming resumes after the violation.
    assert_eq!(stream.next().await.unwrap().unwrap(), "lo");
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn trailing_partial_record_is_dropped() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    mount_tags(&server, &["llama3"]).await;

    // The connection closes mid-record; the fragment is discarded silently.
    let body = "{\"response\":\"done\",\"done\":false}\n{\"response\":\"trunc";
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ndjson(body))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri());
    let mut stream = client
        .stream_chat("llama3", &[Turn::new(Role::User, "hi")])
        .await
        .unwrap();

    assert_eq!(stream.next().await.unwrap().unwrap(), "done");
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn chat_http_error_is_surfaced() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    mount_tags(&server, &["llama3"]).await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri());
    let err = client
        .stream_chat("llama3", &[Turn::new(Role::User, "hi")])
        .await
        .err()
        .unwrap();
    match err {
        OllamaError::Http { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "model crashed");
        }
        other => panic!("expected Http, got {other}"),
    }
}

#[tokio::test]
async fn pull_streams_progress_records() {
    let server = MockServer::start().await;

    let body = concat!(
        "{\"status\":\"pulling manifest\"}\n",
        "{\"status\":\"downloading\",\"completed\":50,\"total\":200}\n",
        "not json either\n",
        "{\"completed\":10,\"total\":20}\n",
        "{\"status\":\"success\"}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .and(body_partial_json(serde_json::json!({"name": "phi"})))
        .respond_with(ndjson(body))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri());
    let mut stream = client.pull_model("phi").await.unwrap();

    let mut events = Vec::new();
    while let Some(item) = stream.next().await {
        events.push(item.unwrap());
    }

    // Malformed and status-less records are dropped, not surfaced.
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].status, "pulling manifest");
    assert_eq!(events[0].progress, None);
    assert_eq!(events[1].status, "downloading");
    assert_eq!(events[1].progress, Some(25.0));
    assert_eq!(events[2].status, "success");
}

#[tokio::test]
async fn pull_http_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri());
    let err = client.pull_model("nope").await.err().unwrap();
    assert!(matches!(err, OllamaError::Http { .. }));
}

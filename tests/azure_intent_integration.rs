//! Integration tests for remote intent resolution.
//!
//! Each test spins up an Axum server on a random port that mimics the Azure
//! OpenAI chat-completions endpoint, then resolves utterances through the
//! real reqwest provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use voice_bank::config::{AssistantConfig, AzureConfig, DispatchConfig, SpeechConfig};
use voice_bank::dashboard::{ActionDispatcher, Section};
use voice_bank::intent::{Action, FailureKind, IntentResolver};
use voice_bank::speech::{RecordingOutput, Speaker};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// What the stub endpoint saw.
#[derive(Debug, Clone)]
struct Captured {
    deployment: String,
    api_version: Option<String>,
    api_key: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<Captured>>>,
}

async fn completions(
    State(stub): State<Stub>,
    Path(deployment): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    stub.seen.lock().unwrap().push(Captured {
        deployment,
        api_version: query.get("api-version").cloned(),
        api_key: headers
            .get("api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });
    (stub.status, stub.body.clone())
}

/// Wrap model content in a chat-completions envelope.
fn envelope(content: &str) -> String {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 120, "completion_tokens": 18 }
    })
    .to_string()
}

/// Start a stub endpoint, return (config, captured requests).
async fn start_server(status: StatusCode, body: String) -> (AzureConfig, Arc<Mutex<Vec<Captured>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        status,
        body,
        seen: Arc::clone(&seen),
    };
    let app = Router::new()
        .route("/openai/deployments/{deployment}/chat/completions", post(completions))
        .with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let config = AzureConfig {
        endpoint: format!("http://127.0.0.1:{port}/"),
        api_key: SecretString::from("test-key".to_string()),
        deployment: "gpt-banka".to_string(),
        api_version: "2024-06-01-preview".to_string(),
        request_timeout: Duration::from_secs(2),
    };
    (config, seen)
}

fn resolver_for(azure: AzureConfig) -> IntentResolver {
    let config = AssistantConfig {
        azure: Some(azure),
        ..AssistantConfig::default()
    };
    let resolver = IntentResolver::from_config(&config).unwrap();
    assert!(resolver.is_remote());
    resolver
}

#[tokio::test]
async fn navigate_reply_is_parsed_and_request_is_well_formed() {
    let content = r#"{"action":"navigate","payload":{"menu":"Kartlarım"},"message":"Kartlara geçiliyor."}"#;
    let (azure, seen) = start_server(StatusCode::OK, envelope(content)).await;
    let resolver = resolver_for(azure);

    let resolution = timeout(TEST_TIMEOUT, resolver.resolve("kartlarımı aç"))
        .await
        .expect("resolution timed out");

    assert_eq!(resolution.raw, content);
    assert!(resolution.failure.is_none());
    match resolution.parsed {
        Some(Action::Navigate { menu, message }) => {
            assert_eq!(menu, Some(Section::Cards));
            assert_eq!(message.as_deref(), Some("Kartlara geçiliyor."));
        }
        other => panic!("expected navigate, got {other:?}"),
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let request = &seen[0];
    assert_eq!(request.deployment, "gpt-banka");
    assert_eq!(request.api_version.as_deref(), Some("2024-06-01-preview"));
    assert_eq!(request.api_key.as_deref(), Some("test-key"));

    let messages = request.body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert!(messages[0]["content"].as_str().unwrap().contains("ONLY returns a single valid JSON"));
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[1]["content"], "kartlarımı aç");
    assert_eq!(request.body["max_tokens"], 400);
}

#[tokio::test]
async fn json_wrapped_in_prose_is_recovered() {
    let content = "Tabii! İşte cevap: {\"action\":\"hide_balance\",\"payload\":null,\"message\":null} Başka bir şey?";
    let (azure, _) = start_server(StatusCode::OK, envelope(content)).await;
    let resolver = resolver_for(azure);

    let resolution = resolver.resolve("bakiyemi gizle").await;
    assert!(matches!(resolution.parsed, Some(Action::HideBalance { .. })));
    assert_eq!(resolution.raw, content);
}

#[tokio::test]
async fn error_status_surfaces_body() {
    let (azure, _) = start_server(
        StatusCode::UNAUTHORIZED,
        r#"{"error":{"code":"401","message":"Access denied"}}"#.to_string(),
    )
    .await;
    let resolver = resolver_for(azure);

    let resolution = resolver.resolve("bakiye").await;
    assert_eq!(resolution.failure, Some(FailureKind::Status));
    assert!(resolution.parsed.is_none());
    assert!(resolution.raw.starts_with("Azure hata: "));
    assert!(resolution.raw.contains("Access denied"));
}

#[tokio::test]
async fn prose_without_json_is_a_parse_failure() {
    let content = "Üzgünüm, bunu anlayamadım.";
    let (azure, _) = start_server(StatusCode::OK, envelope(content)).await;
    let resolver = resolver_for(azure);

    let resolution = resolver.resolve("merhaba").await;
    assert_eq!(resolution.failure, Some(FailureKind::Parse));
    assert_eq!(resolution.raw, content);
}

#[tokio::test]
async fn schema_violation_is_invalid() {
    let content = r#"{"action":"navigate","payload":{"menu":"Kasa"}}"#;
    let (azure, _) = start_server(StatusCode::OK, envelope(content)).await;
    let resolver = resolver_for(azure);

    let resolution = resolver.resolve("kasaya git").await;
    assert_eq!(resolution.failure, Some(FailureKind::Invalid));
    assert!(resolution.parsed.is_none());
}

#[tokio::test]
async fn unreachable_endpoint_is_spoken_as_connection_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let resolver = resolver_for(AzureConfig {
        endpoint: format!("http://127.0.0.1:{port}"),
        api_key: SecretString::from("k".to_string()),
        deployment: "d".to_string(),
        api_version: "v".to_string(),
        request_timeout: Duration::from_secs(1),
    });

    let resolution = timeout(TEST_TIMEOUT, resolver.resolve("bakiye"))
        .await
        .expect("resolution timed out");
    assert_eq!(resolution.failure, Some(FailureKind::Transport));
    assert!(resolution.raw.starts_with("Sunucu hatası: "));

    let output = Arc::new(RecordingOutput::new());
    let speaker = Speaker::new(output.clone(), SpeechConfig::default());
    let mut dispatcher = ActionDispatcher::new(speaker, DispatchConfig::default());
    dispatcher.handle_resolution(&resolution);

    assert_eq!(dispatcher.view().response_message, resolution.raw);
    assert_eq!(output.spoken(), vec!["Sunucuya bağlanırken hata oluştu."]);
}

#[tokio::test]
async fn composite_reply_drives_the_dashboard() {
    let content = json!({
        "action": "composite",
        "payload": { "actions": [
            { "action": "navigate", "payload": { "menu": "Hesaplarım" } },
            { "action": "show_balance", "payload": null }
        ]},
        "message": null
    })
    .to_string();
    let (azure, _) = start_server(StatusCode::OK, envelope(&content)).await;
    let resolver = resolver_for(azure);

    let output = Arc::new(RecordingOutput::new());
    let speaker = Speaker::new(output.clone(), SpeechConfig::default());
    let mut dispatcher = ActionDispatcher::new(speaker, DispatchConfig::default());

    let resolution = resolver.resolve("hesaplarıma git ve bakiyemi göster").await;
    dispatcher.handle_resolution(&resolution);

    let view = dispatcher.view();
    assert_eq!(view.active_section, Section::Accounts);
    assert!(view.balance_visible);
    assert!(view.balance_highlight);
    assert_eq!(view.last_raw.as_deref(), Some(content.as_str()));
}

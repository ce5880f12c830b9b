mod common;

use std::sync::Arc;

use common::{MockResponse, MockServer};
use model_compare::ClientConfig;
use model_compare::records::MemoryRecordStore;
use model_compare::service::{AppState, create_app};
use model_compare::session::FormField;
use serde_json::{Value, json};

fn openai_reply(model: &str, text: &str) -> MockResponse {
    MockResponse::json(
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": model,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": text },
                "finish_reason": "stop"
            }]
        })
        .to_string(),
    )
}

fn gemini_reply(text: &str) -> MockResponse {
    MockResponse::json(
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
        .to_string(),
    )
}

fn deepl_reply(text: &str) -> MockResponse {
    MockResponse::json(
        json!({ "translations": [{ "detected_source_language": "EN", "text": text }] }).to_string(),
    )
}

fn client_config(
    openai: &MockServer,
    gemini: Option<&MockServer>,
    deepl: Option<&MockServer>,
    record_service: Option<&str>,
    models: Option<&str>,
) -> ClientConfig {
    let mut vars = vec![
        ("OPENAI_API_KEY".to_string(), "sk-test".to_string()),
        ("GOOGLE_API_KEY".to_string(), "g-test".to_string()),
        ("DEEPL_API_KEY".to_string(), "d-test".to_string()),
        ("OPENAI_BASE_URL".to_string(), openai.url()),
        ("MODEL_COMPARE_TIMEOUT_MS".to_string(), "5000".to_string()),
    ];
    if let Some(server) = gemini {
        vars.push(("GEMINI_BASE_URL".to_string(), server.url()));
    }
    if let Some(server) = deepl {
        vars.push(("DEEPL_BASE_URL".to_string(), server.url()));
    }
    if let Some(url) = record_service {
        vars.push(("RECORD_SERVICE_URL".to_string(), url.to_string()));
    }
    if let Some(models) = models {
        vars.push(("MODEL_COMPARE_MODELS".to_string(), models.to_string()));
    }

    ClientConfig::from_lookup(move |name| {
        vars.iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    })
    .expect("client config")
}

#[tokio::test]
async fn test_hello_in_french_fills_every_card() {
    let mut openai = MockServer::start(vec![
        openai_reply("gpt-3.5-turbo", "Bonjour (3.5)"),
        openai_reply("gpt-4", "Bonjour (4)"),
        openai_reply("gpt-4-turbo", "Bonjour (4 turbo)"),
    ]);
    let mut gemini = MockServer::start(vec![
        gemini_reply("Bonjour (pro 001)"),
        gemini_reply("Bonjour (flash 001)"),
        gemini_reply("Bonjour (pro 002)"),
        gemini_reply("Bonjour (flash 002)"),
    ]);
    let mut deepl = MockServer::start(vec![deepl_reply("Bonjour")]);

    let config = client_config(&openai, Some(&gemini), Some(&deepl), None, None);
    let mut session = config.build_session().expect("session");
    session.update_form(FormField::Message, "Hello");
    session.update_form(FormField::Language, "French");

    let report = session.generate().await.expect("generate");
    openai.shutdown();
    gemini.shutdown();
    deepl.shutdown();

    assert_eq!(report.completed, 8);
    assert_eq!(report.failed, 0);
    assert_eq!(session.error(), None);
    assert_eq!(session.translations()["deepl"], "Bonjour");
    assert_eq!(session.translations()["gpt-4"], "Bonjour (4)");
    assert_eq!(session.translations()["gemini-1.5-flash-002"], "Bonjour (flash 002)");

    let openai_requests = openai.captured_requests();
    assert_eq!(openai_requests.len(), 3);
    let gpt4_body: Value = serde_json::from_str(&openai_requests[1].body).expect("openai body");
    assert_eq!(gpt4_body["model"], "gpt-4");
    assert_eq!(gpt4_body["messages"][0]["role"], "system");
    assert!(
        gpt4_body["messages"][0]["content"]
            .as_str()
            .expect("system prompt")
            .contains("French")
    );
    assert_eq!(gpt4_body["messages"][1]["content"], "Hello");

    let gemini_requests = gemini.captured_requests();
    assert_eq!(
        gemini_requests[0].path,
        "/v1beta/models/gemini-1.5-pro-001:generateContent"
    );
    assert_eq!(gemini_requests[0].headers.get("x-goog-api-key").map(String::as_str), Some("g-test"));

    let deepl_requests = deepl.captured_requests();
    assert_eq!(deepl_requests.len(), 1);
    assert_eq!(deepl_requests[0].path, "/v2/translate");
    assert!(deepl_requests[0].body.contains("target_lang=FR"));
}

#[tokio::test]
async fn test_one_provider_failure_leaves_other_cards() {
    let mut openai = MockServer::start(vec![
        MockResponse::json(r#"{"error":{"message":"overloaded","type":"server_error"}}"#)
            .with_status(503),
    ]);
    let mut deepl = MockServer::start(vec![deepl_reply("Hallo")]);

    let config = client_config(&openai, None, Some(&deepl), None, Some("openai:gpt-4,deepl:deepl"));
    let mut session = config.build_session().expect("session");
    session.update_form(FormField::Message, "Hello");
    session.update_form(FormField::Language, "German");

    let report = session.generate().await.expect("generate");
    openai.shutdown();
    deepl.shutdown();

    assert_eq!(report.completed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(session.translations().get("deepl").map(String::as_str), Some("Hallo"));
    assert!(!session.translations().contains_key("gpt-4"));
    assert_eq!(session.error(), Some("Translation failed. Please try again."));
}

#[tokio::test]
async fn test_question_never_reaches_deepl() {
    let mut openai = MockServer::start(vec![openai_reply("gpt-4", "Parce que...")]);

    let config = client_config(&openai, None, None, None, Some("openai:gpt-4,deepl:deepl"));
    let mut session = config.build_session().expect("session");
    session.update_form(FormField::Message, "Why is the sky blue?");
    session.update_form(FormField::Classification, "question");

    let report = session.generate().await.expect("generate");
    openai.shutdown();

    assert_eq!(report.completed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(session.translations().len(), 1);

    let body: Value =
        serde_json::from_str(&openai.captured_requests()[0].body).expect("openai body");
    assert_eq!(body["messages"][0]["content"], "Explain in short in French");
}

#[tokio::test]
async fn test_submit_then_export_round_trips_through_service() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind service");
    let service_url = format!("http://{}", listener.local_addr().expect("service addr"));
    let store = Arc::new(MemoryRecordStore::new());
    let app = create_app(AppState::new(store.clone()));
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let mut openai = MockServer::start(vec![openai_reply("gpt-4", "Hola")]);
    let mut deepl = MockServer::start(vec![deepl_reply("Hola")]);

    let config = client_config(
        &openai,
        None,
        Some(&deepl),
        Some(&service_url),
        Some("openai:gpt-4,deepl:deepl"),
    );
    let mut session = config.build_session().expect("session");
    session.update_form(FormField::Message, "Hello");
    session.update_form(FormField::Language, "Spanish");
    session.generate().await.expect("generate");
    openai.shutdown();
    deepl.shutdown();

    session.set_ranking("gpt-4", 1);
    session.set_rating("gpt-4", 4.5);

    let report = session.submit().await;
    assert_eq!(report.saved, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(store.len().await, 2);

    let dir = std::env::temp_dir().join(format!("model-compare-scenario-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.expect("create dir");
    let path = session.export_to_csv(&dir).await.expect("export");
    let csv = tokio::fs::read_to_string(&path).await.expect("read export");
    tokio::fs::remove_dir_all(&dir).await.expect("cleanup");
    server.abort();

    let lines = csv.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("id,original_message,translated_message,language,model,ranking,rating"));
    assert!(csv.contains("Hello,Hola,Spanish,gpt-4,1,4.5,translation"));
    assert!(csv.contains("Hello,Hola,Spanish,deepl,0,0"));
}

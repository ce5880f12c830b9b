use serde_json::{Value, json};

use super::*;
use crate::test_support::{MockResponse, MockServer};

fn single_request(model_id: &str) -> ProviderRequest {
    ProviderRequest {
        model_id: model_id.to_string(),
        prompt: Prompt::Single {
            text: "Translate the text: Hello into French without description".to_string(),
        },
        temperature: None,
        max_output_tokens: None,
    }
}

#[test]
fn test_encode_single_prompt_without_generation_config() {
    let body = GeminiTranslator
        .encode_request(&single_request("gemini-1.5-pro-001"))
        .expect("encode should succeed");

    assert_eq!(
        body["contents"][0]["parts"][0]["text"],
        json!("Translate the text: Hello into French without description")
    );
    assert!(body.get("generationConfig").is_none());
}

#[test]
fn test_encode_sampling_controls_into_generation_config() {
    let mut req = single_request("gemini-1.5-flash-002");
    req.temperature = Some(0.5);
    req.max_output_tokens = Some(64);

    let body = GeminiTranslator
        .encode_request(&req)
        .expect("encode should succeed");
    assert_eq!(body["generationConfig"]["maxOutputTokens"], json!(64));
    assert!(body["generationConfig"]["temperature"].is_number());
}

#[test]
fn test_encode_rejects_chat_and_translate_prompts() {
    let mut req = single_request("gemini-1.5-pro-001");
    req.prompt = Prompt::Chat {
        system: "Translate this sentence into French".to_string(),
        user: "Hello".to_string(),
    };
    let err = GeminiTranslator
        .encode_request(&req)
        .expect_err("chat prompt should be rejected");
    assert!(err.to_string().contains("generateContent requires a single prompt"));

    req.prompt = Prompt::Translate {
        text: "Hello".to_string(),
        target_language: "French".to_string(),
    };
    assert!(GeminiTranslator.encode_request(&req).is_err());
}

#[test]
fn test_decode_joins_text_parts() {
    let response = GeminiTranslator
        .decode_response(&DecodeEnvelope {
            model: "gemini-1.5-pro-002".to_string(),
            body: json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Bon" }, { "text": "jour\n" }] },
                    "finishReason": "STOP"
                }]
            }),
        })
        .expect("decode should succeed");

    assert_eq!(response.text, "Bonjour\n");
    assert_eq!(response.model, "gemini-1.5-pro-002");
}

#[test]
fn test_decode_reports_blocked_prompt() {
    let err = GeminiTranslator
        .decode_response(&DecodeEnvelope {
            model: "gemini-1.5-pro-001".to_string(),
            body: json!({ "promptFeedback": { "blockReason": "SAFETY" } }),
        })
        .expect_err("blocked prompt should fail");
    assert!(err.to_string().contains("gemini prompt blocked: SAFETY"));

    let err = GeminiTranslator
        .decode_response(&DecodeEnvelope {
            model: "gemini-1.5-pro-001".to_string(),
            body: json!({ "candidates": [{ "content": { "parts": [] }, "finishReason": "MAX_TOKENS" }] }),
        })
        .expect_err("empty candidate should fail");
    assert!(err.to_string().contains("finishReason=MAX_TOKENS"));
}

#[tokio::test]
async fn test_gemini_provider_posts_generate_content_with_api_key_header() {
    let mut server = MockServer::start(vec![MockResponse::json(
        r#"{"candidates":[{"content":{"parts":[{"text":"Bonjour"}]}}]}"#,
    )]);

    let provider = GeminiProvider::with_transport(
        Some("google-key".to_string()),
        server.url(),
        HttpTransport::new(1_000).expect("create transport"),
    );

    let response = provider
        .translate(&single_request("gemini-1.5-flash-001"), &AdapterContext::default())
        .await
        .expect("translate should succeed");
    assert_eq!(response.text, "Bonjour");
    assert_eq!(response.provider, ProviderId::Gemini);

    server.shutdown();
    let captured = server.captured_requests();
    assert_eq!(
        captured[0].path,
        "/v1beta/models/gemini-1.5-flash-001:generateContent"
    );
    assert_eq!(
        captured[0].headers.get("x-goog-api-key"),
        Some(&"google-key".to_string())
    );
    assert!(captured[0].headers.get("authorization").is_none());

    let body: Value = serde_json::from_str(&captured[0].body).expect("request body is json");
    assert_eq!(body["contents"][0]["role"], json!("user"));
}

#[tokio::test]
async fn test_gemini_provider_maps_forbidden_to_credentials_rejected() {
    let mut server = MockServer::start(vec![MockResponse::new(
        403,
        vec![],
        r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#,
    )]);

    let provider = GeminiProvider::with_transport(
        Some("google-key".to_string()),
        server.url(),
        HttpTransport::new(1_000).expect("create transport"),
    );

    let err = provider
        .translate(&single_request("gemini-1.5-pro-001"), &AdapterContext::default())
        .await
        .expect_err("forbidden should fail");
    assert!(matches!(
        err,
        ProviderError::CredentialsRejected {
            provider: ProviderId::Gemini,
            ..
        }
    ));

    server.shutdown();
}

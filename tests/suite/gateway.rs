//! Gemini gateway against a mock endpoint

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use groflow_core::{PromptContext, PromptKind, build_prompt};
use groflow_providers::{GatewayConfig, GeminiClient, GenerationError};

use crate::common::{TEST_KEY, candidate_body, gateway, generate_path, test_key};

fn plan_context() -> PromptContext {
    PromptContext::new()
        .with("business_type", "mobile bike repair")
        .with("budget", "$200.00")
        .with("hours_per_week", "10")
        .with("goal", "ten regular customers")
}

#[tokio::test]
async fn built_prompt_is_sent_verbatim() {
    let server = MockServer::start().await;
    let prompt = build_prompt(PromptKind::QuickActions, &plan_context()).unwrap();

    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(query_param("key", TEST_KEY))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": prompt}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("Fix a flat")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(gateway(&server)).unwrap();
    let text = client.generate(&prompt, &test_key()).await.unwrap();
    assert_eq!(text, "Fix a flat");
}

#[tokio::test]
async fn rejected_key_maps_to_invalid_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(gateway(&server)).unwrap();
    let err = client.generate("hello", &test_key()).await.unwrap_err();
    assert!(matches!(err, GenerationError::InvalidCredential));
    assert!(!err.to_string().contains(TEST_KEY));
}

#[tokio::test]
async fn server_errors_carry_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(gateway(&server)).unwrap();
    match client.generate("hello", &test_key()).await {
        Err(GenerationError::Upstream { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "backend unavailable");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn model_listing_keeps_generate_content_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .and(query_param("key", TEST_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {
                    "name": "models/gemini-2.5-flash",
                    "displayName": "Gemini 2.5 Flash",
                    "supportedGenerationMethods": ["generateContent", "countTokens"]
                },
                {
                    "name": "models/text-embedding-004",
                    "supportedGenerationMethods": ["embedContent"]
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(gateway(&server)).unwrap();
    let models = client.list_models(&test_key()).await.unwrap();
    let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["models/gemini-2.5-flash"]);
}

#[test]
fn plain_http_endpoints_are_allowed_for_local_servers() {
    let client = GeminiClient::new(GatewayConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        model: "models/gemini-2.5-flash".to_string(),
    })
    .unwrap();
    assert_eq!(client.model(), "gemini-2.5-flash");
}

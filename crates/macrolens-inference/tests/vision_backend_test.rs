//! Vision backends and the macro estimator against mock HTTP endpoints.

use std::sync::Arc;

use macrolens_core::MacroEstimator;
use macrolens_inference::LlmMacroEstimator;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_REPLY: &str = "Sure, here is the estimate:\n```json\n{\"components\": [\
{\"name\": \"fried rice\", \"calories\": 330, \"protein\": 8, \"carbs\": 50, \"fat\": 10},\
{\"name\": \"egg\", \"calories\": 90, \"protein\": 6, \"carbs\": 1, \"fat\": 7}],\
\"total\": {\"calories\": 100, \"protein\": 0, \"carbs\": 0, \"fat\": 0}}\n```";

#[cfg(feature = "openai")]
#[tokio::test]
async fn test_openai_estimator_end_to_end() {
    use macrolens_inference::{OpenAIConfig, OpenAIVisionBackend};

    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": MODEL_REPLY},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAIVisionBackend::new(OpenAIConfig {
        base_url: server.uri(),
        api_key: Some("sk-test".to_string()),
        ..Default::default()
    })
    .unwrap();
    let estimator = LlmMacroEstimator::new(Arc::new(backend));

    let estimate = estimator
        .estimate(b"image", "fried rice")
        .await
        .unwrap()
        .expect("reply parses");
    assert_eq!(estimate.components().len(), 2);
    // The model's reported total of 100 is ignored.
    assert_eq!(estimate.total().calories, 420.0);
    assert_eq!(estimate.total().protein, 14.0);
}

#[cfg(feature = "openai")]
#[tokio::test]
async fn test_openai_auth_failure_is_config_error() {
    use macrolens_inference::{OpenAIConfig, OpenAIVisionBackend};

    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Incorrect API key", "type": "invalid_request_error", "code": "invalid_api_key"}
        })))
        .mount(&server)
        .await;

    let backend = OpenAIVisionBackend::new(OpenAIConfig {
        base_url: server.uri(),
        api_key: Some("sk-bad".to_string()),
        ..Default::default()
    })
    .unwrap();
    let estimator = LlmMacroEstimator::new(Arc::new(backend));

    let err = estimator.estimate(b"image", "pizza").await.unwrap_err();
    assert!(err.is_config());
}

#[cfg(feature = "ollama")]
#[tokio::test]
async fn test_ollama_estimator_unusable_reply_is_none() {
    use macrolens_inference::OllamaVisionBackend;

    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(serde_json::json!({"model": "llava", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "I am not sure what this dish is."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OllamaVisionBackend::new(server.uri(), "llava".to_string());
    let estimator = LlmMacroEstimator::new(Arc::new(backend));

    assert!(estimator
        .estimate(b"image", "mystery")
        .await
        .unwrap()
        .is_none());
}

#[cfg(feature = "ollama")]
#[tokio::test]
async fn test_ollama_estimator_parses_reply() {
    use macrolens_inference::OllamaVisionBackend;

    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "response": MODEL_REPLY })),
        )
        .mount(&server)
        .await;

    let backend = OllamaVisionBackend::new(server.uri(), "llava".to_string());
    let estimator = LlmMacroEstimator::new(Arc::new(backend));
    let estimate = estimator
        .estimate(b"image", "fried rice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(estimate.total().fat, 17.0);
}

//! HTTP contract tests for the OpenAI provider against a mock server

use mockito::Matcher;
use parksense_providers::{
    ChatRequest, Credential, FinishReason, ImageDetail, Message, OpenAiProvider, Provider,
    ProviderError,
};
use serde_json::json;

fn vision_request(model: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            Message::system("Return JSON only."),
            Message::user_with_image(
                "Read this parking sign.",
                "data:image/jpeg;base64,/9j/AAAA",
                ImageDetail::High,
            ),
        ],
        temperature: Some(0.1),
        max_tokens: Some(500),
    }
}

fn provider_for(server: &mockito::ServerGuard) -> OpenAiProvider {
    OpenAiProvider::with_base_url(Credential::new("sk-test"), server.url()).unwrap()
}

#[tokio::test]
async fn test_chat_sends_bearer_and_multimodal_body() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o",
            "max_tokens": 500,
            "messages": [
                {"role": "system", "content": "Return JSON only."},
                {"role": "user", "content": [
                    {"type": "text", "text": "Read this parking sign."},
                    {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,/9j/AAAA", "detail": "high"}}
                ]}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "chatcmpl-1",
                "model": "gpt-4o",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "{\"canPark\": true}"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 900, "completion_tokens": 40, "total_tokens": 940}
            }"#,
        )
        .create_async()
        .await;

    let provider = provider_for(&server);
    let response = provider.chat(vision_request("gpt-4o")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.content, "{\"canPark\": true}");
    assert_eq!(response.finish_reason, FinishReason::Stop);
    assert_eq!(response.usage.unwrap().total_tokens, 940);
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "Incorrect API key provided"}}"#)
        .create_async()
        .await;

    let result = provider_for(&server).chat(vision_request("gpt-4o")).await;
    assert_eq!(result.unwrap_err(), ProviderError::AuthError);
}

#[tokio::test]
async fn test_rate_limit_honours_retry_after() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_header("retry-after", "12")
        .create_async()
        .await;

    let result = provider_for(&server).chat(vision_request("gpt-4o")).await;
    assert_eq!(result.unwrap_err(), ProviderError::RateLimited(12));
}

#[tokio::test]
async fn test_server_error_is_provider_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .create_async()
        .await;

    let result = provider_for(&server).chat(vision_request("gpt-4o")).await;
    match result {
        Err(ProviderError::ProviderError(message)) => assert!(message.contains("503")),
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_envelope_is_parse_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let result = provider_for(&server).chat(vision_request("gpt-4o")).await;
    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[tokio::test]
async fn test_missing_content_is_parse_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": [{"message": {"role": "assistant"}, "finish_reason": "stop"}]}"#)
        .create_async()
        .await;

    let result = provider_for(&server).chat(vision_request("gpt-4o")).await;
    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[tokio::test]
async fn test_images_rejected_for_text_only_model() {
    let server = mockito::Server::new_async().await;
    let result = provider_for(&server)
        .chat(vision_request("gpt-3.5-turbo"))
        .await;
    assert!(matches!(result, Err(ProviderError::InvalidModel(_))));
}

#[tokio::test]
async fn test_unknown_model_rejected_without_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let result = provider_for(&server).chat(vision_request("not-a-model")).await;

    assert!(matches!(result, Err(ProviderError::InvalidModel(_))));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_health_check() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/models")
        .with_status(200)
        .with_body(r#"{"data": []}"#)
        .create_async()
        .await;

    assert!(provider_for(&server).health_check().await.unwrap());
}

/*!
 * Tests for the OpenAI-compatible client against a local fake server
 */

use std::sync::Arc;
use std::time::Duration;

use tlgate::errors::ProviderError;
use tlgate::providers::openai::OpenAI;
use tlgate::providers::Provider;
use tlgate::translation::GenerationParameters;
use tlgate::TranslationService;

use crate::common::{chat_response, engine_config, FakeServer};

fn client(url: &str) -> OpenAI {
    OpenAI::new(url, "GalTransl-v4-4B-2601", None, Duration::from_secs(5))
}

#[tokio::test]
async fn test_generate_withChatResponse_shouldReturnContent() {
    let server = FakeServer::start(vec![(200, chat_response("早上好"))]).await;

    let text = client(&server.url)
        .generate("system", "おはよう", &GenerationParameters::default())
        .await
        .unwrap();

    assert_eq!(text, "早上好");
    assert_eq!(server.paths(), vec!["/v1/chat/completions"]);

    let body: serde_json::Value = serde_json::from_str(&server.bodies()[0]).unwrap();
    assert_eq!(body["model"], "GalTransl-v4-4B-2601");
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "おはよう");
    assert_eq!(body["max_tokens"], 2048);
}

#[tokio::test]
async fn test_generate_withBareMessageWithoutRole_shouldReturnContent() {
    let server = FakeServer::start(vec![(200, r#"{"message":{"content":"早上好"}}"#.to_string())]).await;

    let text = client(&server.url)
        .generate("system", "おはよう", &GenerationParameters::default())
        .await
        .unwrap();

    assert_eq!(text, "早上好");
}

#[tokio::test]
async fn test_generate_withServerError_shouldReturnApiError() {
    let server = FakeServer::start(vec![(503, r#"{"error":"loading model"}"#.to_string())]).await;

    let error = client(&server.url)
        .generate("system", "おはよう", &GenerationParameters::default())
        .await
        .unwrap_err();

    match error {
        ProviderError::ApiError { status_code, message } => {
            assert_eq!(status_code, 503);
            assert!(message.contains("loading model"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_withMalformedBody_shouldReturnParseError() {
    let server = FakeServer::start(vec![(200, "<html>proxy error</html>".to_string())]).await;

    let error = client(&server.url)
        .generate("system", "おはよう", &GenerationParameters::default())
        .await
        .unwrap_err();

    assert!(matches!(error, ProviderError::ParseError(_)));
}

#[tokio::test]
async fn test_generate_withClosedPort_shouldReturnConnectionError() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let error = client(&url)
        .generate("system", "おはよう", &GenerationParameters::default())
        .await
        .unwrap_err();

    assert!(matches!(error, ProviderError::ConnectionError(_)));
}

#[tokio::test]
async fn test_testConnection_shouldQueryModels() {
    let server = FakeServer::start(vec![(200, r#"{"data":[]}"#.to_string())]).await;

    client(&format!("{}/v1", server.url))
        .test_connection()
        .await
        .unwrap();

    assert_eq!(server.paths(), vec!["/v1/models"]);
}

#[tokio::test]
async fn test_service_withFakeServer_shouldRetryUntilValid() {
    let server = FakeServer::start(vec![
        (200, chat_response("<think>考虑一下</think>おはよう")),
        (200, chat_response("早上好")),
    ])
    .await;
    let service = TranslationService::new(Arc::new(client(&server.url)), engine_config());

    let (text, ok) = service.translate("「おはよう」").await;

    assert!(ok);
    assert_eq!(text, "「早上好」");
    assert_eq!(server.bodies().len(), 2);
}

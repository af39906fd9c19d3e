/*!
 * End-to-end runs of the translation engine against scripted providers
 */

use std::sync::Arc;

use tlgate::app_config::EngineConfig;
use tlgate::providers::mock::{MockProvider, MockReply};
use tlgate::{FinalResult, TranslationService};

use crate::common::{engine_config, init_logging, service_with};

#[tokio::test]
async fn test_translate_withKanjiLabel_shouldReturnSourceWithoutCallingProvider() {
    let provider = MockProvider::working();
    let service = service_with(&provider);

    let (text, ok) = service.translate("新規").await;

    assert!(ok);
    assert_eq!(text, "新規");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translate_withEchoingModel_shouldStopAtMaxRetries() {
    init_logging();
    let provider = MockProvider::echo();
    let service = service_with(&provider);

    let result = service.translate_with_deadline("「先輩、待ってください！」").await;

    assert_eq!(
        result,
        FinalResult::Degraded("「先輩、待ってください！」".to_string())
    );
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_translate_withCustomRetryBudget_shouldHonourIt() {
    let provider = MockProvider::failing();
    let config = EngineConfig {
        max_retries: 5,
        ..engine_config()
    };
    let service = TranslationService::new(Arc::new(provider.clone()), config);

    let (text, ok) = service.translate("今日はいい天気ですね").await;

    assert!(!ok);
    assert!(text.starts_with("[翻译失败] "));
    assert_eq!(provider.request_count(), 5);
}

#[tokio::test]
async fn test_translate_withRefusalThenEmptyOutputs_shouldDegradeToRefusal() {
    let provider = MockProvider::scripted(vec![
        MockReply::text("抱歉，我无法翻译这段内容"),
        MockReply::text(""),
    ]);
    let service = service_with(&provider);

    let result = service.translate_with_deadline("これを訳してください、お願いします").await;

    assert_eq!(
        result,
        FinalResult::Degraded("抱歉，我无法翻译这段内容".to_string())
    );
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_translate_withOnlyEmptyOutputs_shouldFail() {
    let provider = MockProvider::empty();
    let service = service_with(&provider);

    let (text, ok) = service.translate("これを訳してください、お願いします").await;

    assert!(!ok);
    assert_eq!(text, "[翻译失败] これを訳してください、お願いします");
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_translate_withRefusalThenGoodOutput_shouldRaiseTemperature() {
    let provider = MockProvider::scripted(vec![
        MockReply::text("抱歉，我无法翻译这段内容"),
        MockReply::text("请翻译这个，拜托了"),
    ]);
    let service = service_with(&provider);

    let (text, ok) = service.translate("これを訳してください、お願いします").await;

    assert!(ok);
    assert_eq!(text, "请翻译这个，拜托了");
    let requests = provider.requests();
    assert!((requests[0].params.temperature - 0.3).abs() < 1e-6);
    assert!((requests[1].params.temperature - 0.4).abs() < 1e-6);
}

#[tokio::test]
async fn test_translate_withLeakedTemplate_shouldTruncateAndReconcile() {
    let provider = MockProvider::scripted(vec![MockReply::text(
        "她笑了\n历史翻译：他走了。",
    )]);
    let service = service_with(&provider);

    let (text, ok) = service.translate("彼女は笑った。").await;

    assert!(ok);
    assert_eq!(text, "她笑了。");
}

#[tokio::test]
async fn test_translate_shouldSendConfiguredSystemPrompt() {
    let provider = MockProvider::working();
    let config = EngineConfig {
        system_prompt: "将日文翻译成中文".to_string(),
        ..engine_config()
    };
    let service = TranslationService::new(Arc::new(provider.clone()), config);

    service.translate("今日はいい天気ですね").await;

    assert_eq!(provider.requests()[0].system_prompt, "将日文翻译成中文");
}

#[tokio::test]
async fn test_translate_concurrentRequests_shouldNotInterfere() {
    let provider = MockProvider::working()
        .with_custom_response(|req| format!("译文{}", req.text.chars().count()));
    let service = service_with(&provider);

    let texts = ["ありがとう", "おはようございます", "ごめんなさい"];
    let handles: Vec<_> = texts
        .iter()
        .map(|text| {
            let service = service.clone();
            let text = text.to_string();
            tokio::spawn(async move { service.translate(&text).await })
        })
        .collect();

    let mut outputs = Vec::new();
    for handle in handles {
        outputs.push(handle.await.unwrap());
    }

    assert_eq!(
        outputs,
        vec![
            ("译文5".to_string(), true),
            ("译文9".to_string(), true),
            ("译文6".to_string(), true),
        ]
    );
}

//! エラーケーステスト
//!
//! 各種エラー条件でのエラー分類を検証

use meal_log::analyzer::{AnalysisBackend, WebhookBackend};
use meal_log::capture::load_image_file;
use meal_log::config::Config;
use meal_log::error::MealLogError;
use meal_log::sheet::{LogSink, SheetWebhook, UnconfiguredSink};
use meal_log_common::{AnalysisRequest, MealType, NutritionRecord, SheetRow};
use chrono::{FixedOffset, TimeZone};
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notes_request() -> AnalysisRequest {
    AnalysisRequest {
        image: None,
        meal_type: MealType::Dinner,
        notes: "curry rice".to_string(),
    }
}

fn row() -> SheetRow {
    let at = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 17, 19, 5, 0)
        .unwrap();
    SheetRow::build(&NutritionRecord::default(), MealType::Dinner, &at)
}

/// 拡張子だけ画像のファイル
#[test]
fn test_load_text_file_as_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    let file = dir.path().join("meal.jpg");
    std::fs::write(&file, "hello").unwrap();

    let result = load_image_file(&file, 0);
    assert!(matches!(result, Err(MealLogError::ImageLoad(_))));
}

/// 壊れた設定ファイル
#[test]
fn test_invalid_config_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let file = dir.path().join("config.json");
    std::fs::write(&file, "{ invalid json }").unwrap();

    let result = Config::load_from(&file);
    assert!(matches!(result, Err(MealLogError::JsonParse(_))));
}

/// 未設定のエンドポイントは設定方法を案内する
#[test]
fn test_missing_endpoint_message() {
    let err = MealLogError::MissingEndpoint("記録Webhook", "log");
    assert!(err.to_string().contains("--set-log-url"));
}

/// 解析サービスのエラーステータス
#[tokio::test]
async fn test_analysis_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let backend =
        WebhookBackend::new(format!("{}/analyze", server.uri()), Duration::from_secs(5)).unwrap();
    let err = backend.analyze(&notes_request()).await.unwrap_err();

    match err {
        MealLogError::AnalysisStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "unavailable");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// 応答が遅い場合はタイムアウト（通信エラー扱い）
#[tokio::test]
async fn test_analysis_timeout_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let backend = WebhookBackend::new(server.uri(), Duration::from_millis(200)).unwrap();
    let err = backend.analyze(&notes_request()).await.unwrap_err();
    assert!(matches!(err, MealLogError::Transport(_)));
}

/// 解析結果として読めない応答
#[tokio::test]
async fn test_analysis_unparseable_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let backend = WebhookBackend::new(server.uri(), Duration::from_secs(5)).unwrap();
    let err = backend.analyze(&notes_request()).await.unwrap_err();
    assert!(matches!(err, MealLogError::ApiParse(_)));
}

/// 記録サービスのエラーステータス
#[tokio::test]
async fn test_log_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("script error"))
        .mount(&server)
        .await;

    let sink = SheetWebhook::new(server.uri(), Duration::from_secs(5)).unwrap();
    let err = sink.submit(&row()).await.unwrap_err();
    assert!(matches!(err, MealLogError::LogStatus { status: 500, .. }));
    assert!(err.to_string().contains("500"));
}

/// 記録先未設定
#[tokio::test]
async fn test_unconfigured_sink_fails() {
    let err = UnconfiguredSink.submit(&row()).await.unwrap_err();
    assert!(matches!(err, MealLogError::MissingEndpoint(_, "log")));
}

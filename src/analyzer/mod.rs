//! 解析クライアント
//!
//! 画像/メモ → NutritionRecord の変換は外部サービスに任せる。
//! バックエンドは `AnalysisBackend` の実装を差し替えて使う（現行はWebhookプロキシのみ）。

mod webhook;

pub use webhook::WebhookBackend;

use crate::error::Result;
use async_trait::async_trait;
use meal_log_common::{AnalysisRequest, NutritionRecord};

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// 1件解析する。失敗時の自動リトライはしない
    async fn analyze(&self, request: &AnalysisRequest) -> Result<NutritionRecord>;
}

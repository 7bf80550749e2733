//! スプレッドシート記録クライアント

use crate::error::{MealLogError, Result};
use async_trait::async_trait;
use meal_log_common::SheetRow;
use std::time::Duration;

#[async_trait]
pub trait LogSink: Send + Sync {
    /// 1行送信する。失敗時の自動リトライはしない
    async fn submit(&self, row: &SheetRow) -> Result<()>;
}

/// Webhook（Apps Script等）へJSONで1行送る
pub struct SheetWebhook {
    client: reqwest::Client,
    url: String,
}

impl SheetWebhook {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MealLogError::Config(format!("HTTPクライアント生成エラー: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl LogSink for SheetWebhook {
    async fn submit(&self, row: &SheetRow) -> Result<()> {
        tracing::info!(url = %self.url, meal = %row.meal_name, date = %row.date, "logging meal to sheet");

        let response = self.client.post(&self.url).json(row).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "sheet webhook returned error status");
            return Err(MealLogError::LogStatus {
                status: status.as_u16(),
                body: MealLogError::excerpt(&body),
            });
        }

        Ok(())
    }
}

/// 記録先が未設定のときのシンク。送信は常に `MissingEndpoint` で失敗する
pub struct UnconfiguredSink;

#[async_trait]
impl LogSink for UnconfiguredSink {
    async fn submit(&self, _row: &SheetRow) -> Result<()> {
        Err(MealLogError::MissingEndpoint("記録Webhook", "log"))
    }
}

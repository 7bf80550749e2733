//! 解析Webhook連携
//!
//! APIキーはクライアントに持たせず、サーバー側のプロキシがモデルを呼ぶ。
//! リクエスト: `{ imageDataUrl, mealType, notes }`
//! レスポンス: NutritionRecord 形式のJSON（欠損した数値は 0 に補正）

use super::AnalysisBackend;
use crate::error::{MealLogError, Result};
use async_trait::async_trait;
use meal_log_common::{parse_nutrition_response, AnalysisRequest, NutritionRecord};
use std::time::Duration;

pub struct WebhookBackend {
    client: reqwest::Client,
    url: String,
}

impl WebhookBackend {
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
impl AnalysisBackend for WebhookBackend {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<NutritionRecord> {
        tracing::info!(
            url = %self.url,
            meal_type = %request.meal_type,
            has_image = request.image.is_some(),
            image_bytes = request.image.as_ref().map(|i| i.approx_len()).unwrap_or(0),
            "sending analysis request"
        );

        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "analysis webhook returned error status");
            return Err(MealLogError::AnalysisStatus {
                status: status.as_u16(),
                body: MealLogError::excerpt(&body),
            });
        }

        tracing::debug!(len = body.len(), "analysis response received");

        parse_nutrition_response(&body)
            .map_err(|e| MealLogError::ApiParse(format!("解析レスポンス: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_any_url_string() {
        let backend = WebhookBackend::new("https://example.com/analyze", Duration::from_secs(5));
        assert!(backend.is_ok());
        assert_eq!(backend.unwrap().url, "https://example.com/analyze");
    }
}

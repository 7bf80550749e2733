//! 解析Webhook

use super::{excerpt, post_json, ANALYSIS_URL};
use meal_log_common::{parse_nutrition_response, AnalysisRequest, NutritionRecord};

pub async fn analyze(request: &AnalysisRequest) -> Result<NutritionRecord, String> {
    let reply = post_json(ANALYSIS_URL, request).await?;

    if !reply.ok {
        return Err(format!(
            "Analysis webhook failed with status {}: {}",
            reply.status,
            excerpt(&reply.body)
        ));
    }

    parse_nutrition_response(&reply.body).map_err(|e| format!("Invalid analysis response: {}", e))
}

//! スプレッドシート記録Webhook

use super::{excerpt, post_json, SHEET_URL};
use meal_log_common::SheetRow;

pub async fn submit(row: &SheetRow) -> Result<(), String> {
    let reply = post_json(SHEET_URL, row).await?;

    if !reply.ok {
        return Err(format!(
            "Webhook failed with status {}: {}",
            reply.status,
            excerpt(&reply.body)
        ));
    }
    Ok(())
}

//! 表示用の整形ヘルパー

use chrono::DateTime;

pub const MSG_NO_FOODS: &str = "Could not identify specific food items.";
pub const MSG_NO_HISTORY: &str = "You haven't logged any meals yet.";
pub const DATE_UNKNOWN: &str = "Date unknown";

/// 栄養値は整数に丸めて表示
pub fn format_amount(value: f64) -> String {
    format!("{:.0}", value)
}

/// 記録日時（RFC 3339）を日付表示にする。読めない場合はそのまま返す
pub fn format_logged_date(logged_date: Option<&str>) -> String {
    match logged_date {
        None => DATE_UNKNOWN.to_string(),
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            Err(_) => raw.to_string(),
        },
    }
}

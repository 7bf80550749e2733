//! 端末向けの結果・履歴表示

use meal_log_common::format::{MSG_NO_FOODS, MSG_NO_HISTORY};
use meal_log_common::{format_amount, format_logged_date, NutritionRecord};
use std::fmt::Write;

/// 主要4項目（カロリー・たんぱく質・炭水化物・脂質）
const MACRO_COUNT: usize = 4;

/// 解析結果の表示
pub fn render_record(record: &NutritionRecord) -> String {
    let mut out = String::new();
    let name = if record.meal_name.is_empty() {
        "(unnamed meal)"
    } else {
        record.meal_name.as_str()
    };
    let _ = writeln!(out, "🍽  {}", name);

    if record.identified_foods.is_empty() {
        let _ = writeln!(out, "   {}", MSG_NO_FOODS);
    } else {
        let _ = writeln!(out, "   Identified: {}", record.identified_foods.join(", "));
    }
    out.push('\n');

    let rows = record.nutrient_rows();
    let (macros, details) = rows.split_at(MACRO_COUNT);

    let line: Vec<String> = macros
        .iter()
        .map(|(label, unit, value)| format!("{} {} {}", label, format_amount(*value), unit))
        .collect();
    let _ = writeln!(out, "   {}", line.join(" | "));
    out.push('\n');

    for (label, unit, value) in details {
        let _ = writeln!(out, "   {:<16} {:>6} {}", label, format_amount(*value), unit);
    }

    if !record.notes.trim().is_empty() {
        let _ = writeln!(out, "\n   Notes: {}", record.notes.trim());
    }
    if !record.disclaimer.trim().is_empty() {
        let _ = writeln!(out, "\n   ※ {}", record.disclaimer.trim());
    }

    out
}

/// 履歴一覧の1行（番号は1始まり）
pub fn render_history_line(index: usize, record: &NutritionRecord) -> String {
    format!(
        "[{}] {}  {}  {} kcal",
        index + 1,
        format_logged_date(record.logged_date.as_deref()),
        record.meal_name,
        format_amount(record.calories)
    )
}

/// 履歴一覧（新しい順、`limit` 件まで）
pub fn render_history(history: &[NutritionRecord], limit: Option<usize>) -> String {
    if history.is_empty() {
        return format!("{}\n", MSG_NO_HISTORY);
    }
    let limit = limit.unwrap_or(history.len());
    history
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, r)| render_history_line(i, r) + "\n")
        .collect()
}

//! 記録履歴（新しい順）
//!
//! 保存領域は1つの名前付きスロットにJSON配列で置く。スキーマのバージョンは持たないので、
//! 読み込みは壊れた内容を空リストとして扱い、要素単位で不正なものだけ読み飛ばす。

use crate::parser::record_from_value;
use crate::types::NutritionRecord;
use serde_json::Value;

/// 保存スロット名
pub const HISTORY_KEY: &str = "mealLogHistory";

/// 新しい順のレコード列
pub type HistoryList = Vec<NutritionRecord>;

/// 保存済み文字列から履歴を復元
///
/// 未保存・空文字・JSONでない・配列でない場合は空リスト。失敗しない。
pub fn parse_history(raw: Option<&str>) -> HistoryList {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items.iter().filter_map(record_from_value).collect(),
        _ => Vec::new(),
    }
}

/// 保存用にシリアライズ
pub fn serialize_history(history: &[NutritionRecord]) -> serde_json::Result<String> {
    serde_json::to_string(history)
}

/// 先頭に追加した新しいリストを返す（既存の順序は保持）
pub fn prepend(history: &[NutritionRecord], record: NutritionRecord) -> HistoryList {
    let mut updated = Vec::with_capacity(history.len() + 1);
    updated.push(record);
    updated.extend_from_slice(history);
    updated
}

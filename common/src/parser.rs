//! APIレスポンスパーサー
//!
//! 解析サービスのレスポンスからJSONを抽出し、NutritionRecordへ補正しながら変換する。
//! 推定値はベストエフォートなので、欠損・不正な数値項目は拒否せず 0 にする。

use crate::error::{Error, Result};
use crate::types::NutritionRecord;
use serde_json::{Map, Value};

/// APIレスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 先に現れる `{...}` または `[...]`
/// 3. エラー
///
/// # Examples
/// ```
/// use meal_log_common::extract_json;
///
/// let response = "Result: {\"mealName\": \"Soup\"} done";
/// let json = extract_json(response).unwrap();
/// assert_eq!(json, "{\"mealName\": \"Soup\"}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    let object_start = response.find('{');
    let array_start = response.find('[');
    let (open, close) = match (object_start, array_start) {
        (Some(o), Some(a)) if a < o => ('[', ']'),
        (Some(_), _) => ('{', '}'),
        (None, Some(_)) => ('[', ']'),
        (None, None) => return Err(Error::Parse("JSONが見つかりません".into())),
    };

    if let (Some(start), Some(end)) = (response.find(open), response.rfind(close)) {
        if end >= start {
            return Ok(&response[start..=end]);
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 解析レスポンスをパース
///
/// 単一オブジェクトまたは先頭要素を持つ配列を受け付ける。
/// レスポンスに含まれる `id` / `loggedDate` は無視する（記録時に付与するため）。
pub fn parse_nutrition_response(response: &str) -> Result<NutritionRecord> {
    let json_str = extract_json(response)?;
    let value: Value = serde_json::from_str(json_str.trim())?;

    let obj = match value {
        Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
        other => other,
    };

    let Some(map) = obj.as_object() else {
        return Err(Error::Parse("JSON object not found".into()));
    };

    Ok(coerce_record(map, false))
}

/// 保存済みの値を1件分補正して取り込む（履歴読み込み用）
///
/// オブジェクト以外は `None`。
pub fn record_from_value(value: &Value) -> Option<NutritionRecord> {
    value.as_object().map(|map| coerce_record(map, true))
}

fn coerce_record(map: &Map<String, Value>, keep_identity: bool) -> NutritionRecord {
    let mut record = NutritionRecord {
        meal_name: get_string(map, "mealName").unwrap_or_default(),
        notes: get_string(map, "notes").unwrap_or_default(),
        disclaimer: get_string(map, "disclaimer").unwrap_or_default(),
        identified_foods: get_string_list(map, "identifiedFoods"),
        ..Default::default()
    };

    for key in NutritionRecord::NUMERIC_FIELDS {
        if let Some(slot) = record.numeric_mut(key) {
            *slot = get_number(map, key);
        }
    }

    if keep_identity {
        record.id = get_string(map, "id");
        record.logged_date = get_string(map, "loggedDate");
    }

    record
}

fn get_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    let value = map.get(key)?;
    if let Some(s) = value.as_str() {
        return Some(s.to_string());
    }
    if value.is_null() {
        return None;
    }
    Some(value.to_string())
}

/// 数値項目の取得。欠損・非数値・負数・非有限値は 0
fn get_number(map: &Map<String, Value>, key: &str) -> f64 {
    let parsed = match map.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => leading_number(s),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// "12.5 g" のような文字列から先頭の数値を取り出す
fn leading_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let end = trimmed
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse::<f64>().ok()
}

fn get_string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // extract_json テスト
    // =============================================

    #[test]
    fn test_extract_json_with_block() {
        let response = r#"Here is the analysis:
```json
{"mealName": "Ramen", "calories": 550}
```
Enjoy."#;
        let json = extract_json(response).unwrap();
        assert_eq!(json, r#"{"mealName": "Ramen", "calories": 550}"#);
    }

    #[test]
    fn test_extract_json_object_with_nested_array() {
        let response = r#"{"mealName": "Bowl", "identifiedFoods": ["rice", "egg"]}"#;
        let json = extract_json(response).unwrap();
        assert_eq!(json, response);
    }

    #[test]
    fn test_extract_json_array_first() {
        let response = r#"[{"mealName": "Toast"}]"#;
        let json = extract_json(response).unwrap();
        assert_eq!(json, response);
    }

    #[test]
    fn test_extract_json_error() {
        let result = extract_json("No JSON here, just plain text.");
        if let Err(Error::Parse(msg)) = result {
            assert!(msg.contains("JSONが見つかりません"));
        } else {
            panic!("Expected Parse error");
        }
    }

    // =============================================
    // parse_nutrition_response テスト
    // =============================================

    #[test]
    fn test_parse_full_response() {
        let response = r#"{
            "mealName": "Grilled Chicken Bowl",
            "calories": 450,
            "protein": 35,
            "carbs": 40.5,
            "fat": 12,
            "identifiedFoods": ["chicken", "rice"],
            "notes": "grilled chicken, rice",
            "disclaimer": "Estimates only."
        }"#;
        let record = parse_nutrition_response(response).unwrap();
        assert_eq!(record.meal_name, "Grilled Chicken Bowl");
        assert_eq!(record.calories, 450.0);
        assert_eq!(record.protein, 35.0);
        assert_eq!(record.carbs, 40.5);
        assert_eq!(record.identified_foods, vec!["chicken", "rice"]);
        assert_eq!(record.disclaimer, "Estimates only.");
    }

    #[test]
    fn test_missing_numeric_field_defaults_to_zero_only() {
        let with_iron = r#"{"mealName": "Soup", "calories": 200, "protein": 9, "iron": 2.5}"#;
        let without_iron = r#"{"mealName": "Soup", "calories": 200, "protein": 9}"#;

        let full = parse_nutrition_response(with_iron).unwrap();
        let partial = parse_nutrition_response(without_iron).unwrap();

        assert_eq!(partial.iron, 0.0);
        assert_eq!(NutritionRecord { iron: 2.5, ..partial }, full);
    }

    #[test]
    fn test_non_numeric_values_coerced() {
        let response = r#"{
            "mealName": "Snack",
            "calories": "180 kcal",
            "protein": "abc",
            "fat": null,
            "sugar": -4,
            "sodium": true,
            "fibre": "3.5"
        }"#;
        let record = parse_nutrition_response(response).unwrap();
        assert_eq!(record.calories, 180.0);
        assert_eq!(record.protein, 0.0);
        assert_eq!(record.fat, 0.0);
        assert_eq!(record.sugar, 0.0);
        assert_eq!(record.sodium, 0.0);
        assert_eq!(record.fibre, 3.5);
    }

    #[test]
    fn test_parse_array_response_takes_first() {
        let response = r#"[{"mealName": "First"}, {"mealName": "Second"}]"#;
        let record = parse_nutrition_response(response).unwrap();
        assert_eq!(record.meal_name, "First");
    }

    #[test]
    fn test_parse_ignores_identity_fields() {
        let response = r#"{"mealName": "Pasta", "id": "x", "loggedDate": "2026-01-01"}"#;
        let record = parse_nutrition_response(response).unwrap();
        assert!(record.id.is_none());
        assert!(!record.is_logged());
    }

    #[test]
    fn test_identified_foods_from_string() {
        let response = r#"{"identifiedFoods": "egg, toast , ,bacon"}"#;
        let record = parse_nutrition_response(response).unwrap();
        assert_eq!(record.identified_foods, vec!["egg", "toast", "bacon"]);
    }

    #[test]
    fn test_parse_non_object_is_error() {
        assert!(parse_nutrition_response("[1, 2, 3]").is_err());
        assert!(parse_nutrition_response("[]").is_err());
        assert!(matches!(parse_nutrition_response("{not json}"), Err(Error::Json(_))));
    }

    #[test]
    fn test_record_from_value_keeps_identity() {
        let value = serde_json::json!({
            "id": "1234",
            "loggedDate": "2026-10-17T12:00:00+00:00",
            "mealName": "Curry",
            "calories": 700
        });
        let record = record_from_value(&value).unwrap();
        assert_eq!(record.id.as_deref(), Some("1234"));
        assert!(record.is_logged());
        assert_eq!(record.calories, 700.0);

        assert!(record_from_value(&serde_json::json!("text")).is_none());
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("12.5 g"), Some(12.5));
        assert_eq!(leading_number(" 7"), Some(7.0));
        assert_eq!(leading_number("-3"), Some(-3.0));
        assert_eq!(leading_number("g12"), None);
    }
}

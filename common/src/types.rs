//! 食事記録の型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - MealType: 食事区分（朝食/昼食/夕食/間食）
//! - NutritionRecord: 解析サービスが返す栄養推定 + 記録時のメタデータ

use serde::{Deserialize, Serialize};
use std::fmt;

/// 食事区分
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    #[default]
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" | "b" => Ok(MealType::Breakfast),
            "lunch" | "l" => Ok(MealType::Lunch),
            "dinner" | "d" => Ok(MealType::Dinner),
            "snack" | "s" => Ok(MealType::Snack),
            _ => Err(format!(
                "Unknown meal type: {}. Use breakfast, lunch, dinner, or snack",
                s
            )),
        }
    }
}

/// 栄養推定レコード
///
/// 解析レスポンスから生成され、記録時に一度だけ `id` と `logged_date` が付与される。
/// 数値項目は不明な場合 0。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NutritionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// 記録日時（RFC 3339）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logged_date: Option<String>,

    pub meal_name: String,

    pub calories: f64,        // kcal
    pub protein: f64,         // g
    pub carbs: f64,           // g
    pub fat: f64,             // g
    pub fibre: f64,           // g
    pub sugar: f64,           // g
    pub sodium: f64,          // mg
    pub cholesterol: f64,     // mg
    pub saturated_fat: f64,   // g
    pub unsaturated_fat: f64, // g
    pub potassium: f64,       // mg
    pub vitamin_a: f64,       // µg
    pub vitamin_c: f64,       // mg
    pub calcium: f64,         // mg
    pub iron: f64,            // mg

    /// 材料メモ
    pub notes: String,

    /// 識別された食品（出現順）
    pub identified_foods: Vec<String>,

    pub disclaimer: String,
}

impl NutritionRecord {
    /// 数値項目のJSONキー一覧（レスポンス補正・表示で共用）
    pub const NUMERIC_FIELDS: [&'static str; 15] = [
        "calories",
        "protein",
        "carbs",
        "fat",
        "fibre",
        "sugar",
        "sodium",
        "cholesterol",
        "saturatedFat",
        "unsaturatedFat",
        "potassium",
        "vitaminA",
        "vitaminC",
        "calcium",
        "iron",
    ];

    /// 表示ラベルと単位（`NUMERIC_FIELDS` と同順）
    pub const NUMERIC_LABELS: [(&'static str, &'static str); 15] = [
        ("Calories", "kcal"),
        ("Protein", "g"),
        ("Carbs", "g"),
        ("Fat", "g"),
        ("Fibre", "g"),
        ("Sugar", "g"),
        ("Sodium", "mg"),
        ("Cholesterol", "mg"),
        ("Saturated Fat", "g"),
        ("Unsaturated Fat", "g"),
        ("Potassium", "mg"),
        ("Vitamin A", "µg"),
        ("Vitamin C", "mg"),
        ("Calcium", "mg"),
        ("Iron", "mg"),
    ];

    /// (ラベル, 単位, 値) を表示順に返す
    pub fn nutrient_rows(&self) -> Vec<(&'static str, &'static str, f64)> {
        Self::NUMERIC_FIELDS
            .iter()
            .zip(Self::NUMERIC_LABELS.iter())
            .map(|(key, (label, unit))| (*label, *unit, self.numeric(key).unwrap_or(0.0)))
            .collect()
    }

    /// id と記録日時の両方があれば記録済み
    pub fn is_logged(&self) -> bool {
        self.id.is_some() && self.logged_date.is_some()
    }

    /// 記録時のスタンプを付与した新しいレコードを返す
    pub fn stamp(&self, id: impl Into<String>, logged_date: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            logged_date: Some(logged_date.into()),
            ..self.clone()
        }
    }

    /// JSONキー名で数値項目を取得
    pub fn numeric(&self, key: &str) -> Option<f64> {
        let value = match key {
            "calories" => self.calories,
            "protein" => self.protein,
            "carbs" => self.carbs,
            "fat" => self.fat,
            "fibre" => self.fibre,
            "sugar" => self.sugar,
            "sodium" => self.sodium,
            "cholesterol" => self.cholesterol,
            "saturatedFat" => self.saturated_fat,
            "unsaturatedFat" => self.unsaturated_fat,
            "potassium" => self.potassium,
            "vitaminA" => self.vitamin_a,
            "vitaminC" => self.vitamin_c,
            "calcium" => self.calcium,
            "iron" => self.iron,
            _ => return None,
        };
        Some(value)
    }

    pub(crate) fn numeric_mut(&mut self, key: &str) -> Option<&mut f64> {
        let slot = match key {
            "calories" => &mut self.calories,
            "protein" => &mut self.protein,
            "carbs" => &mut self.carbs,
            "fat" => &mut self.fat,
            "fibre" => &mut self.fibre,
            "sugar" => &mut self.sugar,
            "sodium" => &mut self.sodium,
            "cholesterol" => &mut self.cholesterol,
            "saturatedFat" => &mut self.saturated_fat,
            "unsaturatedFat" => &mut self.unsaturated_fat,
            "potassium" => &mut self.potassium,
            "vitaminA" => &mut self.vitamin_a,
            "vitaminC" => &mut self.vitamin_c,
            "calcium" => &mut self.calcium,
            "iron" => &mut self.iron,
            _ => return None,
        };
        Some(slot)
    }
}

//! スプレッドシート記録用ペイロード
//!
//! 記録先Webhookへ送る1行分のデータ。キーは人間が読める固定ラベルで、
//! 日付と時刻は解析時ではなく記録した瞬間から作る。

use crate::types::{MealType, NutritionRecord};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// 記録1行分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time of Day")]
    pub time_of_day: String,
    #[serde(rename = "Meal Type")]
    pub meal_type: MealType,
    #[serde(rename = "Meal Name")]
    pub meal_name: String,
    #[serde(rename = "Calories (kcal)")]
    pub calories: f64,
    #[serde(rename = "Protein (g)")]
    pub protein: f64,
    #[serde(rename = "Carbs (g)")]
    pub carbs: f64,
    #[serde(rename = "Fat (g)")]
    pub fat: f64,
    #[serde(rename = "Fibre (g)")]
    pub fibre: f64,
    #[serde(rename = "Sugar (g)")]
    pub sugar: f64,
    #[serde(rename = "Sodium (mg)")]
    pub sodium: f64,
    #[serde(rename = "Cholesterol (mg)")]
    pub cholesterol: f64,
    #[serde(rename = "Saturated Fat (g)")]
    pub saturated_fat: f64,
    #[serde(rename = "Unsaturated Fat (g)")]
    pub unsaturated_fat: f64,
    #[serde(rename = "Potassium (mg)")]
    pub potassium: f64,
    #[serde(rename = "Vitamin A (µg)")]
    pub vitamin_a: f64,
    #[serde(rename = "Vitamin C (mg)")]
    pub vitamin_c: f64,
    #[serde(rename = "Calcium (mg)")]
    pub calcium: f64,
    #[serde(rename = "Iron (mg)")]
    pub iron: f64,
    #[serde(rename = "Notes / Ingredients")]
    pub notes: String,
}

impl SheetRow {
    /// 列ラベル（送信順）
    pub const KEYS: [&'static str; 20] = [
        "Date",
        "Time of Day",
        "Meal Type",
        "Meal Name",
        "Calories (kcal)",
        "Protein (g)",
        "Carbs (g)",
        "Fat (g)",
        "Fibre (g)",
        "Sugar (g)",
        "Sodium (mg)",
        "Cholesterol (mg)",
        "Saturated Fat (g)",
        "Unsaturated Fat (g)",
        "Potassium (mg)",
        "Vitamin A (µg)",
        "Vitamin C (mg)",
        "Calcium (mg)",
        "Iron (mg)",
        "Notes / Ingredients",
    ];

    /// 記録時刻 `logged_at`（利用者のローカルオフセット付き）から1行を組み立てる
    pub fn build(
        record: &NutritionRecord,
        meal_type: MealType,
        logged_at: &DateTime<FixedOffset>,
    ) -> Self {
        Self {
            date: logged_at.format("%Y-%m-%d").to_string(),
            time_of_day: logged_at.format("%H:%M").to_string(),
            meal_type,
            meal_name: record.meal_name.clone(),
            calories: record.calories,
            protein: record.protein,
            carbs: record.carbs,
            fat: record.fat,
            fibre: record.fibre,
            sugar: record.sugar,
            sodium: record.sodium,
            cholesterol: record.cholesterol,
            saturated_fat: record.saturated_fat,
            unsaturated_fat: record.unsaturated_fat,
            potassium: record.potassium,
            vitamin_a: record.vitamin_a,
            vitamin_c: record.vitamin_c,
            calcium: record.calcium,
            iron: record.iron,
            notes: record.notes.clone(),
        }
    }
}

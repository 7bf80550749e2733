//! 解析結果の表示

use crate::app::Dispatcher;
use leptos::prelude::*;
use meal_log_common::format::MSG_NO_FOODS;
use meal_log_common::{format_amount, Event, NutritionRecord};

/// 主要4項目の数
const MACRO_COUNT: usize = 4;

/// 結果画面（記録ボタン付き）
#[component]
pub fn NutritionResult(dispatcher: Dispatcher) -> impl IntoView {
    let state = dispatcher.state;
    let log_label = move || {
        state.with(|s| {
            if s.logging.is_some() {
                "Logging..."
            } else if s.logged {
                "✓ Logged"
            } else {
                "Log Meal to Sheet"
            }
        })
    };

    view! {
        <div class="nutrition-result">
            {move || state.with(|s| s.record.clone()).map(|record| view! { <RecordCard record=record /> })}
            <div class="result-actions">
                <button
                    class="primary-button"
                    disabled=move || state.with(|s| !s.can_log())
                    on:click=move |_| dispatcher.send(Event::LogCurrent)
                >
                    {log_label}
                </button>
                <button class="secondary-button" on:click=move |_| dispatcher.send(Event::Reset)>
                    "Analyze Another Meal"
                </button>
            </div>
        </div>
    }
}

/// 栄養推定カード（結果・履歴詳細で共用）
#[component]
pub fn RecordCard(record: NutritionRecord) -> impl IntoView {
    let rows = record.nutrient_rows();
    let (macros, details) = rows.split_at(MACRO_COUNT);

    let foods = if record.identified_foods.is_empty() {
        view! { <p class="text-muted">{MSG_NO_FOODS}</p> }.into_any()
    } else {
        view! {
            <div class="food-tags">
                {record
                    .identified_foods
                    .iter()
                    .map(|food| view! { <span class="food-tag">{food.clone()}</span> })
                    .collect_view()}
            </div>
        }
        .into_any()
    };

    view! {
        <div class="record-card">
            <h2>"Nutrition Analysis"</h2>
            <p class="meal-name">{record.meal_name.clone()}</p>

            <h3>"Identified Foods:"</h3>
            {foods}

            <div class="stat-grid">
                {macros
                    .iter()
                    .map(|(label, unit, value)| view! {
                        <div class="stat-card">
                            <p class="stat-label">{*label}</p>
                            <p class="stat-value">{format_amount(*value)}</p>
                            <p class="stat-unit">{*unit}</p>
                        </div>
                    })
                    .collect_view()}
            </div>

            <table class="nutrient-table">
                <tbody>
                    {details
                        .iter()
                        .map(|(label, unit, value)| view! {
                            <tr>
                                <td>{*label}</td>
                                <td class="amount">{format!("{} {}", format_amount(*value), unit)}</td>
                            </tr>
                        })
                        .collect_view()}
                </tbody>
            </table>

            <p class="disclaimer">{record.disclaimer.clone()}</p>
        </div>
    }
}

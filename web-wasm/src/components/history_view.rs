//! 記録履歴の一覧と詳細

use super::nutrition_result::RecordCard;
use crate::app::Dispatcher;
use leptos::prelude::*;
use meal_log_common::format::MSG_NO_HISTORY;
use meal_log_common::{format_amount, format_logged_date, Event};

#[component]
pub fn HistoryView(dispatcher: Dispatcher) -> impl IntoView {
    let state = dispatcher.state;
    let selected = move || state.with(|s| s.selected_history().cloned());

    view! {
        {move || match selected() {
            Some(record) => view! {
                <div class="history-detail">
                    <h2>"Log Details"</h2>
                    <RecordCard record=record />
                    <button class="secondary-button" on:click=move |_| dispatcher.send(Event::Back)>
                        "Back"
                    </button>
                </div>
            }
            .into_any(),
            None => view! {
                <div class="history-list">
                    <h2>"Meal History"</h2>
                    {move || {
                        let history = state.with(|s| s.history.clone());
                        if history.is_empty() {
                            return view! { <p class="text-muted">{MSG_NO_HISTORY}</p> }.into_any();
                        }
                        view! {
                            <ul>
                                {history
                                    .into_iter()
                                    .enumerate()
                                    .map(|(index, record)| view! {
                                        <li>
                                            <button
                                                class="history-item"
                                                on:click=move |_| dispatcher.send(Event::SelectHistory(index))
                                            >
                                                <div>
                                                    <p class="meal-name">{record.meal_name.clone()}</p>
                                                    <p class="text-muted">
                                                        {format_logged_date(record.logged_date.as_deref())}
                                                    </p>
                                                </div>
                                                <div class="calories">
                                                    <p>{format_amount(record.calories)}</p>
                                                    <p class="text-muted">"kcal"</p>
                                                </div>
                                            </button>
                                        </li>
                                    })
                                    .collect_view()}
                            </ul>
                        }
                        .into_any()
                    }}
                </div>
            }
            .into_any(),
        }}
    }
}

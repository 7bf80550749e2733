//! 食事区分・メモ入力画面

use crate::app::Dispatcher;
use leptos::prelude::*;
use meal_log_common::{Event, MealType};

#[component]
pub fn MealForm(dispatcher: Dispatcher) -> impl IntoView {
    let state = dispatcher.state;
    let image = move || state.with(|s| s.image.as_ref().map(|i| i.to_string()));

    view! {
        <div class="meal-form">
            {move || match image() {
                Some(src) => view! {
                    <div class="preview">
                        <img src=src alt="Captured meal" />
                    </div>
                }.into_any(),
                None => view! {
                    <div class="text-only">
                        <p>"Logging with text only."</p>
                    </div>
                }.into_any(),
            }}

            <div class="form-group">
                <label for="meal-type">"Meal Type"</label>
                <select
                    id="meal-type"
                    prop:value=move || state.with(|s| s.meal_type.to_string())
                    on:change=move |ev| {
                        if let Ok(meal_type) = event_target_value(&ev).parse::<MealType>() {
                            dispatcher.send(Event::SetMealType(meal_type));
                        }
                    }
                >
                    {MealType::ALL
                        .iter()
                        .map(|m| view! { <option value=m.as_str()>{m.as_str()}</option> })
                        .collect_view()}
                </select>
            </div>

            <div class="form-group">
                <label for="notes">"Notes"</label>
                <textarea
                    id="notes"
                    rows="3"
                    placeholder="e.g., Grilled chicken salad, extra avocado"
                    prop:value=move || state.with(|s| s.notes.clone())
                    on:input=move |ev| dispatcher.send(Event::SetNotes(event_target_value(&ev)))
                ></textarea>
            </div>

            <button
                class="primary-button"
                disabled=move || state.with(|s| s.is_busy())
                on:click=move |_| dispatcher.send(Event::SubmitAnalysis)
            >
                "Analyze Meal"
            </button>
        </div>
    }
}

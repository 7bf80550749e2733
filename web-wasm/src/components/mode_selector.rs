//! 入力方法の選択画面

use crate::app::Dispatcher;
use crate::camera;
use leptos::prelude::*;
use meal_log_common::Event;

#[component]
pub fn ModeSelector(dispatcher: Dispatcher) -> impl IntoView {
    let file_input: NodeRef<leptos::html::Input> = NodeRef::new();
    let has_history = move || dispatcher.state.with(|s| s.has_history());

    let on_file_change = move |_| {
        let Some(input) = file_input.get() else {
            return;
        };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        camera::read_file(file, move |result| match result {
            Ok(image) => dispatcher.send(Event::Captured(image)),
            Err(reason) => dispatcher.send(Event::UploadFailed(reason)),
        });
        // 同じファイルを続けて選べるようにする
        input.set_value("");
    };

    view! {
        <div class="mode-selector">
            <h2>"How would you like to log your meal?"</h2>
            <input
                type="file"
                accept="image/*"
                class="hidden"
                node_ref=file_input
                on:change=on_file_change
            />
            <div class="mode-buttons">
                <button class="mode-button" on:click=move |_| dispatcher.send(Event::OpenCamera)>
                    "Take a Photo"
                </button>
                <button
                    class="mode-button"
                    on:click=move |_| {
                        if let Some(input) = file_input.get() {
                            input.click();
                        }
                    }
                >
                    "Upload Image"
                </button>
                <button class="mode-button" on:click=move |_| dispatcher.send(Event::ChooseTextOnly)>
                    "Log with Text Only"
                </button>
                <Show when=has_history>
                    <button class="mode-button" on:click=move |_| dispatcher.send(Event::OpenHistory)>
                        "View History"
                    </button>
                </Show>
            </div>
        </div>
    }
}

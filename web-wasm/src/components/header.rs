//! ヘッダー・エラー表示・トースト・スピナー

use leptos::prelude::*;

#[component]
pub fn Header<F>(#[prop(into)] show_back: Signal<bool>, on_back: F) -> impl IntoView
where
    F: Fn(()) + 'static + Clone + Send + Sync,
{
    view! {
        <header class="header">
            <Show when=move || show_back.get()>
                {
                    let on_back = on_back.clone();
                    view! {
                        <button class="back-button" aria-label="Go back" on:click=move |_| on_back(())>
                            "←"
                        </button>
                    }
                }
            </Show>
            <h1>"Food Logger"</h1>
        </header>
    }
}

/// 直近のエラー1件（閉じるまで表示）
#[component]
pub fn ErrorBanner<F>(#[prop(into)] error: Signal<Option<String>>, on_dismiss: F) -> impl IntoView
where
    F: Fn(()) + 'static + Clone + Send + Sync,
{
    view! {
        <Show when=move || error.with(|e| e.is_some())>
            {
                let on_dismiss = on_dismiss.clone();
                view! {
                    <div class="error-banner" role="alert">
                        <div>
                            <p class="error-title">"Error"</p>
                            <p class="error-message">{move || error.get().unwrap_or_default()}</p>
                        </div>
                        <button class="error-close" on:click=move |_| on_dismiss(())>"×"</button>
                    </div>
                }
            }
        </Show>
    }
}

#[component]
pub fn Toast(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.with(|m| m.is_some())>
            <div class="toast">{move || message.get().unwrap_or_default()}</div>
        </Show>
    }
}

#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <div class="spinner-overlay">
            <div class="spinner"></div>
        </div>
    }
}

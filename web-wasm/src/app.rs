//! メインアプリケーションコンポーネント
//!
//! 画面状態は共通の状態マシンに任せ、ここでは副作用（カメラ・fetch・localStorage）だけを実行する。

use crate::camera::CameraStream;
use crate::components::{
    camera_capture::CameraCapture,
    header::{ErrorBanner, Header, Spinner, Toast},
    history_view::HistoryView,
    meal_form::MealForm,
    mode_selector::ModeSelector,
    nutrition_result::NutritionResult,
};
use crate::{api, storage};
use gloo::timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;
use meal_log_common::{transition, AppState, Effect as AppEffect, Event, Screen, SheetRow};

/// トーストの表示時間
const TOAST_MILLIS: u32 = 3000;

/// 予約し直すと前の予約を取り消すタイマー
#[derive(Default)]
pub struct ToastTimer(Option<Timeout>);

impl ToastTimer {
    pub fn schedule(&mut self, millis: u32, callback: impl FnOnce() + 'static) {
        self.0 = Some(Timeout::new(millis, callback));
    }

    pub fn cancel(&mut self) {
        self.0 = None;
    }
}

/// 状態とカメラハンドルをまとめたイベント送出口
#[derive(Clone, Copy)]
pub struct Dispatcher {
    pub state: RwSignal<AppState>,
    pub camera: RwSignal<Option<CameraStream>, LocalStorage>,
}

impl Dispatcher {
    pub fn send(self, event: Event) {
        let mut effects = Vec::new();
        self.state.update(|state| {
            let (next, emitted) = transition(std::mem::take(state), event);
            *state = next;
            effects = emitted;
        });

        for effect in effects {
            self.run(effect);
        }
    }

    fn run(self, effect: AppEffect) {
        match effect {
            AppEffect::OpenCamera => {
                let requested = self.state.with_untracked(|s| s.generation);
                spawn_local(async move {
                    let opened = CameraStream::open().await;

                    // 取得待ちの間に撮影画面を離れた・開き直した要求の結果は捨てる
                    if !self.state.with_untracked(|s| s.awaits_camera(requested)) {
                        if let Ok(stream) = opened {
                            stream.stop();
                        }
                        return;
                    }

                    match opened {
                        Ok(stream) => self.attach_camera(stream),
                        Err(reason) => {
                            gloo::console::error!(format!("camera open failed: {}", reason));
                            self.send(Event::CameraFailed(reason));
                        }
                    }
                });
            }

            AppEffect::CloseCamera => self.close_camera(),

            AppEffect::Analyze { generation, request } => spawn_local(async move {
                match api::analysis::analyze(&request).await {
                    Ok(record) => self.send(Event::AnalysisSucceeded { generation, record }),
                    Err(reason) => {
                        gloo::console::error!(format!("analysis failed: {}", reason));
                        self.send(Event::AnalysisFailed { generation, reason });
                    }
                }
            }),

            AppEffect::Log { generation, record, meal_type } => spawn_local(async move {
                // シートの日時と履歴の記録日時は同じ瞬間を使う
                let logged_at = chrono::Local::now().fixed_offset();
                let row = SheetRow::build(&record, meal_type, &logged_at);

                match api::sheet::submit(&row).await {
                    Ok(()) => {
                        let id = uuid::Uuid::new_v4().to_string();
                        let record = record.stamp(id, logged_at.to_rfc3339());
                        self.send(Event::LogSucceeded { generation, record });
                    }
                    Err(reason) => {
                        gloo::console::error!(format!("logging failed: {}", reason));
                        self.send(Event::LogFailed { generation, reason });
                    }
                }
            }),

            AppEffect::AppendHistory(record) => {
                let updated = storage::append_history(record);
                self.send(Event::HistoryLoaded(updated));
            }
        }
    }

    fn attach_camera(self, stream: CameraStream) {
        if let Some(previous) = self.camera.get_untracked() {
            previous.stop();
        }
        self.camera.set(Some(stream));
    }

    pub fn close_camera(self) {
        if let Some(stream) = self.camera.get_untracked() {
            stream.stop();
        }
        self.camera.set(None);
    }
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let dispatcher = Dispatcher {
        state: RwSignal::new(AppState::with_history(storage::load_history())),
        camera: RwSignal::new_local(None),
    };
    let state = dispatcher.state;

    // 画面破棄時もカメラを解放する
    on_cleanup(move || dispatcher.close_camera());

    // トーストは表示内容が変わるたびにタイマーを張り替える
    let toast = Memo::new(move |_| state.with(|s| s.toast.clone()));
    let toast_timer = StoredValue::new_local(ToastTimer::default());
    Effect::new(move |_| {
        let showing = toast.with(|t| t.is_some());
        toast_timer.update_value(|timer| {
            if showing {
                timer.schedule(TOAST_MILLIS, move || dispatcher.send(Event::DismissToast));
            } else {
                timer.cancel();
            }
        });
    });

    let screen = Memo::new(move |_| state.with(|s| s.screen));

    view! {
        <div class="app">
            <Show when=move || state.with(|s| s.is_busy())>
                <Spinner />
            </Show>
            <Toast message=Signal::derive(move || toast.get()) />

            <Header
                show_back=Signal::derive(move || screen.get() != Screen::Selector)
                on_back=move |_| dispatcher.send(Event::Back)
            />

            <main class="main">
                <ErrorBanner
                    error=Signal::derive(move || state.with(|s| s.error.clone()))
                    on_dismiss=move |_| dispatcher.send(Event::DismissError)
                />
                {move || match screen.get() {
                    Screen::Selector => view! { <ModeSelector dispatcher=dispatcher /> }.into_any(),
                    Screen::Capture => view! { <CameraCapture dispatcher=dispatcher /> }.into_any(),
                    Screen::Form => view! { <MealForm dispatcher=dispatcher /> }.into_any(),
                    Screen::Result => view! { <NutritionResult dispatcher=dispatcher /> }.into_any(),
                    Screen::History { .. } => view! { <HistoryView dispatcher=dispatcher /> }.into_any(),
                }}
            </main>
        </div>
    }
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use gloo::timers::future::TimeoutFuture;
    use std::cell::Cell;
    use std::rc::Rc;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn wasm_rescheduled_toast_timer_fires_once() {
        let fired = Rc::new(Cell::new(0));
        let mut timer = ToastTimer::default();

        let first = fired.clone();
        timer.schedule(20, move || first.set(first.get() + 1));
        let second = fired.clone();
        timer.schedule(40, move || second.set(second.get() + 10));

        TimeoutFuture::new(80).await;
        assert_eq!(fired.get(), 10);
    }

    #[wasm_bindgen_test]
    async fn wasm_cancelled_toast_timer_never_fires() {
        let fired = Rc::new(Cell::new(false));
        let mut timer = ToastTimer::default();

        let flag = fired.clone();
        timer.schedule(20, move || flag.set(true));
        timer.cancel();

        TimeoutFuture::new(50).await;
        assert!(!fired.get());
    }
}

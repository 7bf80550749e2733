//! 撮影画面

use crate::app::Dispatcher;
use crate::camera;
use leptos::prelude::*;
use meal_log_common::Event;

#[component]
pub fn CameraCapture(dispatcher: Dispatcher) -> impl IntoView {
    let video_ref: NodeRef<leptos::html::Video> = NodeRef::new();
    let canvas_ref: NodeRef<leptos::html::Canvas> = NodeRef::new();

    // ストリーム取得後に映像要素へ接続
    Effect::new(move |_| {
        let (Some(video), Some(stream)) = (video_ref.get(), dispatcher.camera.get()) else {
            return;
        };
        video.set_autoplay(true);
        video.set_muted(true);
        let _ = video.set_attribute("playsinline", "");
        video.set_src_object(Some(stream.media_stream()));
        let _ = video.play();
    });

    let on_take_photo = move |_| {
        let (Some(video), Some(canvas)) = (video_ref.get(), canvas_ref.get()) else {
            return;
        };
        match camera::snapshot(&video, &canvas) {
            Ok(image) => dispatcher.send(Event::Captured(image)),
            Err(reason) => dispatcher.send(Event::CameraFailed(reason)),
        }
    };

    view! {
        <div class="camera-capture">
            <video node_ref=video_ref class="camera-video"></video>
            <canvas node_ref=canvas_ref class="hidden"></canvas>
            <div class="camera-hint">"Point camera at your meal"</div>
            <button
                class="shutter-button"
                aria-label="Take Photo"
                disabled=move || dispatcher.camera.with(|c| c.is_none())
                on:click=on_take_photo
            ></button>
        </div>
    }
}

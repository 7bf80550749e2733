//! ブラウザのカメラ（getUserMedia）とファイル読み込み

use meal_log_common::DataUrl;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, File, FileReader, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};

/// スナップショットのJPEG品質
const JPEG_QUALITY: f64 = 0.9;

/// 取得済みのカメラストリーム
#[derive(Clone)]
pub struct CameraStream {
    stream: MediaStream,
}

impl CameraStream {
    /// 背面カメラを要求する。失敗理由はそのまま画面表示に使う
    pub async fn open() -> Result<Self, String> {
        let devices = web_sys::window()
            .and_then(|w| w.navigator().media_devices().ok())
            .ok_or_else(|| "Camera API not available in this browser".to_string())?;

        let video = js_sys::Object::new();
        js_sys::Reflect::set(&video, &"facingMode".into(), &"environment".into())
            .map_err(describe)?;
        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&video);

        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(describe)?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(describe)?
            .dyn_into()
            .map_err(describe)?;

        Ok(Self { stream })
    }

    pub fn media_stream(&self) -> &MediaStream {
        &self.stream
    }

    /// すべてのトラックを停止（冪等）
    pub fn stop(&self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
    }
}

/// 再生中の映像を静止画にする
pub fn snapshot(video: &HtmlVideoElement, canvas: &HtmlCanvasElement) -> Result<DataUrl, String> {
    if video.video_width() == 0 {
        return Err("No active camera stream".to_string());
    }
    canvas.set_width(video.video_width());
    canvas.set_height(video.video_height());

    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(describe)?
        .ok_or_else(|| "Could not get canvas context to take photo".to_string())?
        .dyn_into()
        .map_err(describe)?;
    context
        .draw_image_with_html_video_element_and_dw_and_dh(
            video,
            0.0,
            0.0,
            canvas.width() as f64,
            canvas.height() as f64,
        )
        .map_err(describe)?;

    let data_url = canvas
        .to_data_url_with_type_and_encoder_options("image/jpeg", &JsValue::from_f64(JPEG_QUALITY))
        .map_err(describe)?;
    DataUrl::parse(&data_url).map_err(|e| e.to_string())
}

/// ファイルをData URLとして読み込む
pub fn read_file<F>(file: File, on_done: F)
where
    F: Fn(Result<DataUrl, String>) + 'static,
{
    let reader = match FileReader::new() {
        Ok(reader) => reader,
        Err(e) => {
            on_done(Err(describe(e)));
            return;
        }
    };

    let reader_clone = reader.clone();
    let on_done = std::rc::Rc::new(on_done);
    let on_load = {
        let on_done = on_done.clone();
        Closure::wrap(Box::new(move |_: web_sys::ProgressEvent| {
            let result = reader_clone
                .result()
                .ok()
                .and_then(|v| v.as_string())
                .ok_or_else(|| "Failed to read the uploaded image.".to_string())
                .and_then(|s| DataUrl::parse(&s).map_err(|e| e.to_string()));
            on_done(result);
        }) as Box<dyn FnMut(_)>)
    };
    let on_error = {
        let on_done = on_done.clone();
        Closure::wrap(Box::new(move |_: web_sys::ProgressEvent| {
            on_done(Err("Error reading file.".to_string()));
        }) as Box<dyn FnMut(_)>)
    };

    reader.set_onload(Some(on_load.as_ref().unchecked_ref()));
    reader.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    on_load.forget();
    on_error.forget();

    // 同期的に失敗した場合はイベントが来ない
    if let Err(e) = reader.read_as_data_url(&file) {
        on_done(Err(describe(e)));
    }
}

fn describe(value: JsValue) -> String {
    if let Some(e) = value.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use gloo::timers::future::TimeoutFuture;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    async fn read(file: File) -> Result<DataUrl, String> {
        let slot: Rc<RefCell<Option<Result<DataUrl, String>>>> = Rc::default();
        let sink = slot.clone();
        read_file(file, move |result| {
            sink.borrow_mut().replace(result);
        });

        for _ in 0..50 {
            if let Some(result) = slot.borrow_mut().take() {
                return result;
            }
            TimeoutFuture::new(10).await;
        }
        panic!("read_file never reported a result");
    }

    #[wasm_bindgen_test]
    async fn wasm_read_file_returns_data_url() {
        let bits = js_sys::Array::of1(&JsValue::from_str("hello"));
        let file = File::new_with_str_sequence(&bits, "notes.txt").expect("file");

        let image = read(file).await.expect("read failed");
        assert_eq!(image.decode().expect("decode"), b"hello");
    }

    #[wasm_bindgen_test]
    async fn wasm_read_empty_file_reports_failure() {
        let file = File::new_with_str_sequence(&js_sys::Array::new(), "empty.jpg").expect("file");

        let result = read(file).await;
        assert!(result.is_err());
    }
}

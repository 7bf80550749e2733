//! Webhook呼び出し（fetch）
//!
//! 解析・記録ともにJSONをPOSTするだけ。APIキーはクライアントに持たせない。

pub mod analysis;
pub mod sheet;

use futures::future::{select, Either};
use futures::pin_mut;
use gloo::timers::future::TimeoutFuture;
use std::future::Future;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestInit, RequestMode, Response};

/// ビルド時に `MEAL_LOG_ANALYSIS_URL` で差し替える
pub const ANALYSIS_URL: &str = match option_env!("MEAL_LOG_ANALYSIS_URL") {
    Some(url) => url,
    None => "/api/analyze-meal",
};

/// ビルド時に `MEAL_LOG_SHEET_URL` で差し替える
pub const SHEET_URL: &str = match option_env!("MEAL_LOG_SHEET_URL") {
    Some(url) => url,
    None => "/api/log-meal",
};

/// 応答 (ステータス, 本文)
pub struct Reply {
    pub status: u16,
    pub ok: bool,
    pub body: String,
}

/// 送信から応答本文を受け取るまでの上限
pub const REQUEST_TIMEOUT_MILLIS: u32 = 60_000;

const TIMED_OUT: &str = "Transport error: request timed out";

/// JSON本文をPOSTして応答本文を受け取る
///
/// 上限時間を超えたらリクエストを中断し、通信エラーとして返す。
pub async fn post_json<T: serde::Serialize>(url: &str, payload: &T) -> Result<Reply, String> {
    let body = serde_json::to_string(payload).map_err(|e| e.to_string())?;

    let abort = AbortController::new().map_err(js_error)?;
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(&body));
    opts.set_signal(Some(&abort.signal()));

    let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(js_error)?;

    let result = with_timeout(exchange(request), REQUEST_TIMEOUT_MILLIS).await;
    if result.is_err() {
        abort.abort();
    }
    result?
}

/// `future` が `millis` 以内に終わらなければ `Err`
pub async fn with_timeout<F: Future>(future: F, millis: u32) -> Result<F::Output, String> {
    let timer = TimeoutFuture::new(millis);
    pin_mut!(future);

    match select(future, timer).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => Err(TIMED_OUT.to_string()),
    }
}

async fn exchange(request: Request) -> Result<Reply, String> {
    let window = web_sys::window().ok_or_else(|| "window is not available".to_string())?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("Transport error: {}", js_error(e)))?;
    let resp: Response = resp_value.dyn_into().map_err(js_error)?;

    let text = JsFuture::from(resp.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;

    Ok(Reply {
        status: resp.status(),
        ok: resp.ok(),
        body: text.as_string().unwrap_or_default(),
    })
}

/// 応答本文の抜粋（200文字まで）
pub fn excerpt(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(MAX_CHARS).collect();
    cut.push('…');
    cut
}

fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn wasm_unanswered_request_times_out_as_transport_error() {
        let result = with_timeout(futures::future::pending::<()>(), 20).await;
        let reason = result.expect_err("pending future must time out");
        assert!(reason.starts_with("Transport error"));
        assert!(reason.contains("timed out"));
    }

    #[wasm_bindgen_test]
    async fn wasm_prompt_response_beats_timer() {
        let result = with_timeout(async { 42 }, 1_000).await;
        assert_eq!(result, Ok(42));
    }
}

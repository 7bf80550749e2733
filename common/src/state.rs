//! 画面状態マシン（CLI/WASM共通）
//!
//! 画面遷移とリクエストのライフサイクルを純粋関数 `transition` で表す。
//! 副作用（カメラ・通信・保存）は `Effect` として返し、実行はホスト側のドライバが行う。
//! 応答イベントには発行時の世代番号が付き、現在の世代と一致しないものは古い応答として捨てる。

use crate::data_url::DataUrl;
use crate::history::{prepend, HistoryList};
use crate::types::{MealType, NutritionRecord};
use serde::Serialize;

pub const MSG_EMPTY_SUBMISSION: &str = "Please add a photo or write a note to analyze your meal.";
pub const MSG_MISSING_RECORD: &str = "Cannot log meal: nutrition data is missing.";
pub const MSG_LOG_FAILED: &str = "Failed to save data. Please try again.";
pub const MSG_LOGGED: &str = "Logged to sheet!";

/// 表示中の画面
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Selector,
    Capture,
    Form,
    Result,
    /// `selected` は詳細表示中の履歴インデックス
    History { selected: Option<usize> },
}

/// 解析サービスへのリクエストボディ
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(rename = "imageDataUrl")]
    pub image: Option<DataUrl>,
    pub meal_type: MealType,
    pub notes: String,
}

/// コントローラが保持する状態
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub screen: Screen,
    pub image: Option<DataUrl>,
    pub meal_type: MealType,
    pub notes: String,
    pub record: Option<NutritionRecord>,
    pub history: HistoryList,
    /// 解析中リクエストの世代
    pub analyzing: Option<u64>,
    /// 記録中リクエストの世代
    pub logging: Option<u64>,
    pub logged: bool,
    pub error: Option<String>,
    pub toast: Option<String>,
    pub generation: u64,
}

impl AppState {
    pub fn with_history(history: HistoryList) -> Self {
        Self {
            history,
            ..Default::default()
        }
    }

    pub fn is_busy(&self) -> bool {
        self.analyzing.is_some() || self.logging.is_some()
    }

    /// 記録ボタンを押せるか
    pub fn can_log(&self) -> bool {
        self.record.is_some() && !self.logged && !self.is_busy()
    }

    pub fn has_history(&self) -> bool {
        !self.history.is_empty()
    }

    /// 履歴詳細で選択中のレコード
    pub fn selected_history(&self) -> Option<&NutritionRecord> {
        match self.screen {
            Screen::History { selected: Some(index) } => self.history.get(index),
            _ => None,
        }
    }

    /// `generation` の世代で要求したカメラをまだ撮影画面が待っているか
    ///
    /// 取得完了までに撮影画面を離れた（あるいは開き直した）場合は `false`。
    pub fn awaits_camera(&self, generation: u64) -> bool {
        self.screen == Screen::Capture && self.is_current(generation)
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// 選択画面へ戻す。進行中の応答はすべて古い世代になる
    fn reset(&mut self) {
        self.screen = Screen::Selector;
        self.image = None;
        self.notes.clear();
        self.error = None;
        self.record = None;
        self.logged = false;
        self.analyzing = None;
        self.logging = None;
        self.generation += 1;
    }
}

/// 利用者操作とリモート応答
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    HistoryLoaded(HistoryList),
    OpenCamera,
    CameraFailed(String),
    /// カメラのスナップショットまたはアップロード画像
    Captured(DataUrl),
    UploadFailed(String),
    ChooseTextOnly,
    OpenHistory,
    SelectHistory(usize),
    SetMealType(MealType),
    SetNotes(String),
    SubmitAnalysis,
    AnalysisSucceeded { generation: u64, record: NutritionRecord },
    AnalysisFailed { generation: u64, reason: String },
    LogCurrent,
    /// `record` はドライバが id と記録日時を付与済み
    LogSucceeded { generation: u64, record: NutritionRecord },
    LogFailed { generation: u64, reason: String },
    /// 戻るボタン（履歴詳細は一覧へ、それ以外は選択画面へ）
    Back,
    Reset,
    DismissError,
    DismissToast,
}

/// ドライバに実行を依頼する副作用
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    OpenCamera,
    CloseCamera,
    Analyze { generation: u64, request: AnalysisRequest },
    Log { generation: u64, record: NutritionRecord, meal_type: MealType },
    AppendHistory(NutritionRecord),
}

/// (状態, イベント) → (状態, 副作用)
pub fn transition(mut state: AppState, event: Event) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();
    let leaving_capture = state.screen == Screen::Capture;

    match event {
        Event::HistoryLoaded(history) => {
            state.history = history;
        }

        Event::OpenCamera => {
            if state.screen == Screen::Selector {
                state.error = None;
                state.screen = Screen::Capture;
                effects.push(Effect::OpenCamera);
            }
        }

        Event::CameraFailed(reason) => {
            state.error = Some(format!(
                "Could not access the camera: {}. Please check permissions.",
                reason
            ));
            if leaving_capture {
                state.screen = Screen::Selector;
                effects.push(Effect::CloseCamera);
            }
        }

        Event::Captured(image) => {
            if matches!(state.screen, Screen::Selector | Screen::Capture | Screen::Form) {
                if leaving_capture {
                    effects.push(Effect::CloseCamera);
                }
                state.image = Some(image);
                state.screen = Screen::Form;
            }
        }

        Event::UploadFailed(reason) => {
            state.error = Some(reason);
        }

        Event::ChooseTextOnly => {
            if state.screen == Screen::Selector {
                state.image = None;
                state.screen = Screen::Form;
            }
        }

        Event::OpenHistory => {
            if state.screen == Screen::Selector {
                state.screen = Screen::History { selected: None };
            }
        }

        Event::SelectHistory(index) => {
            if matches!(state.screen, Screen::History { .. }) && index < state.history.len() {
                state.screen = Screen::History { selected: Some(index) };
            }
        }

        Event::SetMealType(meal_type) => {
            state.meal_type = meal_type;
        }

        Event::SetNotes(notes) => {
            state.notes = notes;
        }

        Event::SubmitAnalysis => {
            if state.screen != Screen::Form || state.is_busy() {
                return (state, effects);
            }
            if state.image.is_none() && state.notes.trim().is_empty() {
                state.error = Some(MSG_EMPTY_SUBMISSION.to_string());
                return (state, effects);
            }

            state.generation += 1;
            state.analyzing = Some(state.generation);
            state.error = None;
            state.logged = false;
            effects.push(Effect::Analyze {
                generation: state.generation,
                request: AnalysisRequest {
                    image: state.image.clone(),
                    meal_type: state.meal_type,
                    notes: state.notes.clone(),
                },
            });
        }

        Event::AnalysisSucceeded { generation, record } => {
            if state.is_current(generation) && state.analyzing == Some(generation) {
                state.analyzing = None;
                state.record = Some(record);
                state.logged = false;
                state.screen = Screen::Result;
            }
        }

        Event::AnalysisFailed { generation, reason } => {
            if state.is_current(generation) && state.analyzing == Some(generation) {
                state.analyzing = None;
                state.error = Some(format!("Failed to analyze meal. {}", reason));
            }
        }

        Event::LogCurrent => {
            let Some(record) = state.record.clone() else {
                state.error = Some(MSG_MISSING_RECORD.to_string());
                return (state, effects);
            };
            if state.logged || state.is_busy() {
                return (state, effects);
            }

            state.logging = Some(state.generation);
            effects.push(Effect::Log {
                generation: state.generation,
                record,
                meal_type: state.meal_type,
            });
        }

        Event::LogSucceeded { generation, record } => {
            // 送信先には既に記録済みなので、古い世代でも履歴には残す
            state.history = prepend(&state.history, record.clone());
            effects.push(Effect::AppendHistory(record));

            if state.is_current(generation) && state.logging == Some(generation) {
                state.logging = None;
                state.logged = true;
                state.toast = Some(MSG_LOGGED.to_string());
            }
        }

        Event::LogFailed { generation, .. } => {
            if state.is_current(generation) && state.logging == Some(generation) {
                state.logging = None;
                state.error = Some(MSG_LOG_FAILED.to_string());
            }
        }

        Event::Back => match state.screen {
            Screen::History { selected: Some(_) } => {
                state.screen = Screen::History { selected: None };
            }
            Screen::History { selected: None } => {
                state.screen = Screen::Selector;
            }
            Screen::Selector => {}
            _ => {
                if leaving_capture {
                    effects.push(Effect::CloseCamera);
                }
                state.reset();
            }
        },

        Event::Reset => {
            if leaving_capture {
                effects.push(Effect::CloseCamera);
            }
            state.reset();
        }

        Event::DismissError => {
            state.error = None;
        }

        Event::DismissToast => {
            state.toast = None;
        }
    }

    (state, effects)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(state: AppState, events: Vec<Event>) -> (AppState, Vec<Effect>) {
        let mut state = state;
        let mut all = Vec::new();
        for event in events {
            let (next, effects) = transition(state, event);
            state = next;
            all.extend(effects);
        }
        (state, all)
    }

    fn image() -> DataUrl {
        DataUrl::from_bytes("image/jpeg", b"jpeg-bytes")
    }

    fn record(name: &str, calories: f64) -> NutritionRecord {
        NutritionRecord {
            meal_name: name.to_string(),
            calories,
            ..Default::default()
        }
    }

    /// テキストのみでフォームまで進めた状態
    fn on_form(notes: &str) -> AppState {
        run(
            AppState::default(),
            vec![Event::ChooseTextOnly, Event::SetNotes(notes.to_string())],
        )
        .0
    }

    /// 解析成功で結果画面にいる状態
    fn on_result() -> AppState {
        let state = on_form("grilled chicken, rice");
        let (state, _) = transition(state, Event::SubmitAnalysis);
        let generation = state.generation;
        run(
            state,
            vec![Event::AnalysisSucceeded { generation, record: record("Grilled Chicken Bowl", 450.0) }],
        )
        .0
    }

    #[test]
    fn test_empty_submission_fails_validation_without_effects() {
        for notes in ["", "   ", "\n\t"] {
            let state = on_form(notes);
            let before = state.generation;
            let (state, effects) = transition(state, Event::SubmitAnalysis);
            assert!(effects.is_empty());
            assert_eq!(state.error.as_deref(), Some(MSG_EMPTY_SUBMISSION));
            assert_eq!(state.screen, Screen::Form);
            assert_eq!(state.generation, before);
            assert!(state.analyzing.is_none());
        }
    }

    #[test]
    fn test_submit_with_notes_only_requests_analysis_without_image() {
        let state = run(on_form("grilled chicken, rice"), vec![Event::SetMealType(MealType::Lunch)]).0;
        let (state, effects) = transition(state, Event::SubmitAnalysis);

        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::Analyze { generation, request } => {
                assert_eq!(*generation, state.generation);
                assert!(request.image.is_none());
                assert_eq!(request.meal_type, MealType::Lunch);
                assert_eq!(request.notes, "grilled chicken, rice");
            }
            other => panic!("unexpected effect: {:?}", other),
        }
        assert!(state.is_busy());
    }

    #[test]
    fn test_submit_with_image_and_blank_notes_is_valid() {
        let (state, _) = run(
            AppState::default(),
            vec![Event::OpenCamera, Event::Captured(image())],
        );
        let (_, effects) = transition(state, Event::SubmitAnalysis);
        assert!(matches!(&effects[0], Effect::Analyze { request, .. } if request.image == Some(image())));
    }

    #[test]
    fn test_second_submit_while_analyzing_is_ignored() {
        let (state, first) = transition(on_form("soup"), Event::SubmitAnalysis);
        let (state, second) = transition(state, Event::SubmitAnalysis);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert!(state.analyzing.is_some());
    }

    #[test]
    fn test_analysis_success_shows_result() {
        let state = on_result();
        assert_eq!(state.screen, Screen::Result);
        let shown = state.record.as_ref().unwrap();
        assert_eq!(shown.meal_name, "Grilled Chicken Bowl");
        assert_eq!(shown.calories, 450.0);
        assert!(!state.is_busy());
        assert!(state.can_log());
    }

    #[test]
    fn test_analysis_failure_stays_on_form_with_reason() {
        let (state, _) = transition(on_form("soup"), Event::SubmitAnalysis);
        let generation = state.generation;
        let (state, effects) = transition(
            state,
            Event::AnalysisFailed { generation, reason: "status 500: boom".to_string() },
        );
        assert!(effects.is_empty());
        assert_eq!(state.screen, Screen::Form);
        assert!(state.record.is_none());
        let error = state.error.unwrap();
        assert!(error.starts_with("Failed to analyze meal."));
        assert!(error.contains("500"));
    }

    #[test]
    fn test_stale_analysis_response_is_discarded() {
        let (state, _) = transition(on_form("soup"), Event::SubmitAnalysis);
        let stale = state.generation;
        let (state, _) = transition(state, Event::Reset);
        let (state, _) = transition(
            state,
            Event::AnalysisSucceeded { generation: stale, record: record("Soup", 120.0) },
        );
        assert_eq!(state.screen, Screen::Selector);
        assert!(state.record.is_none());
    }

    #[test]
    fn test_new_submission_clears_error_and_logged_flag() {
        let mut state = on_form("soup");
        state.error = Some("old".to_string());
        state.logged = true;
        let (state, _) = transition(state, Event::SubmitAnalysis);
        assert!(state.error.is_none());
        assert!(!state.logged);
    }

    #[test]
    fn test_log_without_record_reports_error() {
        let (state, effects) = transition(AppState::default(), Event::LogCurrent);
        assert!(effects.is_empty());
        assert_eq!(state.error.as_deref(), Some(MSG_MISSING_RECORD));
    }

    #[test]
    fn test_log_success_appends_history_and_sets_logged() {
        let (state, effects) = transition(on_result(), Event::LogCurrent);
        let (generation, logged_record) = match &effects[..] {
            [Effect::Log { generation, record, meal_type }] => {
                assert_eq!(*meal_type, MealType::Lunch);
                (*generation, record.stamp("uuid-1", "2026-10-17T12:00:00+09:00"))
            }
            other => panic!("unexpected effects: {:?}", other),
        };

        let (state, effects) = transition(
            state,
            Event::LogSucceeded { generation, record: logged_record.clone() },
        );
        assert_eq!(effects, vec![Effect::AppendHistory(logged_record.clone())]);
        assert_eq!(state.history, vec![logged_record]);
        assert!(state.logged);
        assert_eq!(state.toast.as_deref(), Some(MSG_LOGGED));
        assert_eq!(state.screen, Screen::Result);
        assert!(!state.can_log());
    }

    #[test]
    fn test_log_is_idempotent_once_logged() {
        let (state, effects) = transition(on_result(), Event::LogCurrent);
        let Effect::Log { generation, record, .. } = effects[0].clone() else {
            panic!("expected log effect");
        };
        let (state, _) = transition(
            state,
            Event::LogSucceeded { generation, record: record.stamp("id", "now") },
        );

        let (state, effects) = transition(state, Event::LogCurrent);
        assert!(effects.is_empty());
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn test_log_rapid_fire_sends_once() {
        let (state, first) = transition(on_result(), Event::LogCurrent);
        let (_, second) = transition(state, Event::LogCurrent);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn test_log_failure_allows_retry() {
        let (state, _) = transition(on_result(), Event::LogCurrent);
        let generation = state.generation;
        let (state, _) = transition(
            state,
            Event::LogFailed { generation, reason: "status 502".to_string() },
        );
        assert_eq!(state.error.as_deref(), Some(MSG_LOG_FAILED));
        assert!(!state.logged);
        assert!(state.history.is_empty());

        let (_, effects) = transition(state, Event::LogCurrent);
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_stale_log_success_still_reaches_history() {
        let (state, _) = transition(on_result(), Event::LogCurrent);
        let generation = state.generation;
        let (state, _) = transition(state, Event::Reset);
        let stamped = record("Grilled Chicken Bowl", 450.0).stamp("id", "now");
        let (state, effects) = transition(state, Event::LogSucceeded { generation, record: stamped });
        assert_eq!(effects.len(), 1);
        assert_eq!(state.history.len(), 1);
        assert!(!state.logged);
        assert!(state.toast.is_none());
    }

    #[test]
    fn test_leaving_capture_always_closes_camera() {
        let (state, effects) = transition(AppState::default(), Event::OpenCamera);
        assert_eq!(effects, vec![Effect::OpenCamera]);
        assert_eq!(state.screen, Screen::Capture);

        let (back, effects) = transition(state.clone(), Event::Back);
        assert_eq!(effects, vec![Effect::CloseCamera]);
        assert_eq!(back.screen, Screen::Selector);

        let (failed, effects) = transition(state.clone(), Event::CameraFailed("denied".into()));
        assert_eq!(effects, vec![Effect::CloseCamera]);
        assert_eq!(failed.screen, Screen::Selector);
        assert!(failed.error.unwrap().contains("denied"));

        let (captured, effects) = transition(state, Event::Captured(image()));
        assert_eq!(effects, vec![Effect::CloseCamera]);
        assert_eq!(captured.screen, Screen::Form);
        assert!(captured.image.is_some());
    }

    #[test]
    fn test_reopened_camera_supersedes_earlier_request() {
        let (first, _) = transition(AppState::default(), Event::OpenCamera);
        let first_generation = first.generation;
        assert!(first.awaits_camera(first_generation));

        let (reopened, effects) = run(first, vec![Event::Back, Event::OpenCamera]);
        assert_eq!(effects, vec![Effect::CloseCamera, Effect::OpenCamera]);
        assert_eq!(reopened.screen, Screen::Capture);
        assert!(!reopened.awaits_camera(first_generation));
        assert!(reopened.awaits_camera(reopened.generation));

        let (left, _) = transition(reopened, Event::Back);
        let left_generation = left.generation;
        assert!(!left.awaits_camera(left_generation));
    }

    #[test]
    fn test_upload_from_selector_goes_to_form_with_image() {
        let (state, effects) = transition(AppState::default(), Event::Captured(image()));
        assert!(effects.is_empty());
        assert_eq!(state.screen, Screen::Form);
        assert_eq!(state.image, Some(image()));
    }

    #[test]
    fn test_history_navigation() {
        let history = vec![record("a", 1.0).stamp("1", "t"), record("b", 2.0).stamp("2", "t")];
        let state = AppState::with_history(history);
        assert!(state.has_history());

        let (state, _) = run(state, vec![Event::OpenHistory, Event::SelectHistory(1)]);
        assert_eq!(state.screen, Screen::History { selected: Some(1) });
        assert_eq!(state.selected_history().unwrap().meal_name, "b");

        let (state, _) = transition(state, Event::SelectHistory(5));
        assert_eq!(state.screen, Screen::History { selected: Some(1) });

        let (state, _) = transition(state, Event::Back);
        assert_eq!(state.screen, Screen::History { selected: None });
        let (state, _) = transition(state, Event::Back);
        assert_eq!(state.screen, Screen::Selector);
    }

    #[test]
    fn test_reset_clears_form_and_error() {
        let mut state = on_result();
        state.error = Some("x".to_string());
        let (state, _) = transition(state, Event::Reset);
        assert_eq!(state.screen, Screen::Selector);
        assert!(state.record.is_none());
        assert!(state.notes.is_empty());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_error_and_toast_dismiss() {
        let mut state = AppState::default();
        state.error = Some("e".to_string());
        state.toast = Some("t".to_string());
        let (state, _) = run(state, vec![Event::DismissError, Event::DismissToast]);
        assert!(state.error.is_none());
        assert!(state.toast.is_none());
    }

    #[test]
    fn test_analysis_request_serialize() {
        let request = AnalysisRequest {
            image: None,
            meal_type: MealType::Lunch,
            notes: "grilled chicken, rice".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "imageDataUrl": null,
                "mealType": "Lunch",
                "notes": "grilled chicken, rice"
            })
        );
    }
}

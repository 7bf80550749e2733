//! 画面状態マシンのドライバ
//!
//! `transition` が返した副作用を順番に実行し、結果をイベントとして状態マシンへ戻す。
//! 並列実行はしない。同時実行の抑止は状態マシン側（解析中・記録中フラグ）で行う。

use crate::analyzer::{AnalysisBackend, WebhookBackend};
use crate::capture::{load_image_file, CaptureAdapter, CommandCamera};
use crate::config::Config;
use crate::error::{MealLogError, Result};
use crate::history::{FileSlot, HistoryStore, SlotStorage};
use crate::sheet::{LogSink, SheetWebhook, UnconfiguredSink};
use chrono::{DateTime, FixedOffset, Local};
use meal_log_common::{transition, AppState, Effect, Event, SheetRow};
use std::collections::VecDeque;
use std::path::Path;

/// 記録時刻の取得元
pub type Clock = Box<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

pub struct Controller<S: SlotStorage> {
    state: AppState,
    analyzer: Box<dyn AnalysisBackend>,
    sink: Box<dyn LogSink>,
    history: HistoryStore<S>,
    camera: CaptureAdapter,
    max_image_size: u32,
    clock: Clock,
}

impl Controller<FileSlot> {
    /// 設定から各クライアントを組み立てる
    ///
    /// 解析URLは必須。記録URLが無い場合は記録操作だけが失敗する。
    pub fn from_config(config: &Config) -> Result<Self> {
        let analyzer = WebhookBackend::new(config.analysis_url()?, config.timeout())?;
        let sink: Box<dyn LogSink> = match config.log_url() {
            Ok(url) => Box::new(SheetWebhook::new(url, config.timeout())?),
            Err(e) => {
                tracing::warn!(error = %e, "log endpoint not configured");
                Box::new(UnconfiguredSink)
            }
        };
        let history = HistoryStore::new(FileSlot::new(config.history_path()?));
        let camera = CommandCamera::new(
            config.camera_command.clone(),
            config.camera_command_args(),
            config.camera_device.clone(),
        );

        Ok(Self::new(
            Box::new(analyzer),
            sink,
            history,
            CaptureAdapter::new(Box::new(camera), config.max_image_size),
        )
        .with_max_image_size(config.max_image_size))
    }
}

impl<S: SlotStorage> Controller<S> {
    /// 起動時に履歴を読み込む
    pub fn new(
        analyzer: Box<dyn AnalysisBackend>,
        sink: Box<dyn LogSink>,
        history: HistoryStore<S>,
        camera: CaptureAdapter,
    ) -> Self {
        let state = AppState::with_history(history.load());
        tracing::debug!(entries = state.history.len(), "history loaded");
        Self {
            state,
            analyzer,
            sink,
            history,
            camera,
            max_image_size: 0,
            clock: Box::new(|| Local::now().fixed_offset()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_max_image_size(mut self, max_side: u32) -> Self {
        self.max_image_size = max_side;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn is_camera_active(&self) -> bool {
        self.camera.is_active()
    }

    /// イベントを処理し、派生したイベントがなくなるまで副作用を実行する
    pub async fn dispatch(&mut self, event: Event) -> &AppState {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let (next, effects) = transition(std::mem::take(&mut self.state), event);
            self.state = next;

            for effect in effects {
                if let Some(follow_up) = self.run_effect(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }

        &self.state
    }

    /// 撮影モード中の現在フレームを静止画として取り込む
    pub async fn take_photo(&mut self) -> &AppState {
        let event = match self.camera.snapshot().await {
            Ok(image) => Event::Captured(image),
            Err(e) => Event::CameraFailed(camera_reason(&e)),
        };
        self.dispatch(event).await
    }

    /// ファイル選択による代替取り込み
    pub async fn upload(&mut self, path: &Path) -> &AppState {
        let event = match load_image_file(path, self.max_image_size) {
            Ok(image) => Event::Captured(image),
            Err(e) => {
                tracing::warn!(error = %e, "upload failed");
                Event::UploadFailed(format!("Failed to read the uploaded image. {}", e))
            }
        };
        self.dispatch(event).await
    }

    async fn run_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::OpenCamera => match self.camera.open().await {
                Ok(()) => None,
                Err(e) => Some(Event::CameraFailed(camera_reason(&e))),
            },

            Effect::CloseCamera => {
                self.camera.close();
                None
            }

            Effect::Analyze { generation, request } => {
                match self.analyzer.analyze(&request).await {
                    Ok(record) => Some(Event::AnalysisSucceeded { generation, record }),
                    Err(e) => {
                        tracing::error!(error = %e, generation, "analysis failed");
                        Some(Event::AnalysisFailed { generation, reason: e.to_string() })
                    }
                }
            }

            Effect::Log { generation, record, meal_type } => {
                // シートの日時と履歴の記録日時は同じ瞬間を使う
                let logged_at = (self.clock)();
                let row = SheetRow::build(&record, meal_type, &logged_at);

                match self.sink.submit(&row).await {
                    Ok(()) => {
                        let id = uuid::Uuid::new_v4().to_string();
                        let stamped = record.stamp(id, logged_at.to_rfc3339());
                        Some(Event::LogSucceeded { generation, record: stamped })
                    }
                    Err(e) => {
                        tracing::error!(error = %e, generation, "logging failed");
                        Some(Event::LogFailed { generation, reason: e.to_string() })
                    }
                }
            }

            Effect::AppendHistory(record) => {
                let updated = self.history.append(record);
                Some(Event::HistoryLoaded(updated))
            }
        }
    }
}

/// カメラエラーを画面表示用の理由文にする
fn camera_reason(e: &MealLogError) -> String {
    match e {
        MealLogError::CameraAccess(reason) => reason.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CameraDevice;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use meal_log_common::{AnalysisRequest, NutritionRecord, Screen};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MemorySlot(Arc<Mutex<Option<String>>>);

    impl SlotStorage for MemorySlot {
        fn get(&self) -> Result<Option<String>> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn set(&mut self, value: &str) -> Result<()> {
            *self.0.lock().unwrap() = Some(value.to_string());
            Ok(())
        }
    }

    /// メモをそのまま料理名にして返す
    struct EchoBackend;

    #[async_trait]
    impl AnalysisBackend for EchoBackend {
        async fn analyze(&self, request: &AnalysisRequest) -> Result<NutritionRecord> {
            Ok(NutritionRecord {
                meal_name: request.notes.clone(),
                calories: 100.0,
                ..Default::default()
            })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<SheetRow>>>);

    #[async_trait]
    impl LogSink for RecordingSink {
        async fn submit(&self, row: &SheetRow) -> Result<()> {
            self.0.lock().unwrap().push(row.clone());
            Ok(())
        }
    }

    struct StillCamera {
        streaming: Arc<AtomicBool>,
    }

    #[async_trait]
    impl CameraDevice for StillCamera {
        async fn open(&mut self) -> Result<()> {
            self.streaming.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn grab_frame(&mut self) -> Result<Vec<u8>> {
            let img = DynamicImage::ImageRgb8(RgbImage::new(6, 4));
            let mut cursor = Cursor::new(Vec::new());
            img.write_to(&mut cursor, ImageFormat::Png)
                .map_err(|e| MealLogError::ImageLoad(e.to_string()))?;
            Ok(cursor.into_inner())
        }

        fn close(&mut self) {
            self.streaming.store(false, Ordering::SeqCst);
        }
    }

    struct Fixture {
        controller: Controller<MemorySlot>,
        slot: MemorySlot,
        sink: RecordingSink,
        streaming: Arc<AtomicBool>,
    }

    fn fixture() -> Fixture {
        let slot = MemorySlot::default();
        let sink = RecordingSink::default();
        let streaming = Arc::new(AtomicBool::new(false));
        let camera = StillCamera { streaming: streaming.clone() };

        let controller = Controller::new(
            Box::new(EchoBackend),
            Box::new(sink.clone()),
            HistoryStore::new(slot.clone()),
            CaptureAdapter::new(Box::new(camera), 0),
        )
        .with_clock(Box::new(|| {
            FixedOffset::east_opt(-5 * 3600)
                .unwrap()
                .with_ymd_and_hms(2026, 10, 17, 7, 45, 0)
                .unwrap()
        }));

        Fixture { controller, slot, sink, streaming }
    }

    #[tokio::test]
    async fn test_photo_capture_releases_camera() {
        let mut f = fixture();
        f.controller.dispatch(Event::OpenCamera).await;
        assert_eq!(f.controller.state().screen, Screen::Capture);
        assert!(f.controller.is_camera_active());
        assert!(f.streaming.load(Ordering::SeqCst));

        let state = f.controller.take_photo().await;
        assert_eq!(state.screen, Screen::Form);
        assert_eq!(state.image.as_ref().unwrap().mime_type(), "image/jpeg");
        assert!(!f.controller.is_camera_active());
        assert!(!f.streaming.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_back_from_capture_releases_camera() {
        let mut f = fixture();
        f.controller.dispatch(Event::OpenCamera).await;
        f.controller.dispatch(Event::Back).await;
        assert_eq!(f.controller.state().screen, Screen::Selector);
        assert!(!f.streaming.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_take_photo_without_camera_reports_error() {
        let mut f = fixture();
        let state = f.controller.take_photo().await;
        assert!(state.error.as_deref().unwrap().contains("No active camera stream"));
    }

    #[tokio::test]
    async fn test_log_uses_one_instant_for_row_and_record() {
        let mut f = fixture();
        f.controller.dispatch(Event::ChooseTextOnly).await;
        f.controller.dispatch(Event::SetMealType(meal_log_common::MealType::Breakfast)).await;
        f.controller.dispatch(Event::SetNotes("oatmeal".to_string())).await;
        f.controller.dispatch(Event::SubmitAnalysis).await;
        f.controller.dispatch(Event::LogCurrent).await;

        let rows = f.sink.0.lock().unwrap().clone();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "2026-10-17");
        assert_eq!(rows[0].time_of_day, "07:45");
        assert_eq!(rows[0].meal_name, "oatmeal");

        let logged = &f.controller.state().history[0];
        assert_eq!(logged.logged_date.as_deref(), Some("2026-10-17T07:45:00-05:00"));
        assert!(logged.id.as_deref().is_some_and(|id| id.len() == 36));

        let stored = f.slot.0.lock().unwrap().clone().unwrap();
        assert!(stored.contains("oatmeal"));
    }

    #[tokio::test]
    async fn test_startup_loads_saved_history() {
        let slot = MemorySlot::default();
        *slot.0.lock().unwrap() = Some(r#"[{"id":"1","loggedDate":"2026-10-16T12:00:00Z","mealName":"Ramen"}]"#.to_string());

        let controller = Controller::new(
            Box::new(EchoBackend),
            Box::new(RecordingSink::default()),
            HistoryStore::new(slot),
            CaptureAdapter::new(
                Box::new(StillCamera { streaming: Arc::new(AtomicBool::new(false)) }),
                0,
            ),
        );
        assert!(controller.state().has_history());
        assert_eq!(controller.state().history[0].meal_name, "Ramen");
    }
}

use crate::error::{MealLogError, Result};
use meal_log_common::HISTORY_KEY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ANALYSIS_URL_ENV: &str = "MEAL_LOG_ANALYSIS_URL";
pub const SHEET_URL_ENV: &str = "MEAL_LOG_SHEET_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 解析Webhook（サーバー側でモデルを呼ぶプロキシ）
    pub analysis_url: Option<String>,
    /// スプレッドシート記録Webhook
    pub log_url: Option<String>,
    pub timeout_seconds: u64,
    /// 送信前に縮小する長辺の上限（0で無効）
    pub max_image_size: u32,
    /// 1フレームをJPEGで標準出力に書き出すコマンド
    pub camera_command: String,
    pub camera_args: Vec<String>,
    pub camera_device: PathBuf,
    /// 履歴ファイル（省略時はデータディレクトリ）
    pub history_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis_url: None,
            log_url: None,
            timeout_seconds: 60,
            max_image_size: 1568,
            camera_command: "ffmpeg".into(),
            camera_args: [
                "-loglevel", "error", "-f", "v4l2", "-i", "{device}", "-frames:v", "1",
                "-f", "image2pipe", "-vcodec", "mjpeg", "-",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            camera_device: PathBuf::from("/dev/video0"),
            history_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| MealLogError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("meal-log").join("config.json"))
    }

    /// 解析WebhookのURL（環境変数を優先）
    pub fn analysis_url(&self) -> Result<String> {
        resolve_url(ANALYSIS_URL_ENV, self.analysis_url.as_deref())
            .ok_or(MealLogError::MissingEndpoint("解析Webhook", "analysis"))
    }

    /// 記録WebhookのURL（環境変数を優先）
    pub fn log_url(&self) -> Result<String> {
        resolve_url(SHEET_URL_ENV, self.log_url.as_deref())
            .ok_or(MealLogError::MissingEndpoint("記録Webhook", "log"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    pub fn history_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.history_path {
            return Ok(path.clone());
        }
        let data = dirs::data_dir()
            .ok_or_else(|| MealLogError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data.join("meal-log").join(format!("{}.json", HISTORY_KEY)))
    }

    /// `{device}` を置換したカメラコマンド引数
    pub fn camera_command_args(&self) -> Vec<String> {
        let device = self.camera_device.display().to_string();
        self.camera_args
            .iter()
            .map(|arg| arg.replace("{device}", &device))
            .collect()
    }
}

fn resolve_url(env_key: &str, configured: Option<&str>) -> Option<String> {
    std::env::var(env_key)
        .ok()
        .or_else(|| configured.map(str::to_string))
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MealLogError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("{0}のURLが設定されていません。`meal-log config --set-{1}-url URL` で設定してください")]
    MissingEndpoint(&'static str, &'static str),

    #[error("Camera API not available: {0}")]
    CameraUnavailable(String),

    #[error("Could not access the camera: {0}")]
    CameraAccess(String),

    #[error("No active camera stream")]
    NoActiveStream,

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Analysis webhook failed with status {status}: {body}")]
    AnalysisStatus { status: u16, body: String },

    #[error("Webhook failed with status {status}: {body}")]
    LogStatus { status: u16, body: String },

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl MealLogError {
    /// 応答本文の抜粋（エラーメッセージ用）
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
}

impl From<reqwest::Error> for MealLogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MealLogError::Transport(format!("request timed out: {}", e))
        } else if e.is_decode() {
            MealLogError::ApiParse(e.to_string())
        } else {
            MealLogError::Transport(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, MealLogError>;

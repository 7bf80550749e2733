//! カメラ/ファイルからの画像取り込み
//!
//! どちらの経路でも JPEG（品質90）の Data URL に揃えるので、後段は取り込み元を意識しない。

mod command;
mod file;

pub use command::CommandCamera;
pub use file::load_image_file;

use crate::error::{MealLogError, Result};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use meal_log_common::DataUrl;

/// スナップショットのJPEG品質
pub const JPEG_QUALITY: u8 = 90;

/// カメラデバイス
#[async_trait]
pub trait CameraDevice: Send {
    /// ストリームを取得する。API自体が無ければ `CameraUnavailable`、
    /// 権限・ハードウェアの問題なら `CameraAccess`
    async fn open(&mut self) -> Result<()>;

    /// 現在のフレームを生のエンコード済みバイト列で返す
    async fn grab_frame(&mut self) -> Result<Vec<u8>>;

    /// 取得したトラックをすべて解放する（冪等）
    fn close(&mut self);
}

/// 撮影モード中のカメラを排他的に保持する
///
/// 戻る・撮影成功・破棄のどの経路でも `close` される。
pub struct CaptureAdapter {
    device: Box<dyn CameraDevice>,
    active: bool,
    max_side: u32,
}

impl CaptureAdapter {
    pub fn new(device: Box<dyn CameraDevice>, max_side: u32) -> Self {
        Self {
            device,
            active: false,
            max_side,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub async fn open(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        match self.device.open().await {
            Ok(()) => {
                self.active = true;
                tracing::debug!("camera stream opened");
                Ok(())
            }
            Err(e) => {
                // 途中まで取得したものも解放する
                self.device.close();
                tracing::warn!(error = %e, "camera open failed");
                Err(e)
            }
        }
    }

    /// 現在のフレームを静止画にする
    pub async fn snapshot(&mut self) -> Result<DataUrl> {
        if !self.active {
            return Err(MealLogError::NoActiveStream);
        }
        let frame = self.device.grab_frame().await?;
        encode_image_bytes(&frame, self.max_side)
    }

    pub fn close(&mut self) {
        if self.active {
            self.device.close();
            self.active = false;
            tracing::debug!("camera stream released");
        }
    }
}

impl Drop for CaptureAdapter {
    fn drop(&mut self) {
        self.close();
    }
}

/// 任意形式の画像バイト列をデコードし、JPEG Data URLへ変換
pub fn encode_image_bytes(bytes: &[u8], max_side: u32) -> Result<DataUrl> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| MealLogError::ImageLoad(format!("デコード失敗: {}", e)))?;
    encode_jpeg(img, max_side)
}

pub(crate) fn encode_jpeg(img: DynamicImage, max_side: u32) -> Result<DataUrl> {
    let img = if max_side > 0 && (img.width() > max_side || img.height() > max_side) {
        img.resize(max_side, max_side, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| MealLogError::ImageLoad(format!("JPEGエンコード失敗: {}", e)))?;

    Ok(DataUrl::from_bytes("image/jpeg", &buf))
}

//! ファイルからの画像取り込み（カメラの代替経路）

use super::encode_jpeg;
use crate::error::{MealLogError, Result};
use image::ImageReader;
use meal_log_common::DataUrl;
use std::path::Path;

/// ローカル画像を読み込み、カメラのスナップショットと同じ形式で返す
pub fn load_image_file(path: &Path, max_side: u32) -> Result<DataUrl> {
    if !path.is_file() {
        return Err(MealLogError::ImageLoad(format!(
            "ファイルが見つかりません: {}",
            path.display()
        )));
    }

    let img = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| MealLogError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), width = img.width(), height = img.height(), "image file loaded");
    encode_jpeg(img, max_side)
}

//! 画像の埋め込み表現（Data URL）
//!
//! カメラのスナップショットとアップロード画像はどちらも
//! `data:<mime>;base64,<payload>` 形式に揃えてから解析サービスへ送る。

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data URLからBase64データ部分を抽出
///
/// # Arguments
/// * `data_url` - "data:image/jpeg;base64,/9j/4AAQ..." 形式のData URL
///
/// # Returns
/// Base64エンコードされたデータ部分、または抽出失敗時はNone
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split(',').nth(1)
}

/// Data URLからMIMEタイプを抽出
///
/// 抽出失敗時は"image/jpeg"をデフォルトとして返す
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .split(':')
        .nth(1)
        .and_then(|s| s.split(';').next())
        .unwrap_or("image/jpeg")
}

/// 自己記述的な画像データ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataUrl {
    mime_type: String,
    payload: String,
}

impl DataUrl {
    /// 生バイト列からData URLを作る
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            payload: STANDARD.encode(bytes),
        }
    }

    /// 文字列のData URLを検証して取り込む
    pub fn parse(data_url: &str) -> Result<Self> {
        if !data_url.starts_with("data:") {
            return Err(Error::InvalidDataUrl("missing data: prefix".into()));
        }
        let header = data_url.split(',').next().unwrap_or_default();
        if !header.ends_with(";base64") {
            return Err(Error::InvalidDataUrl("only base64 payloads are supported".into()));
        }
        let payload = extract_base64_from_data_url(data_url)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::InvalidDataUrl("empty payload".into()))?;

        Ok(Self {
            mime_type: extract_mime_type_from_data_url(data_url).to_string(),
            payload: payload.to_string(),
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Base64部分をデコード
    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.payload)
            .map_err(|e| Error::InvalidDataUrl(e.to_string()))
    }

    /// デコード後のおおよそのバイト数
    pub fn approx_len(&self) -> usize {
        self.payload.len() / 4 * 3
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload)
    }
}

impl From<DataUrl> for String {
    fn from(value: DataUrl) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for DataUrl {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        DataUrl::parse(&value)
    }
}

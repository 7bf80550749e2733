//! 記録履歴の永続化
//!
//! 1つの名前付きスロットにJSON配列を丸ごと書く。読み込み失敗は空リストとして扱い、
//! 書き込み失敗は記録成功を妨げない（リモート記録が成否の基準）。

use crate::error::Result;
use meal_log_common::{parse_history, prepend, serialize_history, HistoryList, NutritionRecord};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// 文字列1つを保持する保存領域
pub trait SlotStorage: Send {
    /// 未保存なら `Ok(None)`
    fn get(&self) -> Result<Option<String>>;
    fn set(&mut self, value: &str) -> Result<()>;
}

/// ファイル1つをスロットとして使う
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SlotStorage for FileSlot {
    fn get(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn set(&mut self, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // 書きかけのファイルを残さないよう一時ファイル経由で置き換える
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// 記録履歴ストア
pub struct HistoryStore<S: SlotStorage> {
    slot: S,
}

impl<S: SlotStorage> HistoryStore<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    /// 保存済み履歴を読み込む。失敗・破損時は空リスト
    pub fn load(&self) -> HistoryList {
        match self.slot.get() {
            Ok(raw) => {
                let history = parse_history(raw.as_deref());
                if history.is_empty() && raw.as_deref().is_some_and(|s| !s.trim().is_empty()) {
                    tracing::warn!("stored history was empty or unreadable; starting fresh");
                }
                history
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read history");
                Vec::new()
            }
        }
    }

    /// 先頭に追加して保存する。保存に失敗しても更新後のリストを返す
    pub fn append(&mut self, record: NutritionRecord) -> HistoryList {
        let updated = prepend(&self.load(), record);

        let persisted = serialize_history(&updated)
            .map_err(Into::into)
            .and_then(|raw| self.slot.set(&raw));
        if let Err(e) = persisted {
            tracing::error!(error = %e, "failed to save history");
        }

        updated
    }
}

//! 外部コマンドでのフレーム取得（CLI用カメラ）
//!
//! 既定は `ffmpeg -f v4l2 -i /dev/video0 -frames:v 1 -f image2pipe -vcodec mjpeg -`。
//! 1回の撮影ごとにコマンドを実行し、標準出力の画像を受け取る。

use super::CameraDevice;
use crate::error::{MealLogError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub struct CommandCamera {
    program: String,
    args: Vec<String>,
    device: PathBuf,
    opened: bool,
}

impl CommandCamera {
    pub fn new(program: impl Into<String>, args: Vec<String>, device: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            device: device.into(),
            opened: false,
        }
    }
}

#[async_trait]
impl CameraDevice for CommandCamera {
    async fn open(&mut self) -> Result<()> {
        if find_program(&self.program).is_none() {
            return Err(MealLogError::CameraUnavailable(format!(
                "capture command `{}` not found",
                self.program
            )));
        }
        if !self.device.exists() {
            return Err(MealLogError::CameraAccess(format!(
                "camera device {} not found",
                self.device.display()
            )));
        }
        if std::fs::File::open(&self.device).is_err() {
            return Err(MealLogError::CameraAccess(format!(
                "permission denied for {}",
                self.device.display()
            )));
        }

        self.opened = true;
        Ok(())
    }

    async fn grab_frame(&mut self) -> Result<Vec<u8>> {
        if !self.opened {
            return Err(MealLogError::NoActiveStream);
        }

        tracing::debug!(program = %self.program, args = ?self.args, "grabbing camera frame");
        let output = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| MealLogError::CameraAccess(format!("{}実行エラー: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MealLogError::CameraAccess(format!(
                "{} failed (code {:?}): {}",
                self.program,
                output.status.code(),
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(MealLogError::CameraAccess("empty frame".into()));
        }

        Ok(output.stdout)
    }

    fn close(&mut self) {
        self.opened = false;
    }
}

/// PATHからプログラムを探す（パス指定ならその存在だけ確認）
fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}

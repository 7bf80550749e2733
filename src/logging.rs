//! ログ出力の初期化
//!
//! `RUST_LOG` が無ければ既定フィルタを使う。`LOG_FORMAT=json` でJSON行出力。
//! 対話画面を崩さないよう出力先は標準エラー。

use tracing_subscriber::EnvFilter;

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// 既定のフィルタ文字列
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "meal_log=debug,meal_log_common=debug"
    } else {
        "meal_log=info"
    }
}

pub fn init(verbose: bool) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter(verbose).to_string());
    let json_logs = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v == "json")
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_writer(std::io::stderr);

    // 二重初期化（テスト等）は無視する
    let _ = if json_logs {
        builder.with_target(false).json().try_init()
    } else {
        builder.try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_raises_level() {
        assert!(default_filter(true).contains("debug"));
        assert_eq!(default_filter(false), "meal_log=info");
    }
}

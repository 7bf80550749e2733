use clap::{Parser, Subcommand};
use meal_log_common::MealType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "meal-log")]
#[command(about = "食事写真・メモから栄養を推定してスプレッドシートに記録するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 対話モード（撮影・アップロード・テキスト入力・履歴）
    Session,

    /// 1回分を解析（必要なら記録まで）
    Analyze {
        /// 画像ファイル
        #[arg(short, long, conflicts_with = "camera")]
        image: Option<PathBuf>,

        /// カメラで1枚撮影して使う
        #[arg(short, long)]
        camera: bool,

        /// 食事区分 (breakfast/lunch/dinner/snack)
        #[arg(short, long, default_value = "lunch")]
        meal_type: MealType,

        /// メモ（料理名・量・材料など）
        #[arg(short, long, default_value = "")]
        notes: String,

        /// 解析後にスプレッドシートへ記録
        #[arg(long)]
        log: bool,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 記録履歴を表示
    History {
        /// 表示件数
        #[arg(short, long)]
        limit: Option<usize>,

        /// JSONで出力
        #[arg(long)]
        json: bool,

        /// 指定番号（1始まり）の詳細を表示
        #[arg(long)]
        show: Option<usize>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 解析WebhookのURLを設定
        #[arg(long)]
        set_analysis_url: Option<String>,

        /// 記録WebhookのURLを設定
        #[arg(long)]
        set_log_url: Option<String>,

        /// タイムアウト秒数を設定
        #[arg(long)]
        set_timeout: Option<u64>,
    },
}

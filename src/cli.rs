use car_damage_common::{ExportFormat, Variant};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "car-damage")]
#[command(about = "車両傷記録・図面出力ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 台帳ファイル（設定より優先）
    #[arg(long, global = true)]
    pub ledger: Option<PathBuf>,

    /// 画面バリアント (standard/photo-required/compact)（設定より優先）
    #[arg(long, global = true)]
    pub variant: Option<Variant>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 号車の一覧を表示
    Cars,

    /// 図上のクリック位置に傷記録を追加
    Place {
        /// 号車
        #[arg(short, long, default_value = "1号車")]
        car: String,

        /// クリック位置X（px）
        #[arg(short, long, allow_negative_numbers = true)]
        x: f64,

        /// クリック位置Y（px）
        #[arg(short, long, allow_negative_numbers = true)]
        y: f64,

        /// 図の表示幅（px）
        #[arg(long)]
        width: f64,

        /// 図の表示高さ（px）
        #[arg(long)]
        height: f64,

        /// 図の左端（px）
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        left: f64,

        /// 図の上端（px）
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        top: f64,

        /// メモ
        #[arg(short, long, default_value = "")]
        note: String,

        /// 添付する写真
        #[arg(short, long)]
        photo: Option<PathBuf>,

        /// 通知・送信をせずキューに残す
        #[arg(long)]
        no_dispatch: bool,
    },

    /// 傷記録を一覧表示
    List {
        /// 号車（省略時は全号車）
        #[arg(short, long)]
        car: Option<String>,
    },

    /// 1件の傷記録を表示（ポップアップ相当）
    Show {
        /// 号車
        #[arg(short, long, default_value = "1号車")]
        car: String,

        /// 記録番号（0始まり）
        #[arg(short, long)]
        index: usize,
    },

    /// マーカー付きの図を PNG / PDF で出力
    Export {
        /// 号車
        #[arg(short, long, default_value = "1号車")]
        car: String,

        /// 車両図の画像
        #[arg(short, long)]
        diagram: PathBuf,

        /// 出力形式 (png/pdf)
        #[arg(short, long, default_value = "pdf")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 送信待ちの通知・スプレッドシート送信を実行
    Dispatch,

    /// 設定を表示/編集
    Config {
        /// 記録者名を設定
        #[arg(long)]
        set_uploader: Option<String>,

        /// Slack Webhook URLを設定（空文字で解除）
        #[arg(long)]
        set_webhook: Option<String>,

        /// 画面バリアントを設定
        #[arg(long)]
        set_variant: Option<Variant>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

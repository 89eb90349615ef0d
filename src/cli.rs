use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "field-matcher")]
#[command(about = "求人票・履歴書フィールドと本文テキストの照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（省略時は ~/.config/field-matcher/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// ルールプリセット (job/resume)
    #[arg(long, global = true)]
    pub preset: Option<String>,

    /// カスタムルールファイル（JSON、プリセットを上書き）
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// 結果のキーを表示ラベルに変換
    #[arg(long, global = true)]
    pub translate_keys: bool,

    /// 「至今」を置き換える日付 YYYY-MM-DD（省略時は実行日）
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 1件のレコードを本文と照合
    Check {
        /// レコードJSONファイル
        #[arg(short, long, required = true)]
        record: PathBuf,

        /// 本文テキストファイル
        #[arg(short, long, required = true)]
        document: PathBuf,
    },

    /// ジョブファイル（JSON配列 / JSON Lines）を一括照合
    Batch {
        /// 入力ジョブファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ワーカー数
        #[arg(short, long)]
        threads: Option<usize>,

        /// 進捗バーを表示しない
        #[arg(long)]
        no_progress: bool,
    },

    /// フォルダ内の <名前>.json と <名前>.txt の組を一括照合
    Scan {
        /// 対象フォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ワーカー数
        #[arg(short, long)]
        threads: Option<usize>,

        /// 進捗バーを表示しない
        #[arg(long)]
        no_progress: bool,
    },

    /// 設定を表示/初期化
    Config {
        /// 合成後のルールを含めて表示
        #[arg(long)]
        show: bool,

        /// デフォルト設定を書き出す
        #[arg(long)]
        init: bool,
    },
}

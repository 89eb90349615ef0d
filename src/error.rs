use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldMatcherError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("入力データが不正: {0}")]
    InvalidInput(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("照合エラー: {0}")]
    Common(#[from] field_matcher_common::Error),

    #[error("スレッドプール作成エラー: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, FieldMatcherError>;

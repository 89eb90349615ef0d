//! エラーケーステスト
//!
//! 入力の境界でのエラーハンドリングを検証

use field_matcher::common::{self, Record};
use field_matcher::error::FieldMatcherError;
use field_matcher::scanner;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダを走査した場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result, Err(FieldMatcherError::FolderNotFound(_))));
}

/// 空のフォルダはエラーではなく空のVec
#[test]
fn test_scan_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::scan_folder(dir.path());
    assert!(result.unwrap().is_empty());
}

/// 壊れたレコードJSONは境界でエラー
#[test]
fn test_scan_folder_invalid_record() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
    std::fs::write(dir.path().join("bad.txt"), "本文").unwrap();

    let result = scanner::scan_folder(dir.path());
    assert!(matches!(result, Err(FieldMatcherError::InvalidInput(_))));
}

/// ジョブファイルが壊れている場合
#[test]
fn test_load_jobs_invalid_array() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("jobs.json");
    std::fs::write(&path, "[{\"record\": {}},").unwrap();

    let result = scanner::load_jobs(&path);
    assert!(matches!(result, Err(FieldMatcherError::JsonParse(_))));
}

/// レコードがオブジェクトでない場合は共通エラーに変換される
#[test]
fn test_record_error_conversion() {
    let err: FieldMatcherError = Record::from_json_str("\"text\"").unwrap_err().into();
    assert!(matches!(err, FieldMatcherError::Common(common::Error::InvalidRecord(_))));
    assert!(format!("{}", err).contains("照合エラー"));
}

/// FieldMatcherErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        FieldMatcherError::Config("テスト設定エラー".to_string()),
        FieldMatcherError::FileNotFound("record.json".to_string()),
        FieldMatcherError::FolderNotFound("/path/to/folder".to_string()),
        FieldMatcherError::InvalidInput("3行目".to_string()),
        FieldMatcherError::ThreadPool("失敗".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// エラーのDebug実装確認
#[test]
fn test_error_debug() {
    let err = FieldMatcherError::Config("テスト".to_string());
    let debug = format!("{:?}", err);
    assert!(debug.contains("Config"));
    assert!(debug.contains("テスト"));
}

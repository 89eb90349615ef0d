//! 照合ジョブの読み込み
//!
//! - ジョブファイル: `MatchJob` のJSON配列、またはJSON Lines
//! - フォルダ: `<名前>.json`（レコード）と `<名前>.txt` / `<名前>.md`（本文）の組

use crate::error::{FieldMatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// 1件の照合ジョブ
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchJob {
    #[serde(default)]
    pub id: String,
    /// レコード（JSONオブジェクトであること。検証は照合時）
    pub record: serde_json::Value,
    #[serde(default)]
    pub document: String,
}

const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "md"];

/// ジョブファイルを読み込む
///
/// 先頭が `[` ならJSON配列、それ以外は1行1ジョブとして読む。
/// `id` が空のジョブには1始まりの連番を振る。
pub fn load_jobs(path: &Path) -> Result<Vec<MatchJob>> {
    if !path.exists() {
        return Err(FieldMatcherError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let mut jobs = parse_jobs(&content)?;

    for (index, job) in jobs.iter_mut().enumerate() {
        if job.id.is_empty() {
            job.id = (index + 1).to_string();
        }
    }

    debug!("{}件のジョブを読み込み: {}", jobs.len(), path.display());
    Ok(jobs)
}

fn parse_jobs(content: &str) -> Result<Vec<MatchJob>> {
    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(content)?);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| {
                FieldMatcherError::InvalidInput(format!("{}行目: {}", index + 1, e))
            })
        })
        .collect()
}

/// フォルダ直下のレコードと本文の組をジョブにする
///
/// 本文が無いレコードは警告してスキップする。結果はID順。
pub fn scan_folder(folder: &Path) -> Result<Vec<MatchJob>> {
    if !folder.is_dir() {
        return Err(FieldMatcherError::FolderNotFound(folder.display().to_string()));
    }

    let mut jobs = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };

        let Some(document_path) = find_document(path) else {
            warn!("本文ファイルがないためスキップ: {}", path.display());
            continue;
        };

        let content = std::fs::read_to_string(path)?;
        let record: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            FieldMatcherError::InvalidInput(format!("{}: {}", path.display(), e))
        })?;
        let document = std::fs::read_to_string(&document_path)?;

        jobs.push(MatchJob {
            id: stem,
            record,
            document,
        });
    }

    // IDでソート
    jobs.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(jobs)
}

fn find_document(record_path: &Path) -> Option<std::path::PathBuf> {
    DOCUMENT_EXTENSIONS
        .iter()
        .map(|ext| record_path.with_extension(ext))
        .find(|candidate| candidate.is_file())
}

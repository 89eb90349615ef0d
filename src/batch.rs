//! バッチ照合
//!
//! 各ジョブは独立しているので rayon でそのまま並列化する。
//! キャンセルフラグが立った後のジョブは照合せず `cancelled` として返す
//! （実行中の照合は最後まで走る）。

use crate::error::{FieldMatcherError, Result};
use crate::scanner::MatchJob;
use field_matcher_common::{translate_keys, FieldMatcher, MatchResult, Record};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// バッチオプション
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// ワーカー数（未指定ならrayonのグローバルプール）
    pub threads: Option<usize>,
    /// 進捗バーを表示する
    pub progress: bool,
    /// 結果のキーを表示ラベルに変換する
    pub translate_keys: bool,
}

/// ジョブの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    /// 全フィールド一致
    Matched,
    /// 未一致フィールドあり
    Unmatched,
    /// レコードが不正
    Error,
    /// キャンセルにより未実行
    Cancelled,
}

/// ジョブごとの結果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutcome {
    pub id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmatched: Option<MatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub errors: usize,
    pub cancelled: usize,
}

/// バッチ結果（ジョブは入力順）
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub stats: BatchStats,
    pub outcomes: Vec<JobOutcome>,
}

/// 1件のジョブを照合する
///
/// レコードがJSONオブジェクトでなければエラー結果を返す（バッチは止めない）。
pub fn run_job(
    matcher: &FieldMatcher,
    job: &MatchJob,
    labels: Option<&HashMap<String, String>>,
) -> JobOutcome {
    let record = match Record::from_json_value(&job.record) {
        Ok(record) => record,
        Err(e) => {
            warn!("ジョブ {} のレコードが不正: {}", job.id, e);
            return JobOutcome {
                id: job.id.clone(),
                status: JobStatus::Error,
                unmatched: None,
                error: Some(e.to_string()),
            };
        }
    };

    let mut result = matcher.match_text(&record, &job.document);
    if let Some(labels) = labels {
        result = translate_keys(&result, labels);
    }

    let status = if result.is_empty() {
        JobStatus::Matched
    } else {
        JobStatus::Unmatched
    };

    JobOutcome {
        id: job.id.clone(),
        status,
        unmatched: Some(result),
        error: None,
    }
}

/// 中断済みのジョブも進捗に数える
fn dispatch(
    matcher: &FieldMatcher,
    jobs: &[MatchJob],
    labels: Option<&HashMap<String, String>>,
    cancel: &AtomicBool,
    progress: &ProgressBar,
) -> Vec<JobOutcome> {
    jobs.par_iter()
        .map(|job| {
            let outcome = if cancel.load(Ordering::Relaxed) {
                JobOutcome {
                    id: job.id.clone(),
                    status: JobStatus::Cancelled,
                    unmatched: None,
                    error: None,
                }
            } else {
                run_job(matcher, job, labels)
            };
            progress.inc(1);
            outcome
        })
        .collect()
}

/// ジョブを並列に照合する
///
/// # Arguments
/// * `matcher` - 照合器（全ワーカーで共有）
/// * `jobs` - ジョブ
/// * `options` - バッチオプション
/// * `cancel` - 立てると以降のジョブを投入しない
pub fn run_batch(
    matcher: &FieldMatcher,
    jobs: &[MatchJob],
    options: &BatchOptions,
    cancel: &AtomicBool,
) -> Result<BatchReport> {
    let progress = if options.progress {
        let bar = ProgressBar::new(jobs.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        bar
    } else {
        ProgressBar::hidden()
    };

    let labels = options.translate_keys.then(|| &matcher.rules().key_labels);

    let run = || dispatch(matcher, jobs, labels, cancel, &progress);

    let outcomes = match options.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| FieldMatcherError::ThreadPool(e.to_string()))?
            .install(run),
        None => run(),
    };
    progress.finish_and_clear();

    let stats = summarize(&outcomes);
    info!(
        "バッチ完了: {}件（一致 {} / 未一致 {} / エラー {} / キャンセル {}）",
        stats.total, stats.matched, stats.unmatched, stats.errors, stats.cancelled
    );

    Ok(BatchReport { stats, outcomes })
}

fn summarize(outcomes: &[JobOutcome]) -> BatchStats {
    let mut stats = BatchStats {
        total: outcomes.len(),
        ..Default::default()
    };

    for outcome in outcomes {
        match outcome.status {
            JobStatus::Matched => stats.matched += 1,
            JobStatus::Unmatched => stats.unmatched += 1,
            JobStatus::Error => stats.errors += 1,
            JobStatus::Cancelled => stats.cancelled += 1,
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(id: &str, record: serde_json::Value, document: &str) -> MatchJob {
        MatchJob {
            id: id.into(),
            record,
            document: document.into(),
        }
    }

    #[test]
    fn test_run_job_status() {
        let matcher = FieldMatcher::default();
        let ok = run_job(&matcher, &job("1", json!({"title": "前端"}), "前端开发"), None);
        assert_eq!(ok.status, JobStatus::Matched);

        let gap = run_job(&matcher, &job("2", json!({"title": "后端"}), "前端开发"), None);
        assert_eq!(gap.status, JobStatus::Unmatched);
        assert!(gap.unmatched.unwrap().contains("title"));

        let bad = run_job(&matcher, &job("3", json!("not an object"), ""), None);
        assert_eq!(bad.status, JobStatus::Error);
        assert!(bad.error.is_some());
    }

    #[test]
    fn test_run_job_translates_keys() {
        let matcher = FieldMatcher::default();
        let labels = &matcher.rules().key_labels;
        let outcome = run_job(&matcher, &job("1", json!({"salary": "5000-5000"}), "6000"), Some(labels));
        assert!(outcome.unmatched.unwrap().contains("薪资"));
    }

    #[test]
    fn test_dispatch_counts_cancelled_progress() {
        let matcher = FieldMatcher::default();
        let jobs: Vec<MatchJob> = (0..5).map(|i| job(&i.to_string(), json!({"title": "前端"}), "")).collect();
        let cancel = AtomicBool::new(true);
        let progress = ProgressBar::hidden();
        progress.set_length(jobs.len() as u64);

        let outcomes = dispatch(&matcher, &jobs, None, &cancel, &progress);
        assert!(outcomes.iter().all(|o| o.status == JobStatus::Cancelled));
        assert_eq!(progress.position(), 5);
    }

    #[test]
    fn test_summarize() {
        let outcomes = vec![
            JobOutcome { id: "1".into(), status: JobStatus::Matched, unmatched: None, error: None },
            JobOutcome { id: "2".into(), status: JobStatus::Error, unmatched: None, error: None },
            JobOutcome { id: "3".into(), status: JobStatus::Matched, unmatched: None, error: None },
        ];
        let stats = summarize(&outcomes);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_outcome_serialize_skips_empty() {
        let outcome = JobOutcome {
            id: "1".into(),
            status: JobStatus::Cancelled,
            unmatched: None,
            error: None,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"id":"1","status":"cancelled"}"#);
    }
}

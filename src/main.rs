use chrono::NaiveDate;
use clap::Parser;
use field_matcher::batch::{self, BatchOptions, BatchReport};
use field_matcher::common::{translate_keys, FieldMatcher, MatchRules, Record};
use field_matcher::{cli, config, error, scanner};
use cli::{Cli, Commands};
use config::Config;
use error::{FieldMatcherError, Result};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 標準出力はJSON結果用なのでログは標準エラーへ
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(preset) = &cli.preset {
        config.preset = Some(preset.clone());
    }
    if let Some(rules_path) = &cli.rules {
        if !rules_path.exists() {
            return Err(FieldMatcherError::FileNotFound(rules_path.display().to_string()));
        }
        config.rules.merge(&MatchRules::from_file(rules_path)?);
    }
    if cli.translate_keys {
        config.translate_keys = true;
    }

    match cli.command {
        Commands::Check { record, document } => {
            let matcher = build_matcher(&config, cli.today)?;

            let record = Record::from_json_str(&read_input(&record)?)?;
            let document = read_input(&document)?;

            let mut result = matcher.match_text(&record, &document);
            if config.translate_keys {
                result = translate_keys(&result, &matcher.rules().key_labels);
            }

            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Batch { input, output, threads, no_progress } => {
            let jobs = scanner::load_jobs(&input)?;
            info!("{}件のジョブを照合します", jobs.len());

            let report = run(&config, cli.today, &jobs, threads, no_progress)?;
            write_report(&report, output.as_deref())?;
        }

        Commands::Scan { folder, output, threads, no_progress } => {
            let jobs = scanner::scan_folder(&folder)?;
            info!("{}組のレコード/本文を検出", jobs.len());

            let report = run(&config, cli.today, &jobs, threads, no_progress)?;
            write_report(&report, output.as_deref())?;
        }

        Commands::Config { show, init } => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::config_path()?,
            };

            if init {
                Config::default().save_to(&path)?;
                println!("✔ 設定ファイルを書き出しました: {}", path.display());
            }

            if show || !init {
                println!("設定: {}", path.display());
                println!("  プリセット: {}", config.preset.as_deref().unwrap_or("(なし)"));
                println!(
                    "  ワーカー数: {}",
                    config.threads.map_or("自動".to_string(), |n| n.to_string())
                );
                println!("  キー変換: {}", if config.translate_keys { "有効" } else { "無効" });
                println!("  ルール:");
                println!("{}", serde_json::to_string_pretty(&config.build_rules()?)?);
            }
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(FieldMatcherError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// `today` 指定時は日付を固定し、実行日によらず同じ結果にする
fn build_matcher(config: &Config, today: Option<NaiveDate>) -> Result<FieldMatcher> {
    let rules = config.build_rules()?;
    Ok(match today {
        Some(today) => FieldMatcher::with_today(rules, today),
        None => FieldMatcher::new(rules),
    })
}

fn run(
    config: &Config,
    today: Option<NaiveDate>,
    jobs: &[scanner::MatchJob],
    threads: Option<usize>,
    no_progress: bool,
) -> Result<BatchReport> {
    let matcher = build_matcher(config, today)?;
    let options = BatchOptions {
        threads: threads.or(config.threads),
        progress: config.progress && !no_progress,
        translate_keys: config.translate_keys,
    };

    let cancel = AtomicBool::new(false);
    batch::run_batch(&matcher, jobs, &options, &cancel)
}

fn write_report(report: &BatchReport, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            eprintln!(
                "✔ {}件中 未一致 {}件 / エラー {}件: {}",
                report.stats.total,
                report.stats.unmatched,
                report.stats.errors,
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

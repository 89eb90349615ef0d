use crate::error::{FieldMatcherError, Result};
use field_matcher_common::MatchRules;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 設定ファイルの場所を上書きする環境変数
pub const CONFIG_ENV: &str = "FIELD_MATCHER_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// 組み込みプリセット（job / resume）
    pub preset: Option<String>,
    /// プリセットに上書きする照合ルール
    pub rules: MatchRules,
    /// バッチのワーカー数（未指定ならCPU数）
    pub threads: Option<usize>,
    /// 結果のキーを表示ラベルに変換する
    pub translate_keys: bool,
    /// 進捗バーを表示する
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// 指定パスから読み込み（存在しなければデフォルト）
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            tracing::debug!("設定ファイルなし、デフォルトを使用: {}", config_path.display());
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        // 環境変数を優先
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| FieldMatcherError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("field-matcher").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            preset: Some("job".into()),
            rules: MatchRules::default(),
            threads: None,
            translate_keys: false,
            progress: true,
        }
    }

    /// プリセットとカスタムルールを合成して検証済みのルールを返す
    pub fn build_rules(&self) -> Result<MatchRules> {
        let mut rules = match self.preset.as_deref() {
            Some(name) => MatchRules::from_preset(name).ok_or_else(|| {
                FieldMatcherError::Config(format!("不明なプリセット '{}' (job/resume)", name))
            })?,
            None => MatchRules::base(),
        };

        rules.merge(&self.rules);
        rules.validate()?;
        Ok(rules)
    }
}

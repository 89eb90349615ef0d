//! 照合ルール設定
//!
//! 除外フィールド・ワイルドカード・面議語・同義語などをデータとして外部から
//! 与える。コードを変えずにルールを追加できるようにするため、分岐は持たない。

use crate::error::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// すべてのフィールドに適用するワイルドカードのキー
pub const ANY_FIELD: &str = "*";

/// 照合ルール
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchRules {
    /// 常に一致扱いにするフィールド（職務内容・住所など自由記述）
    pub excluded_fields: Vec<String>,
    /// フィールド名 → 常に一致扱いになる値（`"*"` は全フィールド）
    pub wildcards: HashMap<String, Vec<String>>,
    /// 面議を表す語
    pub negotiable_terms: Vec<String>,
    /// 値の形式に関わらず給与として扱うフィールド
    pub salary_fields: Vec<String>,
    /// 給与レンジの区切り
    pub range_separators: Vec<String>,
    /// 正準語 → 同義語
    pub synonyms: HashMap<String, Vec<String>>,
    /// 継続中を表す語（「至今」など）
    pub ongoing_terms: Vec<String>,
    /// 継続中の語を置き換える今日の日付の書式（strftime）
    pub today_formats: Vec<String>,
    /// フィールド名 → 表示ラベル
    pub key_labels: HashMap<String, String>,
}

impl MatchRules {
    /// 組み込みプリセットを取得
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "job" | "招聘" | "求人" => Some(Self::job_preset()),
            "resume" | "简历" | "履歴書" => Some(Self::resume_preset()),
            "base" => Some(Self::base()),
            _ => None,
        }
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Self = serde_json::from_str(json)?;
        Ok(rules)
    }

    /// プリセット共通の設定
    pub fn base() -> Self {
        let mut rules = Self {
            negotiable_terms: strings(&["面议", "薪资面议", "待遇面议"]),
            range_separators: strings(&["-", "~", "～", "至", "到", "—"]),
            ongoing_terms: strings(&["至今", "今", "现在", "目前", "present", "now"]),
            today_formats: strings(&["%Y.%m", "%Y-%m", "%Y/%m", "%Y年%m月"]),
            ..Default::default()
        };
        rules.wildcards.insert(ANY_FIELD.into(), strings(&["不限", "学历不限", "经验不限"]));
        rules
    }

    /// 求人票用プリセット
    fn job_preset() -> Self {
        let mut rules = Self::base();

        rules.excluded_fields = strings(&[
            "description",
            "jobDescription",
            "职位描述",
            "岗位职责",
            "address",
            "workAddress",
            "工作地址",
        ]);
        rules.salary_fields = strings(&["salary", "薪资"]);

        rules.wildcards.insert("degree".into(), strings(&["学历不限", "不限学历"]));
        rules.wildcards.insert("学历".into(), strings(&["学历不限", "不限学历"]));
        rules.wildcards.insert("experience".into(), strings(&["经验不限", "不限经验", "无经验要求"]));
        rules.wildcards.insert("工作经验".into(), strings(&["经验不限", "不限经验", "无经验要求"]));

        // 経験年数
        rules.synonyms.insert("1-3年".into(), strings(&["一到三年", "1至3年", "1~3年", "一至三年"]));
        rules.synonyms.insert("3-5年".into(), strings(&["三到五年", "3至5年", "3~5年", "三至五年"]));
        rules.synonyms.insert("5-10年".into(), strings(&["五到十年", "5至10年", "5~10年", "五至十年"]));
        // 福利
        rules.synonyms.insert("双休".into(), strings(&["周末双休", "做五休二"]));
        rules.synonyms.insert("五险一金".into(), strings(&["五险1金", "5险1金"]));
        rules.synonyms.insert("包吃住".into(), strings(&["包食宿", "提供食宿"]));

        rules.key_labels = labels(&[
            ("title", "职位名称"),
            ("salary", "薪资"),
            ("degree", "学历"),
            ("experience", "工作经验"),
            ("city", "工作城市"),
            ("welfare", "福利待遇"),
            ("skills", "技能要求"),
            ("company", "公司名称"),
            ("headcount", "招聘人数"),
        ]);

        rules
    }

    /// 履歴書用プリセット
    fn resume_preset() -> Self {
        let mut rules = Self::base();

        rules.excluded_fields = strings(&["selfEvaluation", "自我评价", "address", "现居住地"]);
        rules.salary_fields = strings(&["expectedSalary", "currentSalary", "期望薪资"]);

        rules.key_labels = labels(&[
            ("name", "姓名"),
            ("gender", "性别"),
            ("degree", "学历"),
            ("school", "毕业院校"),
            ("major", "专业"),
            ("expectedSalary", "期望薪资"),
            ("currentSalary", "目前薪资"),
            ("workPeriod", "工作时间"),
            ("skills", "技能"),
        ]);

        rules
    }

    /// 設定をマージ（後から追加した設定が優先、リストは重複なしで追加）
    pub fn merge(&mut self, other: &MatchRules) {
        extend_unique(&mut self.excluded_fields, &other.excluded_fields);
        for (field, values) in &other.wildcards {
            extend_unique(self.wildcards.entry(field.clone()).or_default(), values);
        }
        extend_unique(&mut self.negotiable_terms, &other.negotiable_terms);
        extend_unique(&mut self.salary_fields, &other.salary_fields);
        extend_unique(&mut self.range_separators, &other.range_separators);
        self.synonyms.extend(other.synonyms.clone());
        extend_unique(&mut self.ongoing_terms, &other.ongoing_terms);
        extend_unique(&mut self.today_formats, &other.today_formats);
        self.key_labels.extend(other.key_labels.clone());
    }

    /// 実行前の検証
    ///
    /// 区切りが空だと給与レンジが一切一致しなくなるため設定エラーとする。
    pub fn validate(&self) -> Result<()> {
        if self.range_separators.iter().all(|s| s.trim().is_empty()) {
            return Err(Error::Config("rangeSeparators が空です".into()));
        }

        for format in &self.today_formats {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(Error::Config(format!("不正な日付書式: {}", format)));
            }
        }

        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn extend_unique(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_preset() {
        let rules = MatchRules::from_preset("job").unwrap();
        assert!(rules.excluded_fields.contains(&"description".to_string()));
        assert!(rules.negotiable_terms.contains(&"面议".to_string()));
        assert_eq!(rules.key_labels.get("salary"), Some(&"薪资".to_string()));
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_preset_aliases() {
        assert_eq!(MatchRules::from_preset("招聘"), MatchRules::from_preset("JOB"));
        assert_eq!(MatchRules::from_preset("简历"), MatchRules::from_preset("resume"));
        assert!(MatchRules::from_preset("unknown").is_none());
    }

    #[test]
    fn test_from_json_partial() {
        let rules = MatchRules::from_json(
            r#"{"excludedFields": ["remark"], "synonyms": {"996": ["九九六"]}}"#,
        )
        .unwrap();
        assert_eq!(rules.excluded_fields, vec!["remark".to_string()]);
        assert!(rules.negotiable_terms.is_empty());
        assert_eq!(rules.synonyms.get("996"), Some(&vec!["九九六".to_string()]));
    }

    #[test]
    fn test_merge() {
        let mut rules = MatchRules::from_preset("job").unwrap();
        let custom = MatchRules::from_json(
            r#"{
                "negotiableTerms": ["面议", "薪酬面谈"],
                "wildcards": {"degree": ["学历无要求"]},
                "keyLabels": {"salary": "月薪"}
            }"#,
        )
        .unwrap();

        rules.merge(&custom);

        let count = rules.negotiable_terms.iter().filter(|t| *t == "面议").count();
        assert_eq!(count, 1);
        assert!(rules.negotiable_terms.contains(&"薪酬面谈".to_string()));
        assert!(rules.wildcards["degree"].contains(&"学历无要求".to_string()));
        assert!(rules.wildcards["degree"].contains(&"学历不限".to_string()));
        assert_eq!(rules.key_labels.get("salary"), Some(&"月薪".to_string()));
    }

    #[test]
    fn test_validate_errors() {
        let rules = MatchRules::default();
        assert!(matches!(rules.validate(), Err(Error::Config(_))));

        let mut rules = MatchRules::base();
        rules.today_formats.push("%Q".into());
        assert!(matches!(rules.validate(), Err(Error::Config(_))));
    }
}

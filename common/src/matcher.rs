//! フィールド照合エンジン
//!
//! レコードの各フィールド値が本文に含まれるかを判定し、見つからなかった
//! フィールド（配列は見つからなかった要素）だけを返す。
//!
//! ## 判定順
//! 1. 除外フィールド → 一致
//! 2. 給与（フィールド名指定、または値が `\d+-\d+`）→ 給与表記の候補で判定
//! 3. 文字列・数値 → ワイルドカード、同義語、継続中日付の候補で部分一致
//! 4. 配列 → 要素ごとに 3 を適用
//!
//! 比較は両側とも空白除去・小文字化した上で行う。

use crate::normalize::{normalize_text, ongoing_variants, salary_candidates, SalaryForm, SalaryRange};
use crate::rules::{MatchRules, ANY_FIELD};
use crate::types::{Document, FieldValue, MatchResult, Record, Unmatched};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use tracing::{debug, trace};

/// 正規化済みのルール（照合ごとに正規化し直さないため）
#[derive(Debug, Clone, Default)]
struct CompiledRules {
    excluded: HashSet<String>,
    any_wildcards: HashSet<String>,
    wildcards: HashMap<String, HashSet<String>>,
    negotiable: Vec<String>,
    salary_fields: HashSet<String>,
    separators: Vec<String>,
    synonym_index: HashMap<String, usize>,
    synonym_groups: Vec<Vec<String>>,
    ongoing: Vec<String>,
}

impl CompiledRules {
    fn compile(rules: &MatchRules) -> Self {
        let normalize_all =
            |items: &[String]| -> Vec<String> { items.iter().map(|s| normalize_text(s)).collect() };

        let mut compiled = Self {
            excluded: rules.excluded_fields.iter().map(|f| normalize_text(f)).collect(),
            negotiable: normalize_all(&rules.negotiable_terms),
            salary_fields: rules.salary_fields.iter().map(|f| normalize_text(f)).collect(),
            separators: normalize_all(&rules.range_separators),
            ongoing: normalize_all(&rules.ongoing_terms),
            ..Default::default()
        };
        compiled.separators.retain(|s| !s.is_empty());

        for (field, values) in &rules.wildcards {
            let values: HashSet<String> = values.iter().map(|v| normalize_text(v)).collect();
            if field == ANY_FIELD {
                compiled.any_wildcards.extend(values);
            } else {
                compiled
                    .wildcards
                    .entry(normalize_text(field))
                    .or_default()
                    .extend(values);
            }
        }

        // キー順を固定して候補順を決定的にする
        let mut canonicals: Vec<&String> = rules.synonyms.keys().collect();
        canonicals.sort();
        for canonical in canonicals {
            let mut group = vec![normalize_text(canonical)];
            for synonym in &rules.synonyms[canonical] {
                let synonym = normalize_text(synonym);
                if !synonym.is_empty() && !group.contains(&synonym) {
                    group.push(synonym);
                }
            }

            let index = compiled.synonym_groups.len();
            for term in &group {
                compiled.synonym_index.entry(term.clone()).or_insert(index);
            }
            compiled.synonym_groups.push(group);
        }

        compiled
    }

    fn is_wildcard(&self, field: &str, value: &str) -> bool {
        self.any_wildcards.contains(value)
            || self
                .wildcards
                .get(field)
                .is_some_and(|values| values.contains(value))
    }

    fn synonyms_of(&self, value: &str) -> &[String] {
        self.synonym_index
            .get(value)
            .map(|&index| self.synonym_groups[index].as_slice())
            .unwrap_or(&[])
    }
}

/// フィールド照合器
///
/// ルールは読み取り専用なので、複数スレッドから共有して使える。
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    rules: MatchRules,
    compiled: CompiledRules,
    today: NaiveDate,
    today_forms: Vec<String>,
}

impl Default for FieldMatcher {
    fn default() -> Self {
        Self::new(MatchRules::from_preset("job").unwrap_or_else(MatchRules::base))
    }
}

impl FieldMatcher {
    /// ローカル日付を「今日」として照合器を作る
    ///
    /// 「至今」などを含む値の照合結果は構築した日付に依存する。同じ入力で
    /// 常に同じ結果が必要なら [`FieldMatcher::with_today`] を使う。
    pub fn new(rules: MatchRules) -> Self {
        Self::with_today(rules, chrono::Local::now().date_naive())
    }

    /// 「至今」の置き換えに使う日付を指定して照合器を作る
    pub fn with_today(rules: MatchRules, today: NaiveDate) -> Self {
        let compiled = CompiledRules::compile(&rules);
        let today_forms = format_today(today, &rules.today_formats);
        Self {
            rules,
            compiled,
            today,
            today_forms,
        }
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// レコードを本文と照合する
    ///
    /// # Arguments
    /// * `record` - 照合するフィールド
    /// * `document` - 本文
    ///
    /// # Returns
    /// 未一致のフィールドのみを含む結果（レコードの順序を保持）
    pub fn match_record(&self, record: &Record, document: &Document) -> MatchResult {
        let mut result = MatchResult::new();

        for (field, value) in record.iter() {
            if let Some(unmatched) = self.check_field(field, value, document) {
                trace!("未一致: {} = {:?}", field, unmatched);
                result.insert(field, unmatched);
            }
        }

        debug!(
            "照合完了: {}フィールド中 {}件未一致",
            record.len(),
            result.len()
        );
        result
    }

    /// 本文を文字列で渡す版
    pub fn match_text(&self, record: &Record, text: &str) -> MatchResult {
        self.match_record(record, &Document::new(text))
    }

    fn check_field(&self, field: &str, value: &FieldValue, document: &Document) -> Option<Unmatched> {
        let field_key = normalize_text(field);
        if self.compiled.excluded.contains(&field_key) {
            return None;
        }

        match value {
            FieldValue::Text(text) => {
                let matched = match self.salary_range(&field_key, text) {
                    Some(range) => self.salary_matches(range, text, document),
                    None => self.scalar_matches(&field_key, text, document),
                };
                (!matched).then(|| Unmatched::Value(text.clone()))
            }
            FieldValue::Number(number) => {
                (!self.scalar_matches(&field_key, number, document)).then(|| Unmatched::Value(number.clone()))
            }
            FieldValue::List(items) => {
                let missing: Vec<String> = items
                    .iter()
                    .filter(|item| !self.scalar_matches(&field_key, item, document))
                    .cloned()
                    .collect();
                (!missing.is_empty()).then_some(Unmatched::Items(missing))
            }
            FieldValue::Other(raw) => {
                trace!("照合対象外の値を一致扱い: {} = {}", field, raw);
                None
            }
        }
    }

    /// 給与として扱うべき値ならレンジを返す
    ///
    /// 給与フィールドでも形式外の値は通常の文字列比較に戻す。
    fn salary_range(&self, field_key: &str, text: &str) -> Option<SalaryRange> {
        let range = SalaryRange::parse(text);
        if range.is_none() && self.compiled.salary_fields.contains(field_key) {
            debug!("給与形式外の値を文字列として照合: {}", text);
        }
        range
    }

    /// 給与レンジの照合
    ///
    /// 値そのもの（先頭ゼロ付きの日付など）が本文にあれば一致。ただし `0-0`
    /// は面議の記号なので、本文の「0-0」では一致としない。
    fn salary_matches(&self, range: SalaryRange, text: &str, document: &Document) -> bool {
        if range.form() != SalaryForm::Negotiable && document.contains_normalized(&normalize_text(text)) {
            return true;
        }

        salary_candidates(range, &self.compiled.separators, &self.compiled.negotiable)
            .iter()
            .map(|candidate| normalize_text(candidate))
            .any(|candidate| !candidate.is_empty() && document.contains_normalized(&candidate))
    }

    fn scalar_matches(&self, field_key: &str, value: &str, document: &Document) -> bool {
        let normalized = normalize_text(value);

        if self.compiled.is_wildcard(field_key, &normalized) {
            return true;
        }

        if document.contains_normalized(&normalized) {
            return true;
        }

        if self
            .compiled
            .synonyms_of(&normalized)
            .iter()
            .any(|synonym| document.contains_normalized(synonym))
        {
            return true;
        }

        ongoing_variants(&normalized, &self.compiled.ongoing, &self.today_forms)
            .iter()
            .any(|variant| document.contains_normalized(variant))
    }
}

/// 今日の日付を各書式で文字列化する（正規化済み）
///
/// 書式エラーはその書式だけ無視する。
fn format_today(today: NaiveDate, formats: &[String]) -> Vec<String> {
    formats
        .iter()
        .filter_map(|format| {
            let mut text = String::new();
            write!(text, "{}", today.format(format)).ok()?;
            Some(normalize_text(&text))
        })
        .filter(|text| !text.is_empty())
        .collect()
}

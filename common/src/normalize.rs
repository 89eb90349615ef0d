//! 値の正規化
//!
//! 照合ループから切り離した純粋関数群。値ごとに「本文中で受け入れる表記」の
//! 集合を返す。
//!
//! - 空白除去・小文字化
//! - 給与レンジ（`min-max`）の解析と「万」単位表記
//! - 「至今」など継続中を表す日付表記の展開

use regex::Regex;

/// 比較用に正規化する（全空白文字を除去し小文字化）
///
/// 全角スペース（U+3000）とゼロ幅文字も除去する。
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !is_zero_width(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}')
}

/// 数値を10進表記にする（整数値は小数部を付けない）
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// 給与レンジ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalaryRange {
    pub min: u64,
    pub max: u64,
}

/// 給与レンジの表記形態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalaryForm {
    /// `0-0`（面議）
    Negotiable,
    /// 上下限が同じ
    Single(u64),
    /// 上下限が異なる
    Range(u64, u64),
}

impl SalaryRange {
    /// `^\d+-\d+$` 形式の文字列を解析する
    ///
    /// 形式外・桁あふれは `None`（呼び出し側は通常の文字列比較に戻る）。
    pub fn parse(text: &str) -> Option<Self> {
        lazy_static::lazy_static! {
            static ref SALARY_RE: Regex = Regex::new(r"^(\d+)-(\d+)$").unwrap();
        }

        let cap = SALARY_RE.captures(text.trim())?;
        let min = cap[1].parse::<u64>().ok()?;
        let max = cap[2].parse::<u64>().ok()?;
        Some(Self { min, max })
    }

    pub fn form(&self) -> SalaryForm {
        if self.min == 0 && self.max == 0 {
            SalaryForm::Negotiable
        } else if self.min == self.max {
            SalaryForm::Single(self.min)
        } else {
            SalaryForm::Range(self.min, self.max)
        }
    }
}

/// 万単位の数値表記（割り切れれば整数、そうでなければ小数1桁）
///
/// `120000 → "12"`, `15000 → "1.5"`, `17600 → "1.8"`
pub fn format_wan(value: u64) -> String {
    if value % 10000 == 0 {
        return (value / 10000).to_string();
    }

    let text = format!("{:.1}", value as f64 / 10000.0);
    match text.strip_suffix(".0") {
        Some(integer) => integer.to_string(),
        None => text,
    }
}

/// 丸めなしで万単位に変換できる場合のみ表記を返す
///
/// 1万以上かつ小数1桁以内（`value % 1000 == 0`）が条件。
pub fn wan_exact(value: u64) -> Option<String> {
    if value >= 10000 && value % 1000 == 0 {
        Some(format_wan(value))
    } else {
        None
    }
}

/// 給与レンジについて本文中で受け入れる表記を列挙する
///
/// # Arguments
/// * `range` - 解析済みの給与レンジ
/// * `separators` - レンジ区切り（`-`, `~`, `至` など）
/// * `negotiable_terms` - 面議を表す語
pub fn salary_candidates(
    range: SalaryRange,
    separators: &[String],
    negotiable_terms: &[String],
) -> Vec<String> {
    match range.form() {
        SalaryForm::Negotiable => negotiable_terms.to_vec(),
        SalaryForm::Single(value) => {
            let mut candidates = vec![value.to_string()];
            if let Some(wan) = wan_exact(value) {
                candidates.push(format!("{}万", wan));
            }
            candidates
        }
        SalaryForm::Range(min, max) => {
            let mut candidates: Vec<String> = separators
                .iter()
                .map(|sep| format!("{}{}{}", min, sep, max))
                .collect();

            if min >= 10000 && max >= 10000 {
                let (min_wan, max_wan) = (format_wan(min), format_wan(max));
                candidates.extend(
                    separators
                        .iter()
                        .map(|sep| format!("{}{}{}万", min_wan, sep, max_wan)),
                );
            }
            candidates
        }
    }
}

/// 継続中の日付表記（「至今」等）を他の表記に置き換えた候補を返す
///
/// `value` と `ongoing_terms` は正規化済みであること。最も長く一致した語を
/// 置換対象とする（「至今」の中の「今」を誤って拾わないため）。
/// 該当語が無ければ空。
pub fn ongoing_variants(value: &str, ongoing_terms: &[String], today_forms: &[String]) -> Vec<String> {
    let found = ongoing_terms
        .iter()
        .filter(|term| !term.is_empty() && value.contains(term.as_str()))
        .max_by_key(|term| term.chars().count());

    let Some(found) = found else {
        return Vec::new();
    };

    ongoing_terms
        .iter()
        .filter(|term| !term.is_empty() && *term != found)
        .chain(today_forms.iter())
        .map(|replacement| value.replacen(found.as_str(), replacement, 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text(" Java 开发 "), "java开发");
        assert_eq!(normalize_text("五险\u{3000}一金\n"), "五险一金");
        assert_eq!(normalize_text("双\u{200B}休"), "双休");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5000.0), "5000");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(-2.0), "-2");
    }

    #[test]
    fn test_salary_parse() {
        assert_eq!(SalaryRange::parse("5000-8000"), Some(SalaryRange { min: 5000, max: 8000 }));
        assert_eq!(SalaryRange::parse(" 0-0 "), Some(SalaryRange { min: 0, max: 0 }));
        assert_eq!(SalaryRange::parse("5k-8k"), None);
        assert_eq!(SalaryRange::parse("5000"), None);
        assert_eq!(SalaryRange::parse("99999999999999999999999-1"), None);
    }

    #[test]
    fn test_salary_form() {
        assert_eq!(SalaryRange { min: 0, max: 0 }.form(), SalaryForm::Negotiable);
        assert_eq!(SalaryRange { min: 5000, max: 5000 }.form(), SalaryForm::Single(5000));
        assert_eq!(SalaryRange { min: 5000, max: 8000 }.form(), SalaryForm::Range(5000, 8000));
    }

    #[test]
    fn test_format_wan() {
        assert_eq!(format_wan(120000), "12");
        assert_eq!(format_wan(15000), "1.5");
        assert_eq!(format_wan(17600), "1.8");
        assert_eq!(format_wan(19990), "2");
    }

    #[test]
    fn test_wan_exact() {
        assert_eq!(wan_exact(120000), Some("12".to_string()));
        assert_eq!(wan_exact(15000), Some("1.5".to_string()));
        assert_eq!(wan_exact(17600), None);
        assert_eq!(wan_exact(5000), None);
    }

    #[test]
    fn test_salary_candidates_single() {
        let seps = strings(&["-"]);
        let range = SalaryRange { min: 120000, max: 120000 };
        assert_eq!(salary_candidates(range, &seps, &[]), strings(&["120000", "12万"]));

        let range = SalaryRange { min: 17600, max: 17600 };
        assert_eq!(salary_candidates(range, &seps, &[]), strings(&["17600"]));
    }

    #[test]
    fn test_salary_candidates_range() {
        let seps = strings(&["-", "~"]);
        let range = SalaryRange { min: 15000, max: 20000 };
        assert_eq!(
            salary_candidates(range, &seps, &[]),
            strings(&["15000-20000", "15000~20000", "1.5-2万", "1.5~2万"])
        );

        let range = SalaryRange { min: 5000, max: 8000 };
        assert_eq!(salary_candidates(range, &seps, &[]), strings(&["5000-8000", "5000~8000"]));
    }

    #[test]
    fn test_salary_candidates_negotiable() {
        let terms = strings(&["面议", "薪资面议"]);
        let range = SalaryRange { min: 0, max: 0 };
        assert_eq!(salary_candidates(range, &[], &terms), terms);
    }

    #[test]
    fn test_ongoing_variants() {
        let terms = strings(&["至今", "今", "现在"]);
        let today = strings(&["2026.10"]);
        let variants = ongoing_variants("2019.03-至今", &terms, &today);
        assert_eq!(variants, strings(&["2019.03-今", "2019.03-现在", "2019.03-2026.10"]));
    }

    #[test]
    fn test_ongoing_variants_none() {
        let terms = strings(&["至今"]);
        assert!(ongoing_variants("2019.03-2021.05", &terms, &[]).is_empty());
    }
}

//! 照合の型定義
//!
//! - Record: 求人・履歴書から抽出したフィールド（JSONオブジェクト由来、順序保持）
//! - Document: 照合対象の本文テキスト
//! - MatchResult: 本文に見つからなかったフィールドの一覧

use crate::error::{Error, Result};
use crate::normalize::{format_number, normalize_text};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// フィールド値
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 文字列スカラー（職種名、学歴、給与レンジ文字列など）
    Text(String),
    /// 数値スカラー（10進表記で保持）
    Number(String),
    /// 文字列の配列（福利厚生、スキルタグなど）
    List(Vec<String>),
    /// 解釈できない値。照合では常に一致扱い
    Other(serde_json::Value),
}

impl FieldValue {
    /// JSON値から変換する
    ///
    /// 配列は要素がすべて文字列か数値の場合のみ `List` になる。
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Number(n) => FieldValue::Number(number_text(n)),
            Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => list.push(s.clone()),
                        Value::Number(n) => list.push(number_text(n)),
                        _ => return FieldValue::Other(value.clone()),
                    }
                }
                FieldValue::List(list)
            }
            other => FieldValue::Other(other.clone()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(items: Vec<&str>) -> Self {
        FieldValue::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(format_number(n))
    }
}

fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(format_number).unwrap_or_else(|| n.to_string())
    }
}

/// 照合するレコード（フィールド名 → 値、挿入順を保持）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// JSONオブジェクトからレコードを作る
    ///
    /// オブジェクト以外は呼び出し側の境界エラーとして扱う。
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::InvalidRecord(format!("JSONオブジェクトが必要です: {}", json_kind(value)))
        })?;

        Ok(object
            .iter()
            .map(|(key, value)| (key.clone(), FieldValue::from_json(value)))
            .collect())
    }

    /// JSON文字列からレコードを作る
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    pub fn push(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.push((field.into(), value.into()));
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == field).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// 照合対象の本文
///
/// 正規化形（空白除去・小文字化）は生成時に一度だけ計算する。
#[derive(Debug, Clone, Default)]
pub struct Document {
    raw: String,
    normalized: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let raw = text.into();
        let normalized = normalize_text(&raw);
        Self { raw, normalized }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// 正規化済みの候補文字列が本文に含まれるか
    pub fn contains_normalized(&self, candidate: &str) -> bool {
        self.normalized.contains(candidate)
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// 未一致の内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Unmatched {
    /// スカラー値（元の表記のまま）
    Value(String),
    /// 配列のうち見つからなかった要素
    Items(Vec<String>),
}

/// 照合結果
///
/// 含まれるのは未一致のフィールドのみ。キーが無ければ完全一致。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    entries: Vec<(String, Unmatched)>,
}

impl MatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, unmatched: Unmatched) {
        let field = field.into();
        match self.entries.iter_mut().find(|(k, _)| *k == field) {
            Some(entry) => entry.1 = unmatched,
            None => self.entries.push((field, unmatched)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Unmatched> {
        self.entries.iter().find(|(k, _)| k == field).map(|(_, v)| v)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Unmatched)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Unmatched)> for MatchResult {
    fn from_iter<I: IntoIterator<Item = (String, Unmatched)>>(iter: I) -> Self {
        let mut result = Self::new();
        for (field, unmatched) in iter {
            result.insert(field, unmatched);
        }
        result
    }
}

impl Serialize for MatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, unmatched) in &self.entries {
            map.serialize_entry(field, unmatched)?;
        }
        map.end()
    }
}

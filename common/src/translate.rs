//! キー変換
//!
//! 照合結果のフィールド名を表示ラベル（`薪资`, `学历` など）に置き換える。

use crate::types::MatchResult;
use std::collections::HashMap;

/// 照合結果のキーをラベルに変換する
///
/// ラベルが無いキーはそのまま残し、順序は変えない。ラベルが他のキーと
/// 衝突する場合（結果に同名のキーがある、または既に使われている）は
/// 元のキーを残す。
pub fn translate_keys(result: &MatchResult, labels: &HashMap<String, String>) -> MatchResult {
    let mut translated = MatchResult::new();

    for (field, unmatched) in result.iter() {
        let key = match labels.get(field) {
            Some(label) if !result.contains(label) && !translated.contains(label) => label.as_str(),
            _ => field,
        };
        translated.insert(key, unmatched.clone());
    }

    translated
}

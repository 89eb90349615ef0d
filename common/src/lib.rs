//! Field Matcher Common Library
//!
//! 求人票・履歴書のフィールドと本文テキストの照合エンジン。
//! CLIから使われる純粋な型と関数のみを持つ（ファイル・スレッドは扱わない）。

pub mod types;
pub mod error;
pub mod normalize;
pub mod rules;
pub mod matcher;
pub mod translate;

pub use types::{Document, FieldValue, MatchResult, Record, Unmatched};
pub use error::{Error, Result};
pub use normalize::{normalize_text, SalaryRange};
pub use rules::MatchRules;
pub use matcher::FieldMatcher;
pub use translate::translate_keys;

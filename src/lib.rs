pub mod cli;
pub mod config;
pub mod error;
pub mod scanner;
pub mod batch;

pub use field_matcher_common as common;

//! 字幕人名保护：检测中文人名并替换为占位符

pub mod config;
mod dictionary_utils;
pub mod name_guard;

pub use config::{ConfigSource, NameGuardConfig};
pub use name_guard::{
    Extraction, NameGuard, NameVerdict, PlaceholderMap, RuleSet, DEFAULT_SEPARATOR,
};

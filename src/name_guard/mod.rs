//! Name Guard - 人名保护层
//!
//! 在字幕文本送往翻译/TTS 之前，把疑似中文人名替换为稳定占位符，处理完再还原。
//! 宁可多判，不可漏判；全部为可配置的启发式规则，无统计模型。
//!
//! ## 处理流程
//! 1. 按分隔符切分段落（cue）
//! 2. 扫描每个段落的 CJK 片段，枚举 1-4 字子串
//! 3. 称呼前后缀拆分（平安哥 / 老王）
//! 4. 闸门 1 强排除 → 黑名单 → 闸门 2 强信号 → 加权打分
//! 5. 段落内重叠消解（带称呼优先，其次高分、靠前）
//! 6. 跨段落去重分配占位符，一次性重写段落后按原分隔符拼接

mod affix;
mod engine;
mod gates;
mod placeholder;
mod rules;
mod scorer;
mod tokenizer;
mod types;

pub use affix::{AffixMatch, AffixMatcher};
pub use engine::{NameGuard, DEFAULT_SEPARATOR};
pub use placeholder::{PlaceholderFormat, PlaceholderMap};
pub use rules::{RuleSet, RuleWeights, EXCLUDED_SCORE, KNOWN_NAME_SCORE, NO_SIGNAL_SCORE};
pub use scorer::{OccurrenceCache, WordContext};
pub use types::{
    Affix, AffixKind, Candidate, Extraction, NameVerdict, RuleHit, ScoreRule, Segment,
    SegmentPosition, VerdictReason,
};

//! 闸门
//!
//! - 闸门 1（强排除）：语气词、动作短语、代词、数量词、亲属称呼，命中即"不是人名"
//! - 闸门 2（强信号）：仅在 `require_strong_signal` 时生效，至少命中一个强信号

use crate::dictionary_utils::char_len;
use crate::name_guard::rules::RuleSet;
use crate::name_guard::scorer::{OccurrenceCache, WordContext};

/// 强信号适用的词长范围（字符数）
const STRONG_SIGNAL_LENGTHS: std::ops::RangeInclusive<usize> = 2..=3;

/// 闸门检查器
pub struct GateEvaluator<'r> {
    rules: &'r RuleSet,
}

impl<'r> GateEvaluator<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// 闸门 1：强排除检查
    ///
    /// 返回 true 表示应该排除。白名单由调用方先行处理。
    pub fn is_strongly_excluded(&self, word: &str) -> bool {
        let rules = self.rules;

        // 1. 语气词（单字精确匹配，多字按子串）
        if rules.interjections.contains(word) || rules.multi_char_interjections.is_match(word) {
            return true;
        }

        // 2. 祈使/动作短语（以动词开头且长度 ≥2）
        if char_len(word) >= 2
            && rules
                .action_verbs
                .iter()
                .any(|verb| word.starts_with(verb.as_str()))
        {
            return true;
        }

        // 3. 含代词
        if rules.pronouns.is_match(word) {
            return true;
        }

        // 4. 数字/量词
        if rules.numbers_quantifiers.is_match(word) {
            return true;
        }

        // 5. 亲属称呼/角色
        rules.kinship_roles.contains(word)
    }

    /// 闸门 2：是否命中强信号
    ///
    /// 1. 从带称呼的词中拆出的人名，直接通过
    /// 2. 长度 2-3 且全文重复出现
    /// 3. 长度 2-3 且处于呼唤位
    pub fn has_strong_signal(
        &self,
        word: &str,
        ctx: &WordContext,
        occurrences: &mut OccurrenceCache<'_>,
    ) -> bool {
        if ctx.has_affix {
            return true;
        }

        if !STRONG_SIGNAL_LENGTHS.contains(&char_len(word)) {
            return false;
        }

        ctx.is_call_position || occurrences.count(word) >= self.rules.repetition_min_occurrences
    }
}

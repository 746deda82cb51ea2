//! 打分器
//!
//! 判定顺序：白名单 → 闸门 1 → 黑名单 → 闸门 2 → 加权打分与阈值比较

use std::collections::HashMap;

use crate::dictionary_utils::char_len;
use crate::name_guard::gates::GateEvaluator;
use crate::name_guard::rules::{RuleSet, EXCLUDED_SCORE, KNOWN_NAME_SCORE, NO_SIGNAL_SCORE};
use crate::name_guard::types::{NameVerdict, RuleHit, ScoreRule, VerdictReason};

/// 出现次数缓存
///
/// 统计词在整段原文（含分隔符）中的不重叠出现次数，每个词只算一次
#[derive(Debug)]
pub struct OccurrenceCache<'a> {
    text: &'a str,
    counts: HashMap<String, usize>,
}

impl<'a> OccurrenceCache<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            counts: HashMap::new(),
        }
    }

    pub fn count(&mut self, word: &str) -> usize {
        if word.is_empty() {
            return 0;
        }
        if let Some(&count) = self.counts.get(word) {
            return count;
        }
        let count = self.text.matches(word).count();
        self.counts.insert(word.to_string(), count);
        count
    }
}

/// 词的上下文
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordContext {
    /// 所在 token 是否从段落开头起始
    pub is_call_position: bool,
    /// 是否从带称呼的 token 中拆出
    pub has_affix: bool,
}

/// 打分器
pub struct Scorer<'r> {
    rules: &'r RuleSet,
    gates: GateEvaluator<'r>,
}

impl<'r> Scorer<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self {
            rules,
            gates: GateEvaluator::new(rules),
        }
    }

    /// 完整判定
    pub fn evaluate(
        &self,
        word: &str,
        ctx: &WordContext,
        occurrences: &mut OccurrenceCache<'_>,
    ) -> NameVerdict {
        // 白名单优先级最高
        if self.rules.is_known_name(word) {
            return NameVerdict::fixed(true, KNOWN_NAME_SCORE, VerdictReason::KnownName);
        }

        if self.gates.is_strongly_excluded(word) {
            return NameVerdict::fixed(false, EXCLUDED_SCORE, VerdictReason::StrongExclusion);
        }

        if self.rules.is_excluded_name(word) {
            return NameVerdict::fixed(false, EXCLUDED_SCORE, VerdictReason::ExcludedName);
        }

        if self.rules.require_strong_signal
            && !self.gates.has_strong_signal(word, ctx, occurrences)
        {
            return NameVerdict::fixed(false, NO_SIGNAL_SCORE, VerdictReason::NoStrongSignal);
        }

        let (score, hits) = self.score(word, ctx, occurrences);
        NameVerdict {
            accepted: score >= self.rules.threshold,
            score,
            reason: VerdictReason::Scored,
            hits,
        }
    }

    /// 各规则加权求和，只记录非零得分
    pub fn score(
        &self,
        word: &str,
        ctx: &WordContext,
        occurrences: &mut OccurrenceCache<'_>,
    ) -> (i32, Vec<RuleHit>) {
        let weights = self.rules.weights;
        let mut hits = Vec::new();

        let mut push = |rule: ScoreRule, score: i32| {
            if score != 0 {
                hits.push(RuleHit { rule, score });
            }
        };

        if ctx.has_affix {
            push(ScoreRule::Honorific, weights.honorific);
        }

        if ctx.is_call_position {
            push(ScoreRule::CallPosition, weights.call_position);
        }

        if weights.repetition != 0
            && occurrences.count(word) >= self.rules.repetition_min_occurrences
        {
            push(ScoreRule::Repetition, weights.repetition);
        }

        if self.rules.pos_exclusion_words.contains(word) {
            push(ScoreRule::PosExclusion, weights.pos_exclusion);
        }

        if self.has_preferred_structure(word) {
            push(ScoreRule::LengthStructure, weights.length_structure);
        }

        let total = hits.iter().map(|hit| hit.score).sum();
        (total, hits)
    }

    fn has_preferred_structure(&self, word: &str) -> bool {
        self.rules.preferred_lengths.contains(&char_len(word))
            && !self
                .rules
                .exclude_endings
                .iter()
                .any(|ending| word.ends_with(ending.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NameGuardConfig;

    fn call() -> WordContext {
        WordContext {
            is_call_position: true,
            has_affix: false,
        }
    }

    fn affixed() -> WordContext {
        WordContext {
            is_call_position: false,
            has_affix: true,
        }
    }

    #[test]
    fn test_occurrence_cache() {
        let mut cache = OccurrenceCache::new("平安，平安哥 <sep> 平安");
        assert_eq!(cache.count("平安"), 3);
        assert_eq!(cache.count("平安"), 3);
        assert_eq!(cache.count("王"), 0);
        assert_eq!(cache.count(""), 0);
        // 不重叠计数
        assert_eq!(OccurrenceCache::new("哈哈哈").count("哈哈"), 1);
    }

    #[test]
    fn test_affixed_name_scores() {
        let rules = RuleSet::builtin();
        let scorer = Scorer::new(&rules);
        let mut cache = OccurrenceCache::new("平安，平安哥");

        // 称呼 100 + 呼唤位 80 + 重复 40 + 结构 10
        let ctx = WordContext {
            is_call_position: true,
            has_affix: true,
        };
        let verdict = scorer.evaluate("平安", &ctx, &mut cache);
        assert!(verdict.accepted);
        assert_eq!(verdict.reason, VerdictReason::Scored);
        assert_eq!(verdict.score, 230);
        assert_eq!(verdict.hits.len(), 4);
    }

    #[test]
    fn test_call_position_alone_is_not_enough() {
        let rules = RuleSet::builtin();
        let scorer = Scorer::new(&rules);
        let mut cache = OccurrenceCache::new("平安回家");

        // 呼唤位 80 + 结构 10 < 100
        let verdict = scorer.evaluate("平安", &call(), &mut cache);
        assert_eq!(verdict.score, 90);
        assert!(!verdict.accepted);
    }

    #[test]
    fn test_known_name_wins() {
        let mut config = NameGuardConfig::builtin();
        config.special.known_names = vec!["爸爸".to_string()];
        config.special.exclude_names.push("爸爸".to_string());
        let rules = RuleSet::from_config(&config).expect("compile rules");
        let scorer = Scorer::new(&rules);
        let mut cache = OccurrenceCache::new("爸爸");

        let verdict = scorer.evaluate("爸爸", &WordContext::default(), &mut cache);
        assert!(verdict.accepted);
        assert_eq!(verdict.score, KNOWN_NAME_SCORE);
        assert_eq!(verdict.reason, VerdictReason::KnownName);
        assert!(verdict.hits.is_empty());
    }

    #[test]
    fn test_exclusions() {
        let rules = RuleSet::builtin();
        let scorer = Scorer::new(&rules);
        let mut cache = OccurrenceCache::new("老板，爸爸");

        let verdict = scorer.evaluate("爸爸", &call(), &mut cache);
        assert_eq!(verdict.reason, VerdictReason::StrongExclusion);
        assert_eq!(verdict.score, EXCLUDED_SCORE);

        // "板" 在黑名单中
        let verdict = scorer.evaluate("板", &affixed(), &mut cache);
        assert_eq!(verdict.reason, VerdictReason::ExcludedName);
        assert_eq!(verdict.score, EXCLUDED_SCORE);
        assert!(!verdict.accepted);
    }

    #[test]
    fn test_no_strong_signal() {
        let rules = RuleSet::builtin();
        let scorer = Scorer::new(&rules);
        let mut cache = OccurrenceCache::new("今天平安");

        let verdict = scorer.evaluate("平安", &WordContext::default(), &mut cache);
        assert!(!verdict.accepted);
        assert_eq!(verdict.score, NO_SIGNAL_SCORE);
        assert_eq!(verdict.reason, VerdictReason::NoStrongSignal);
    }

    #[test]
    fn test_excluded_ending_skips_structure_bonus() {
        let rules = RuleSet::builtin();
        let scorer = Scorer::new(&rules);
        let mut cache = OccurrenceCache::new("平安的");

        let (_, hits) = scorer.score("平安的", &WordContext::default(), &mut cache);
        assert!(hits.iter().all(|hit| hit.rule != ScoreRule::LengthStructure));

        let (score, hits) = scorer.score("平安", &WordContext::default(), &mut cache);
        assert_eq!(score, 10);
        assert_eq!(hits[0].rule, ScoreRule::LengthStructure);
    }

    #[test]
    fn test_disabled_rules_do_not_hit() {
        let mut config = NameGuardConfig::default();
        config.rules.call_position.enabled = false;
        config.rules.length_structure.enabled = false;
        let rules = RuleSet::from_config(&config).expect("compile rules");
        let scorer = Scorer::new(&rules);
        let mut cache = OccurrenceCache::new("平安");

        let (score, hits) = scorer.score("平安", &call(), &mut cache);
        assert_eq!(score, 0);
        assert!(hits.is_empty());
    }
}

//! Name Guard 规则集
//!
//! 由 [`NameGuardConfig`] 编译得到的只读规则：权重、词表、预编译的子串/前后缀匹配器。
//! 构建一次，多次调用共享（`Arc<RuleSet>`）。

use std::collections::HashSet;
use std::sync::Arc;

use aho_corasick::AhoCorasick;
use anyhow::Result;

use crate::config::{NameGuardConfig, RulesConfig};
use crate::dictionary_utils::{char_len, normalize_words, word_set};
use crate::name_guard::affix::AffixMatcher;
use crate::name_guard::placeholder::PlaceholderFormat;

/// 白名单命中分数
pub const KNOWN_NAME_SCORE: i32 = 999;
/// 强排除 / 黑名单命中分数
pub const EXCLUDED_SCORE: i32 = -999;
/// 闸门 2 未通过分数
pub const NO_SIGNAL_SCORE: i32 = 0;

lazy_static::lazy_static! {
    /// 内置规则集（进程内共享）
    static ref BUILTIN_RULE_SET: Arc<RuleSet> = Arc::new(compile_builtin());
}

/// 编译内置规则，失败时回退空规则集
fn compile_builtin() -> RuleSet {
    match RuleSet::from_config(&NameGuardConfig::builtin()) {
        Ok(rules) => rules,
        Err(e) => {
            tracing::error!("内置规则编译失败，回退空规则集: {}", e);
            RuleSet::empty()
        }
    }
}

/// 各规则的生效权重（禁用即为 0）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleWeights {
    pub honorific: i32,
    pub call_position: i32,
    pub repetition: i32,
    pub pos_exclusion: i32,
    pub length_structure: i32,
}

impl RuleWeights {
    pub fn from_config(rules: &RulesConfig) -> Self {
        Self {
            honorific: rules.honorific.effective_weight(),
            call_position: rules.call_position.effective_weight(),
            repetition: rules.repetition.effective_weight(),
            pos_exclusion: rules.pos_exclusion.effective_weight(),
            length_structure: rules.length_structure.effective_weight(),
        }
    }
}

/// 子串匹配器（多模式，预编译）
#[derive(Debug, Clone, Default)]
pub struct SubstringSet {
    matcher: Option<AhoCorasick>,
}

impl SubstringSet {
    pub fn new(patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }
        let matcher = AhoCorasick::new(patterns)
            .map_err(|e| anyhow::anyhow!("构建子串匹配器失败: {}", e))?;
        Ok(Self {
            matcher: Some(matcher),
        })
    }

    /// 文本中是否包含任一模式
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.is_match(text))
    }
}

/// 编译后的规则集
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub(crate) threshold: i32,
    pub(crate) require_strong_signal: bool,
    pub(crate) placeholder_format: PlaceholderFormat,
    pub(crate) weights: RuleWeights,
    pub(crate) repetition_min_occurrences: usize,
    pub(crate) preferred_lengths: HashSet<usize>,
    pub(crate) exclude_endings: Vec<String>,
    pub(crate) pos_exclusion_words: HashSet<String>,

    // 闸门 1
    pub(crate) interjections: HashSet<String>,
    /// 多字语气词（子串匹配，如 "哈哈哈哈" 含 "哈哈"）
    pub(crate) multi_char_interjections: SubstringSet,
    pub(crate) action_verbs: Vec<String>,
    pub(crate) pronouns: SubstringSet,
    pub(crate) numbers_quantifiers: SubstringSet,
    pub(crate) kinship_roles: HashSet<String>,

    // 白名单 / 黑名单
    pub(crate) known_names: HashSet<String>,
    pub(crate) exclude_names: HashSet<String>,

    pub(crate) boundary_chars: HashSet<char>,
    pub(crate) affixes: AffixMatcher,
}

impl RuleSet {
    /// 校验并编译配置
    pub fn from_config(config: &NameGuardConfig) -> Result<Self> {
        config.validate()?;

        let rules = &config.rules;
        let exclusion = &config.strong_exclusion;

        let interjections = normalize_words(&exclusion.interjections);
        let multi_char: Vec<String> = interjections
            .iter()
            .filter(|w| char_len(w) >= 2)
            .cloned()
            .collect();

        let rule_set = Self {
            threshold: config.strategy.threshold,
            require_strong_signal: config.strategy.require_strong_signal,
            placeholder_format: PlaceholderFormat::parse(
                &config.strategy.name_placeholder_format,
            )?,
            weights: RuleWeights::from_config(rules),
            repetition_min_occurrences: rules.repetition.min_occurrences,
            preferred_lengths: rules
                .length_structure
                .preferred_lengths
                .iter()
                .copied()
                .collect(),
            exclude_endings: normalize_words(&rules.length_structure.exclude_endings),
            pos_exclusion_words: word_set(&rules.pos_exclusion.exclude_words),

            multi_char_interjections: SubstringSet::new(&multi_char)?,
            interjections: interjections.into_iter().collect(),
            action_verbs: normalize_words(&exclusion.action_verbs),
            pronouns: SubstringSet::new(&normalize_words(&exclusion.pronouns))?,
            numbers_quantifiers: SubstringSet::new(&normalize_words(
                &exclusion.numbers_quantifiers,
            ))?,
            kinship_roles: word_set(&exclusion.kinship_roles),

            known_names: word_set(&config.special.known_names),
            exclude_names: word_set(&config.special.exclude_names),

            boundary_chars: config.boundary.chars.chars().collect(),
            affixes: AffixMatcher::new(
                &rules.honorific.suffix_patterns,
                &rules.honorific.prefix_patterns,
            ),
        };

        tracing::debug!(
            "NameGuard 规则集编译完成: threshold={}, strong_signal={}, weights={:?}",
            rule_set.threshold,
            rule_set.require_strong_signal,
            rule_set.weights
        );

        Ok(rule_set)
    }

    /// 空规则集：结构默认值（阈值、权重、边界字符），不含任何词表和称呼
    ///
    /// 不经过校验，不会失败
    pub fn empty() -> Self {
        let defaults = NameGuardConfig::default();
        let rules = &defaults.rules;

        Self {
            threshold: defaults.strategy.threshold,
            require_strong_signal: defaults.strategy.require_strong_signal,
            placeholder_format: PlaceholderFormat::default(),
            weights: RuleWeights::from_config(rules),
            repetition_min_occurrences: rules.repetition.min_occurrences,
            preferred_lengths: rules
                .length_structure
                .preferred_lengths
                .iter()
                .copied()
                .collect(),
            exclude_endings: Vec::new(),
            pos_exclusion_words: HashSet::new(),
            interjections: HashSet::new(),
            multi_char_interjections: SubstringSet::default(),
            action_verbs: Vec::new(),
            pronouns: SubstringSet::default(),
            numbers_quantifiers: SubstringSet::default(),
            kinship_roles: HashSet::new(),
            known_names: HashSet::new(),
            exclude_names: HashSet::new(),
            boundary_chars: defaults.boundary.chars.chars().collect(),
            affixes: AffixMatcher::default(),
        }
    }

    /// 内置规则集
    pub fn builtin() -> Arc<RuleSet> {
        Arc::clone(&BUILTIN_RULE_SET)
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn require_strong_signal(&self) -> bool {
        self.require_strong_signal
    }

    pub fn weights(&self) -> RuleWeights {
        self.weights
    }

    pub fn placeholder_format(&self) -> &PlaceholderFormat {
        &self.placeholder_format
    }

    pub fn is_known_name(&self, word: &str) -> bool {
        self.known_names.contains(word)
    }

    pub fn is_excluded_name(&self, word: &str) -> bool {
        self.exclude_names.contains(word)
    }

    pub fn is_kinship_role(&self, word: &str) -> bool {
        self.kinship_roles.contains(word)
    }

    pub fn is_boundary_char(&self, ch: char) -> bool {
        self.boundary_chars.contains(&ch)
    }
}

impl TryFrom<&NameGuardConfig> for RuleSet {
    type Error = anyhow::Error;

    fn try_from(config: &NameGuardConfig) -> Result<Self> {
        Self::from_config(config)
    }
}

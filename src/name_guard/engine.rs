//! Name Guard 主引擎
//!
//! 组合分词、前后缀拆分、闸门、打分、重叠消解、占位符分配

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use crate::config::NameGuardConfig;
use crate::dictionary_utils::normalize_text;
use crate::name_guard::placeholder::{rewrite_segment, PlaceholderMap, Replacement};
use crate::name_guard::rules::RuleSet;
use crate::name_guard::scorer::{OccurrenceCache, Scorer, WordContext};
use crate::name_guard::tokenizer::Tokenizer;
use crate::name_guard::types::{Affix, Candidate, Extraction, NameVerdict, Segment};

/// 默认 cue 分隔符
pub const DEFAULT_SEPARATOR: &str = " <sep> ";

/// 枚举子串的最大字数（含称呼）
const MAX_SPAN_CHARS: usize = 4;
/// 不带称呼的普通候选最大字数
const MAX_PLAIN_CHARS: usize = 3;

/// Name Guard 引擎（可复用，规则预编译）
///
/// 每次调用的状态（出现次数缓存、占位符映射）都是局部的，可跨线程克隆共享
#[derive(Debug, Clone)]
pub struct NameGuard {
    rules: Arc<RuleSet>,
}

impl NameGuard {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    /// 从配置编译规则并创建引擎
    pub fn from_config(config: &NameGuardConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(RuleSet::from_config(config)?)))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// 使用默认分隔符提取并替换人名
    pub fn protect(&self, text: &str) -> Extraction {
        self.extract_and_replace_names(text, DEFAULT_SEPARATOR)
    }

    /// 提取并替换人名
    ///
    /// 纯函数，不可失败（无人名时返回原文）。分隔符为空时整段文本视为一个段落。
    /// 文本与分隔符先做 NFC 归一化，与词表保持同一形式。
    pub fn extract_and_replace_names(&self, text: &str, separator: &str) -> Extraction {
        let started = Instant::now();

        if text.is_empty() {
            return Extraction::unchanged(String::new());
        }

        let text = normalize_text(text);
        let separator = normalize_text(separator);
        let (text, separator) = (text.as_ref(), separator.as_ref());

        let segments: Vec<&str> = if separator.is_empty() {
            vec![text]
        } else {
            text.split(separator).collect()
        };

        let format = self.rules.placeholder_format();
        let mut occurrences = OccurrenceCache::new(text);
        let mut placeholders = PlaceholderMap::default();
        let mut rewritten = Vec::with_capacity(segments.len());

        for (index, segment_text) in segments.into_iter().enumerate() {
            let segment = Segment::new(segment_text, index);
            let candidates = self.extract_candidates(&segment, &mut occurrences);
            let candidate_count = candidates.len();
            let mut selected = select_non_overlapping(candidates);
            tracing::trace!(
                "NameGuard: 段落 {} ({:?}) 候选 {} 个, 选中 {} 个",
                segment.index,
                segment.position,
                candidate_count,
                selected.len()
            );

            // 按阅读顺序分配占位符，首次出现顺序即从左到右
            selected.sort_by_key(|c| c.start);

            let replacements: Vec<Replacement> = selected
                .iter()
                .map(|candidate| {
                    let (placeholder, is_new) = placeholders.assign(&candidate.name, format);
                    if is_new {
                        tracing::trace!(
                            "NameGuard: 新人名 {} -> {} (段落 {})",
                            candidate.name,
                            placeholder,
                            segment.index
                        );
                    }
                    Replacement {
                        start: candidate.start,
                        end: candidate.end,
                        placeholder: placeholder.to_string(),
                    }
                })
                .collect();

            rewritten.push(rewrite_segment(segment.text, &replacements));
        }

        if placeholders.is_empty() {
            tracing::debug!(
                "NameGuard: 未发现人名, 耗时 {}us",
                started.elapsed().as_micros()
            );
            return Extraction::unchanged(text.to_string());
        }

        let names = placeholders.names();
        tracing::debug!(
            "NameGuard: 替换 {} 个人名 {:?}, 段落数 {}, 耗时 {}us",
            names.len(),
            names,
            rewritten.len(),
            started.elapsed().as_micros()
        );

        Extraction {
            text: rewritten.join(separator),
            placeholders,
            names,
        }
    }

    /// 单词判定（诊断用）
    ///
    /// `context` 为出现次数统计所用的全文
    pub fn evaluate_word(&self, word: &str, context: &str, is_call_position: bool) -> NameVerdict {
        let word = normalize_text(word);
        let context = normalize_text(context);
        let scorer = Scorer::new(&self.rules);
        let mut occurrences = OccurrenceCache::new(&context);
        let ctx = WordContext {
            is_call_position,
            has_affix: false,
        };
        scorer.evaluate(&word, &ctx, &mut occurrences)
    }

    /// 提取段落内的全部候选（未消解重叠）
    ///
    /// 每个 CJK 片段内枚举 1-4 字子串：
    /// 1. 白名单整词直接判定
    /// 2. 整体是亲属称呼（哥哥、大哥），跳过
    /// 3. 后缀/前缀拆分成功，只判定人名部分
    /// 4. 否则 1-3 字子串须通过边界过滤再判定
    pub fn extract_candidates(
        &self,
        segment: &Segment<'_>,
        occurrences: &mut OccurrenceCache<'_>,
    ) -> Vec<Candidate> {
        let scorer = Scorer::new(&self.rules);
        let mut candidates = Vec::new();

        for run in Tokenizer::cjk_runs(segment.text) {
            let bounds = run.char_bounds();
            let char_count = bounds.len() - 1;

            for span_len in (1..=MAX_SPAN_CHARS.min(char_count)).rev() {
                for i in 0..=(char_count - span_len) {
                    let start = bounds[i];
                    let end = bounds[i + span_len];
                    let token = &segment.text[start..end];
                    let is_call_position = start == 0;
                    // 白名单整词优先，不拆称呼、不做边界过滤
                    let is_known = self.rules.is_known_name(token);

                    // 亲属称呼不再拆成 "人名 + 称呼"
                    if !is_known && self.rules.is_kinship_role(token) {
                        tracing::trace!("NameGuard: {} 为亲属称呼，跳过", token);
                        continue;
                    }

                    let decomposed = if is_known {
                        None
                    } else {
                        self.rules.affixes.decompose(token)
                    };

                    if let Some(affix) = decomposed {
                        let ctx = WordContext {
                            is_call_position,
                            has_affix: true,
                        };
                        let verdict = scorer.evaluate(affix.name, &ctx, occurrences);
                        tracing::trace!(
                            "NameGuard: {} -> {}+{:?}({}) score={} {:?}",
                            token,
                            affix.name,
                            affix.kind,
                            affix.affix,
                            verdict.score,
                            verdict.reason
                        );

                        if verdict.accepted {
                            let name_start = start + affix.name_offset;
                            candidates.push(Candidate {
                                name: affix.name.to_string(),
                                start: name_start,
                                end: name_start + affix.name.len(),
                                score: verdict.score,
                                affix: Some(Affix {
                                    kind: affix.kind,
                                    text: affix.affix.to_string(),
                                }),
                            });
                        }
                        continue;
                    }

                    if !is_known
                        && (span_len > MAX_PLAIN_CHARS
                            || !self.is_at_boundary(segment.text, start, end))
                    {
                        continue;
                    }

                    let ctx = WordContext {
                        is_call_position,
                        has_affix: false,
                    };
                    let verdict = scorer.evaluate(token, &ctx, occurrences);
                    tracing::trace!(
                        "NameGuard: {} score={} {:?}",
                        token,
                        verdict.score,
                        verdict.reason
                    );

                    if verdict.accepted {
                        candidates.push(Candidate {
                            name: token.to_string(),
                            start,
                            end,
                            score: verdict.score,
                            affix: None,
                        });
                    }
                }
            }
        }

        candidates
    }

    /// 边界过滤：段首、段尾，或紧邻边界字符
    fn is_at_boundary(&self, text: &str, start: usize, end: usize) -> bool {
        if start == 0 || end == text.len() {
            return true;
        }

        let preceded = text[..start]
            .chars()
            .next_back()
            .is_some_and(|ch| self.rules.is_boundary_char(ch));
        let followed = text[end..]
            .chars()
            .next()
            .is_some_and(|ch| self.rules.is_boundary_char(ch));

        preceded || followed
    }
}

impl Default for NameGuard {
    fn default() -> Self {
        Self::new(RuleSet::builtin())
    }
}

/// 重叠消解
///
/// 按优先级降序（稳定排序）贪心选取，与已选区间重叠的候选直接丢弃
pub(crate) fn select_non_overlapping(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.priority().cmp(&a.priority()));

    let mut selected: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if selected.iter().all(|s| !s.overlaps(&candidate)) {
            selected.push(candidate);
        }
    }
    selected
}

//! Name Guard 类型定义

use serde::Serialize;
use std::cmp::Reverse;

use crate::name_guard::placeholder::PlaceholderMap;

/// 称呼类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AffixKind {
    /// 前缀称呼（老王、小明、阿强）
    Prefix,
    /// 后缀称呼（平安哥、王师傅）
    Suffix,
}

/// 称呼（前缀或后缀）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Affix {
    pub kind: AffixKind,
    pub text: String,
}

/// 人名候选
///
/// `start`/`end` 为段落内字节偏移，只覆盖人名部分（不含称呼）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// 人名（不含前后缀）
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub score: i32,
    /// 前后缀（None 表示普通词）
    pub affix: Option<Affix>,
}

impl Candidate {
    pub fn has_affix(&self) -> bool {
        self.affix.is_some()
    }

    pub fn affix_kind(&self) -> Option<AffixKind> {
        self.affix.as_ref().map(|a| a.kind)
    }

    /// 排序优先级：(是否带前后缀, 分数, 越靠前越优先)
    pub fn priority(&self) -> (bool, i32, Reverse<usize>) {
        (self.has_affix(), self.score, Reverse(self.start))
    }

    /// 半开区间重叠判断
    pub fn overlaps(&self, other: &Candidate) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// 段落位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentPosition {
    /// 第一个段落（utterance 开头）
    UtteranceStart,
    /// 分隔符之后的段落
    AfterSeparator,
}

/// 一个 cue 的文本
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub index: usize,
    pub position: SegmentPosition,
}

impl<'a> Segment<'a> {
    pub fn new(text: &'a str, index: usize) -> Self {
        let position = if index == 0 {
            SegmentPosition::UtteranceStart
        } else {
            SegmentPosition::AfterSeparator
        };
        Self {
            text,
            index,
            position,
        }
    }
}

/// 打分规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRule {
    Honorific,
    CallPosition,
    Repetition,
    PosExclusion,
    LengthStructure,
}

/// 单条规则得分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleHit {
    pub rule: ScoreRule,
    pub score: i32,
}

/// 判定依据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictReason {
    /// 白名单命中
    KnownName,
    /// 闸门 1：强排除
    StrongExclusion,
    /// 黑名单命中
    ExcludedName,
    /// 闸门 2：无强信号
    NoStrongSignal,
    /// 按分数与阈值判定
    Scored,
}

/// 单词判定结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameVerdict {
    pub accepted: bool,
    pub score: i32,
    pub reason: VerdictReason,
    /// 各规则得分详情（仅 `Scored` 时非空）
    pub hits: Vec<RuleHit>,
}

impl NameVerdict {
    pub(crate) fn fixed(accepted: bool, score: i32, reason: VerdictReason) -> Self {
        Self {
            accepted,
            score,
            reason,
            hits: Vec::new(),
        }
    }
}

/// 提取结果
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    /// 替换后的文本（分隔符位置不变）
    pub text: String,
    /// 占位符 → 人名（按首次出现顺序）
    pub placeholders: PlaceholderMap,
    /// 去重后的人名（按首次出现顺序）
    pub names: Vec<String>,
}

impl Extraction {
    /// 原文无人名时的结果
    pub fn unchanged(text: String) -> Self {
        Self {
            text,
            placeholders: PlaceholderMap::default(),
            names: Vec::new(),
        }
    }

    /// 是否替换了任何人名
    pub fn changed(&self) -> bool {
        !self.names.is_empty()
    }
}

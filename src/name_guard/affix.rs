//! 称呼前后缀拆分
//!
//! - 后缀形：人名(1-3 字) + 后缀，如 "平安哥" → ("平安", "哥")
//! - 前缀形：前缀 + 人名(1-2 字)，如 "老王" → ("王", "老")
//!
//! 先试后缀再试前缀；模式按长度降序尝试，"王师傅" 拆成 "王" + "师傅" 而不是 "王师" + "傅"。

use crate::dictionary_utils::{char_len, normalize_words, sort_longest_first};
use crate::name_guard::types::AffixKind;

/// 后缀形中人名部分的最大字数
pub const MAX_SUFFIX_NAME_CHARS: usize = 3;
/// 前缀形中人名部分的最大字数
pub const MAX_PREFIX_NAME_CHARS: usize = 2;

/// 拆分结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffixMatch<'a> {
    pub name: &'a str,
    pub affix: &'a str,
    pub kind: AffixKind,
    /// 人名在 token 内的字节偏移
    pub name_offset: usize,
}

/// 前后缀匹配器（由规则集预编译，模式按长度降序）
#[derive(Debug, Clone, Default)]
pub struct AffixMatcher {
    suffixes: Vec<String>,
    prefixes: Vec<String>,
}

impl AffixMatcher {
    pub fn new(suffixes: &[String], prefixes: &[String]) -> Self {
        Self {
            suffixes: sort_longest_first(normalize_words(suffixes)),
            prefixes: sort_longest_first(normalize_words(prefixes)),
        }
    }

    /// 尝试拆分（后缀优先）
    pub fn decompose<'a>(&self, token: &'a str) -> Option<AffixMatch<'a>> {
        self.match_suffix(token).or_else(|| self.match_prefix(token))
    }

    pub fn match_suffix<'a>(&self, token: &'a str) -> Option<AffixMatch<'a>> {
        self.suffixes.iter().find_map(|suffix| {
            let name = token.strip_suffix(suffix.as_str())?;
            if !(1..=MAX_SUFFIX_NAME_CHARS).contains(&char_len(name)) {
                return None;
            }
            Some(AffixMatch {
                name,
                affix: &token[name.len()..],
                kind: AffixKind::Suffix,
                name_offset: 0,
            })
        })
    }

    pub fn match_prefix<'a>(&self, token: &'a str) -> Option<AffixMatch<'a>> {
        self.prefixes.iter().find_map(|prefix| {
            let name = token.strip_prefix(prefix.as_str())?;
            if !(1..=MAX_PREFIX_NAME_CHARS).contains(&char_len(name)) {
                return None;
            }
            let name_offset = token.len() - name.len();
            Some(AffixMatch {
                name,
                affix: &token[..name_offset],
                kind: AffixKind::Prefix,
                name_offset,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn matcher() -> AffixMatcher {
        AffixMatcher::new(&words(&["哥", "傅", "师傅", "姐"]), &words(&["老", "小", "阿"]))
    }

    #[test]
    fn test_suffix_shape() {
        let m = matcher().decompose("平安哥").expect("suffix match");
        assert_eq!(m.name, "平安");
        assert_eq!(m.affix, "哥");
        assert_eq!(m.kind, AffixKind::Suffix);
        assert_eq!(m.name_offset, 0);
    }

    #[test]
    fn test_longest_suffix_first() {
        let m = matcher().decompose("王师傅").expect("suffix match");
        assert_eq!(m.name, "王");
        assert_eq!(m.affix, "师傅");
    }

    #[test]
    fn test_shorter_suffix_when_longer_leaves_no_name() {
        // "师傅" 整体作后缀时人名为空，退回 "傅"
        let m = matcher().decompose("师傅").expect("suffix match");
        assert_eq!(m.name, "师");
        assert_eq!(m.affix, "傅");
    }

    #[test]
    fn test_prefix_shape() {
        let m = matcher().decompose("老王").expect("prefix match");
        assert_eq!(m.name, "王");
        assert_eq!(m.affix, "老");
        assert_eq!(m.kind, AffixKind::Prefix);
        assert_eq!(m.name_offset, "老".len());
    }

    #[test]
    fn test_suffix_before_prefix() {
        // 同时符合 "小" 前缀和 "哥" 后缀，按后缀拆
        let m = matcher().decompose("小强哥").expect("match");
        assert_eq!(m.kind, AffixKind::Suffix);
        assert_eq!(m.name, "小强");
    }

    #[test]
    fn test_name_length_limits() {
        let m = matcher();
        // 后缀形人名最多 3 字
        assert!(m.match_suffix("欧阳平安哥").is_none());
        assert!(m.match_suffix("欧阳平哥").is_some());
        // 前缀形人名最多 2 字
        assert!(m.match_prefix("阿强来找").is_none());
        assert!(m.match_prefix("阿强来").is_some());
        // 只有称呼本身不算
        assert!(m.decompose("哥").is_none());
        assert!(m.decompose("老").is_none());
    }

    #[test]
    fn test_no_match() {
        assert!(matcher().decompose("张三").is_none());
        assert!(AffixMatcher::default().decompose("平安哥").is_none());
    }
}

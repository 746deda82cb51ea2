// 词表工具函数
//
// 独立模块，提供配置词表的归一化、去重与排序
// 被配置校验和规则编译共享使用

use std::borrow::Cow;
use std::collections::HashSet;

use unicode_normalization::{is_nfc, UnicodeNormalization};

/// 标准化词汇（NFC 归一化 + 去除首尾空白）
pub fn normalize_word(word: &str) -> String {
    let nfc: String = word.nfc().collect();
    nfc.trim().to_string()
}

/// 输入文本 NFC 归一化（与词表同一形式），已是 NFC 时不复制
pub fn normalize_text(text: &str) -> Cow<'_, str> {
    if is_nfc(text) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.nfc().collect())
    }
}

/// 标准化词表：归一化每个词条，丢弃空词条，按首次出现顺序去重
pub fn normalize_words(words: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Vec::with_capacity(words.len());

    for word in words {
        let normalized = normalize_word(word);
        if normalized.is_empty() {
            continue;
        }
        if seen.insert(normalized.clone()) {
            result.push(normalized);
        }
    }

    result
}

/// 标准化词表并转换为集合（用于精确匹配）
pub fn word_set(words: &[String]) -> HashSet<String> {
    normalize_words(words).into_iter().collect()
}

/// 按字符数降序排列（稳定排序，同长度保持配置顺序）
///
/// 前后缀匹配需要长模式优先，避免 "师傅" 被 "傅" 截断
pub fn sort_longest_first(mut words: Vec<String>) -> Vec<String> {
    words.sort_by(|a, b| char_len(b).cmp(&char_len(a)));
    words
}

/// 字符数（非字节数）
pub fn char_len(word: &str) -> usize {
    word.chars().count()
}

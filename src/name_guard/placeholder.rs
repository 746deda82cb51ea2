//! 占位符分配与文本重写
//!
//! 同一次调用内，同一个人名只对应一个占位符（跨段落、带不带称呼都一样）

use std::collections::HashMap;

use anyhow::Result;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// 占位符模板中的序号槽位
const INDEX_SLOTS: [&str; 2] = ["{index}", "{}"];

/// 占位符格式（预解析模板）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderFormat {
    head: String,
    tail: String,
}

impl PlaceholderFormat {
    /// 解析模板，必须包含且只包含一个 `{index}` 或 `{}` 槽位
    ///
    /// `{{` / `}}` 为转义的花括号，其余单个花括号视为错误
    pub fn parse(template: &str) -> Result<Self> {
        let mut head = String::new();
        let mut tail = String::new();
        let mut has_slot = false;
        let mut rest = template;

        while let Some(ch) = rest.chars().next() {
            let out = if has_slot { &mut tail } else { &mut head };

            if let Some(after) = rest.strip_prefix("{{") {
                out.push('{');
                rest = after;
            } else if let Some(after) = rest.strip_prefix("}}") {
                out.push('}');
                rest = after;
            } else if let Some(slot) = INDEX_SLOTS.iter().find(|slot| rest.starts_with(**slot)) {
                if has_slot {
                    anyhow::bail!("占位符格式只能包含一个序号槽位: {}", template);
                }
                has_slot = true;
                rest = &rest[slot.len()..];
            } else if ch == '{' || ch == '}' {
                anyhow::bail!("占位符格式包含未转义的花括号: {}", template);
            } else {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }

        if !has_slot {
            anyhow::bail!("占位符格式缺少 {{index}} 槽位: {}", template);
        }
        if head.is_empty() && tail.is_empty() {
            anyhow::bail!("占位符格式不能只有序号槽位");
        }

        Ok(Self { head, tail })
    }

    pub fn render(&self, index: usize) -> String {
        format!("{}{}{}", self.head, index, self.tail)
    }
}

impl Default for PlaceholderFormat {
    /// `<<NAME_{index}>>`
    fn default() -> Self {
        Self {
            head: "<<NAME_".to_string(),
            tail: ">>".to_string(),
        }
    }
}

/// 占位符 ↔ 人名 双向映射（保持插入顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    /// (占位符, 人名)，按首次出现顺序
    entries: Vec<(String, String)>,
    /// 人名 → entries 下标
    by_name: HashMap<String, usize>,
}

impl PlaceholderMap {
    /// 取得人名的占位符，不存在时按下一个序号新建
    ///
    /// 返回 (占位符, 是否新建)
    pub fn assign(&mut self, name: &str, format: &PlaceholderFormat) -> (&str, bool) {
        if let Some(&idx) = self.by_name.get(name) {
            return (&self.entries[idx].0, false);
        }

        let idx = self.entries.len();
        self.entries.push((format.render(idx), name.to_string()));
        self.by_name.insert(name.to_string(), idx);
        (&self.entries[idx].0, true)
    }

    pub fn placeholder_of(&self, name: &str) -> Option<&str> {
        self.by_name
            .get(name)
            .map(|&idx| self.entries[idx].0.as_str())
    }

    pub fn name_of(&self, placeholder: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == placeholder)
            .map(|(_, n)| n.as_str())
    }

    /// (占位符, 人名) 迭代器，按首次出现顺序
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, n)| (p.as_str(), n.as_str()))
    }

    /// 人名列表，按首次出现顺序
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(_, n)| n.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 把文本中的占位符还原为人名
    ///
    /// 长占位符先替换，避免 `N1` 截断 `N10`
    pub fn restore(&self, text: &str) -> String {
        let mut ordered: Vec<&(String, String)> = self.entries.iter().collect();
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut result = text.to_string();
        for (placeholder, name) in ordered {
            if result.contains(placeholder.as_str()) {
                result = result.replace(placeholder.as_str(), name);
            }
        }
        result
    }
}

impl Serialize for PlaceholderMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (placeholder, name) in &self.entries {
            map.serialize_entry(placeholder, name)?;
        }
        map.end()
    }
}

/// 段落内的一次替换
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub start: usize,
    pub end: usize,
    pub placeholder: String,
}

/// 一次性重写段落
///
/// `replacements` 必须按 `start` 升序且互不重叠
pub fn rewrite_segment(segment: &str, replacements: &[Replacement]) -> String {
    let mut result = String::with_capacity(segment.len());
    let mut last_end = 0;

    for r in replacements {
        debug_assert!(r.start >= last_end, "替换区间必须升序且不重叠");
        result.push_str(&segment[last_end..r.start]);
        result.push_str(&r.placeholder);
        last_end = r.end;
    }

    result.push_str(&segment[last_end..]);
    result
}

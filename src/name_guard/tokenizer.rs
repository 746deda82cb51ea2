//! Name Guard 分词器
//!
//! 将段落文本分割为：汉字、ASCII 词、空白、符号。
//! 候选只从汉字 token 中枚举。

/// Token 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// 汉字序列
    Chinese,
    /// ASCII 字母/数字序列
    Ascii,
    /// 空白符序列
    Whitespace,
    /// 标点/符号
    Symbol,
}

/// Token
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub text: &'a str,
    pub token_type: TokenType,
    /// 在段落中的起始字节偏移
    pub start: usize,
    /// 在段落中的结束字节偏移（不含）
    pub end: usize,
}

impl Token<'_> {
    /// 每个字符的起始字节偏移（相对段落），末尾追加 `end`
    ///
    /// 长度为字符数 + 1，`bounds[i]..bounds[i + n]` 即第 i 个字符起的 n 字子串
    pub fn char_bounds(&self) -> Vec<usize> {
        self.text
            .char_indices()
            .map(|(idx, _)| self.start + idx)
            .chain(std::iter::once(self.end))
            .collect()
    }
}

/// 分词器
pub struct Tokenizer;

impl Tokenizer {
    /// 分词
    ///
    /// 按字符类型将文本分割为 Token 序列，相邻同类字符合并
    pub fn tokenize(text: &str) -> Vec<Token<'_>> {
        let mut tokens = Vec::new();
        let mut current: Option<(TokenType, usize)> = None;

        for (idx, ch) in text.char_indices() {
            let char_type = Self::classify_char(ch);

            match current {
                Some((ct, _)) if ct == char_type => {}
                Some((ct, start)) => {
                    // 类型切换，保存当前 token
                    tokens.push(Token {
                        text: &text[start..idx],
                        token_type: ct,
                        start,
                        end: idx,
                    });
                    current = Some((char_type, idx));
                }
                None => current = Some((char_type, idx)),
            }
        }

        if let Some((ct, start)) = current {
            tokens.push(Token {
                text: &text[start..],
                token_type: ct,
                start,
                end: text.len(),
            });
        }

        tokens
    }

    /// 仅保留汉字 token（最长连续 CJK 片段）
    pub fn cjk_runs(text: &str) -> Vec<Token<'_>> {
        Self::tokenize(text)
            .into_iter()
            .filter(|t| t.token_type == TokenType::Chinese)
            .collect()
    }

    /// 字符分类
    fn classify_char(ch: char) -> TokenType {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            TokenType::Ascii
        } else if ch.is_whitespace() {
            TokenType::Whitespace
        } else if is_cjk(ch) {
            TokenType::Chinese
        } else {
            TokenType::Symbol
        }
    }
}

/// 判断是否为 CJK 表意文字
pub fn is_cjk(ch: char) -> bool {
    let code = ch as u32;
    // CJK Unified Ideographs
    (0x4E00..=0x9FFF).contains(&code)
        // CJK Unified Ideographs Extension A
        || (0x3400..=0x4DBF).contains(&code)
        // CJK Unified Ideographs Extension B-F
        || (0x20000..=0x2CEAF).contains(&code)
        // CJK Compatibility Ideographs
        || (0xF900..=0xFAFF).contains(&code)
}

//! Tokenizer - lowercase token extraction for tags and queries / 分词器
//!
//! Supports / 支持：
//! - Tag tokens: split on anything that is not a letter or digit / 标签分词
//! - Query terms: split on whitespace only / 查询分词
//! - Phrase normalization (lowercase + collapsed whitespace) / 短语标准化

/// Minimum length of a derived tag token / 标签最短长度
const MIN_TAG_LEN: usize = 2;

/// Tokenize text into lowercase tag tokens / 对文本进行分词
///
/// "Ashur's Fire-Temple 02" -> ["ashur", "fire", "temple", "02"]
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for word in text.split(|c: char| !c.is_alphanumeric()) {
        if word.chars().count() < MIN_TAG_LEN {
            continue;
        }
        tokens.push(word.to_lowercase());
    }

    tokens
}

/// Split a query into lowercase whitespace-separated terms, empty terms dropped / 查询分词
pub fn tokenize_query(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|term| term.to_lowercase())
        .collect()
}

/// Normalize text for phrase matching / 标准化文本用于短语匹配
/// - Trim both ends / 去除首尾空白
/// - Convert to lowercase / 转小写
///
/// Inner whitespace is kept as typed.
pub fn normalize_for_search(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Append tokens not already present, keeping first-seen order / 去重追加
pub fn push_unique(target: &mut Vec<String>, tokens: impl IntoIterator<Item = String>) {
    for token in tokens {
        if !target.contains(&token) {
            target.push(token);
        }
    }
}

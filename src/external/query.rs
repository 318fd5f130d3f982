// URL 查询参数编解码
//
// 编码与 encodeURIComponent 保持一致，解码兼容 `+` 表示空格和开头的 `?`

use std::borrow::Cow;

/// 有序的字符串参数映射
///
/// 保持插入顺序，使生成的链接稳定；重复插入同一键时覆盖旧值。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入参数，已存在的键会被覆盖
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// 仅在值存在时插入
    pub fn insert_opt<V: Into<String>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 以键值对切片形式访问（供 reqwest 的 `.query()` 使用）
    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// 编码为查询字符串（不含 `?`）
pub fn encode_query(params: &QueryParams) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// 解码查询字符串，允许以 `?` 开头
pub fn decode_query(fragment: &str) -> QueryParams {
    let fragment = fragment.strip_prefix('?').unwrap_or(fragment);
    let mut params = QueryParams::new();

    for segment in fragment.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        params.insert(decode_component(key), decode_component(value));
    }

    params
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    // 非法编码时保留原文
    let decoded = urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| spaced.clone());
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_keeps_insertion_order() {
        let mut params = QueryParams::new();
        params.insert("user", "alice");
        params.insert("format", "gen9ou");
        params.insert("page", "2");
        assert_eq!(encode_query(&params), "user=alice&format=gen9ou&page=2");
    }

    #[test]
    fn test_encode_escapes_like_uri_component() {
        let mut params = QueryParams::new();
        params.insert("user", "a b,c&d");
        assert_eq!(encode_query(&params), "user=a%20b%2Cc%26d");
    }

    #[test]
    fn test_insert_overwrites() {
        let mut params = QueryParams::new();
        params.insert("page", "1");
        params.insert("page", "2");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("page"), Some("2"));
    }

    #[test]
    fn test_insert_opt_skips_absent() {
        let mut params = QueryParams::new();
        params.insert_opt("sort", None::<&str>);
        params.insert_opt("private", Some("1"));
        assert_eq!(encode_query(&params), "private=1");
    }

    #[test]
    fn test_decode_handles_prefix_plus_and_bare_keys() {
        let params = decode_query("?user=Some+Body&format=gen9%20ou&private");
        assert_eq!(params.get("user"), Some("Some Body"));
        assert_eq!(params.get("format"), Some("gen9 ou"));
        assert_eq!(params.get("private"), Some(""));
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_query("").is_empty());
        assert!(decode_query("?").is_empty());
    }

    #[test]
    fn test_decode_inverts_encode() {
        let mut params = QueryParams::new();
        params.insert("user", "Zarel, 小明+1");
        params.insert("format", "[Gen 9] OU");
        assert_eq!(decode_query(&encode_query(&params)), params);
    }
}

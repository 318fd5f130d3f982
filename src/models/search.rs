use serde::{Deserialize, Serialize};

use super::replay::to_id;
use crate::external::QueryParams;

/// 可往返于 URL 的搜索条件
///
/// `user` 与 `format` 同时为空表示浏览模式（最近录像）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// 逗号分隔的用户名，大小写不敏感
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default = "first_page")]
    pub page: u32,
    /// 仅在指定了格式且未指定用户时有效
    #[serde(default)]
    pub sort_by_rating: bool,
}

fn first_page() -> u32 {
    1
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            user: String::new(),
            format: String::new(),
            is_private: false,
            page: 1,
            sort_by_rating: false,
        }
    }
}

impl SearchQuery {
    /// 按用户/格式创建第一页的搜索
    pub fn new(user: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            format: format.into(),
            ..Self::default()
        }
    }

    /// 从解码后的 URL 参数构造
    ///
    /// # 参数
    /// - `user`, `format`: 缺省为空
    /// - `private`: 非空即为私有搜索
    /// - `page`: 缺省、无法解析或小于 1 时为 1
    /// - `sort`: 等于 `rating` 时按评分排序
    pub fn from_params(params: &QueryParams) -> Self {
        let page = params
            .get("page")
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        Self {
            user: params.get("user").unwrap_or_default().to_string(),
            format: params.get("format").unwrap_or_default().to_string(),
            is_private: params.get("private").map_or(false, |p| !p.is_empty()),
            page,
            sort_by_rating: params.get("sort") == Some("rating"),
        }
    }

    /// 是否为浏览模式
    pub fn is_browse(&self) -> bool {
        self.user.is_empty() && self.format.is_empty()
    }

    /// 是否允许按评分排序
    pub fn allows_rating_sort(&self) -> bool {
        self.user.is_empty() && !self.format.is_empty()
    }

    /// 规范化：浏览模式没有其它参数；指定了用户或未指定格式时不按评分排序
    pub fn normalized(mut self) -> Self {
        if self.is_browse() {
            return Self::default();
        }
        if !self.allows_rating_sort() {
            self.sort_by_rating = false;
        }
        self.page = self.page.max(1);
        self
    }

    /// 两个搜索是否在语义上相同（忽略用户名/格式的大小写与标点差异）
    ///
    /// 浏览模式只看原始字段是否为空，`user=%20` 这类查询仍是搜索，不等同于浏览。
    pub fn same_search(&self, other: &SearchQuery) -> bool {
        self.is_browse() == other.is_browse()
            && normalized_users(&self.user) == normalized_users(&other.user)
            && to_id(&self.format) == to_id(&other.format)
            && self.is_private == other.is_private
            && self.page == other.page
            && self.sort_by_rating == other.sort_by_rating
    }
}

/// 将逗号分隔的用户名列表转换为 ID 列表
pub fn normalized_users(user: &str) -> Vec<String> {
    user.split(',')
        .map(to_id)
        .filter(|id| !id.is_empty())
        .collect()
}

/// 搜索表单输入（由展示层提交）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchForm {
    pub user: String,
    pub format: String,
    pub is_private: bool,
}

/// 当前登录用户（由外部登录检查提供）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedInUser {
    pub userid: String,
    #[serde(default)]
    pub is_sysop: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::decode_query;

    #[test]
    fn test_from_params_defaults() {
        let query = SearchQuery::from_params(&QueryParams::new());
        assert_eq!(query, SearchQuery::default());
        assert!(query.is_browse());
    }

    #[test]
    fn test_from_params_full() {
        let params = decode_query("?user=Alice&format=gen9ou&private=1&page=3&sort=rating");
        let query = SearchQuery::from_params(&params);
        assert_eq!(query.user, "Alice");
        assert_eq!(query.format, "gen9ou");
        assert!(query.is_private);
        assert_eq!(query.page, 3);
        assert!(query.sort_by_rating);
    }

    #[test]
    fn test_from_params_invalid_page() {
        for raw in ["page=0", "page=-2", "page=abc", "page="] {
            let query = SearchQuery::from_params(&decode_query(raw));
            assert_eq!(query.page, 1, "page for {:?}", raw);
        }
    }

    #[test]
    fn test_normalized_forces_sort_off_with_user() {
        let query = SearchQuery {
            user: "alice".to_string(),
            format: "gen9ou".to_string(),
            sort_by_rating: true,
            ..SearchQuery::default()
        };
        assert!(!query.normalized().sort_by_rating);
    }

    #[test]
    fn test_normalized_keeps_sort_for_format_only() {
        let query = SearchQuery {
            format: "gen9ou".to_string(),
            sort_by_rating: true,
            ..SearchQuery::default()
        };
        assert!(query.normalized().sort_by_rating);
    }

    #[test]
    fn test_normalized_browse_mode_resets_everything() {
        let query = SearchQuery {
            is_private: true,
            page: 4,
            sort_by_rating: true,
            ..SearchQuery::default()
        };
        assert_eq!(query.normalized(), SearchQuery::default());
    }

    #[test]
    fn test_same_search_ignores_cosmetic_differences() {
        let a = SearchQuery::new("Alice, Bob", "gen9ou");
        let b = SearchQuery::new("alice,bob", "Gen9 OU");
        assert!(a.same_search(&b));

        let mut c = b.clone();
        c.page = 2;
        assert!(!a.same_search(&c));
    }

    #[test]
    fn test_same_search_distinguishes_blank_search_from_browse() {
        let browse = SearchQuery::default();
        assert!(!SearchQuery::new(" ", "").normalized().same_search(&browse));
        assert!(!SearchQuery::new("", ",").normalized().same_search(&browse));
        assert!(SearchQuery::new(" ", "").same_search(&SearchQuery::new(",", "")));
    }

    #[test]
    fn test_normalized_users() {
        assert_eq!(normalized_users("Alice, B o b,,"), vec!["alice", "bob"]);
        assert!(normalized_users("").is_empty());
    }
}

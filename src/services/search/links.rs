// 规范 URL 与分页/排序链接
//
// 同一搜索条件始终生成同一查询字符串，用于地址栏、分页和分享

use crate::external::{encode_query, QueryParams};
use crate::models::SearchQuery;

/// 将搜索条件转换为 URL 参数
///
/// 键顺序固定为 `user`, `format`, `private`, `page`, `sort`；
/// 默认值（空字符串、公开、第 1 页、按日期）不出现在参数中。
pub fn to_query_params(query: &SearchQuery) -> QueryParams {
    let mut params = QueryParams::new();
    params.insert_opt("user", non_empty(&query.user));
    params.insert_opt("format", non_empty(&query.format));
    params.insert_opt("private", query.is_private.then_some("1"));
    params.insert_opt("page", (query.page != 1).then(|| query.page.to_string()));
    params.insert_opt("sort", query.sort_by_rating.then_some("rating"));
    params
}

/// 搜索条件的规范 URL（相对地址，无参数时为空字符串）
pub fn canonical_url(query: &SearchQuery) -> String {
    let params = to_query_params(query);
    if params.is_empty() {
        String::new()
    } else {
        format!("?{}", encode_query(&params))
    }
}

/// 翻页链接
///
/// 仅修改页码（`page + delta`），结果小于 1 时不提供链接。
pub fn page_link(query: &SearchQuery, delta: i64) -> Option<String> {
    let page = i64::from(query.page) + delta;
    if page < 1 {
        return None;
    }
    let page = u32::try_from(page).ok()?;
    Some(canonical_url(&SearchQuery {
        page,
        ..query.clone()
    }))
}

/// 排序链接：切换排序方式并回到第 1 页
pub fn sort_link(query: &SearchQuery, by_rating: bool) -> String {
    let target = SearchQuery {
        page: 1,
        sort_by_rating: by_rating,
        ..query.clone()
    };
    canonical_url(&target.normalized())
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

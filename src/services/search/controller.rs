// 搜索控制器 - 搜索状态的唯一所有者
//
// 负责：
// - 从 URL 参数或表单推导搜索请求
// - 同步发布规范 URL
// - 为每次请求生成令牌，丢弃过期响应
//
// 控制器本身不做 IO：每个动作返回一个 `PendingFetch`，由调用方发起请求，
// 完成后通过 `complete` 交回。

use tracing::{debug, info, warn};

use super::links::{canonical_url, page_link, sort_link};
use super::parser::parse_response;
use crate::external::{decode_query, Endpoint, FetchError, QueryParams, Router};
use crate::models::{LoggedInUser, ReplayResult, SearchForm, SearchQuery};

/// 每页展示的录像数
///
/// 服务器最多返回 `PAGE_SIZE + 1` 条，多出的一条表示还有下一页。
pub const PAGE_SIZE: usize = 50;

/// 请求令牌，单调递增，不会重复使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// 搜索结果状态
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResults {
    /// 请求进行中
    Loading,
    /// 加载完成
    Ready(Vec<ReplayResult>),
    /// 请求或解析失败
    Failed(String),
}

/// 控制器持有的搜索状态
#[derive(Debug, Clone)]
pub struct SearchState {
    pub user: String,
    pub format: String,
    pub is_private: bool,
    pub page: u32,
    pub sort_by_rating: bool,
    pub results: SearchResults,
    /// 最近一次发出的请求令牌
    pub request_token: RequestToken,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            user: String::new(),
            format: String::new(),
            is_private: false,
            page: 1,
            sort_by_rating: false,
            results: SearchResults::Loading,
            request_token: RequestToken::default(),
        }
    }
}

impl SearchState {
    /// 当前已提交的搜索条件
    pub fn query(&self) -> SearchQuery {
        SearchQuery {
            user: self.user.clone(),
            format: self.format.clone(),
            is_private: self.is_private,
            page: self.page,
            sort_by_rating: self.sort_by_rating,
        }
    }

    /// 已加载的结果，加载中或失败时为 `None`
    pub fn results(&self) -> Option<&[ReplayResult]> {
        match &self.results {
            SearchResults::Ready(results) => Some(results),
            _ => None,
        }
    }

    pub fn result_error(&self) -> Option<&str> {
        match &self.results {
            SearchResults::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.results, SearchResults::Loading)
    }

    fn commit(&mut self, query: &SearchQuery) {
        self.user = query.user.clone();
        self.format = query.format.clone();
        self.is_private = query.is_private;
        self.page = query.page;
        self.sort_by_rating = query.sort_by_rating;
    }
}

/// 已发出但尚未完成的请求
///
/// 携带发出时的令牌和搜索条件快照；完成时只依据这里的令牌判断是否过期。
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFetch {
    pub token: RequestToken,
    pub endpoint: Endpoint,
    pub query: QueryParams,
    /// 响应是否必须带 `]` 前缀
    pub private_convention: bool,
    pub snapshot: SearchQuery,
}

/// 搜索控制器
pub struct SearchController<R: Router> {
    state: SearchState,
    router: R,
    logged_in_user: Option<LoggedInUser>,
    last_token: u64,
}

impl<R: Router> SearchController<R> {
    pub fn new(router: R) -> Self {
        Self {
            state: SearchState::default(),
            router,
            logged_in_user: None,
            last_token: 0,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn logged_in_user(&self) -> Option<&LoggedInUser> {
        self.logged_in_user.as_ref()
    }

    /// 注入登录身份（由外部登录检查得到）
    pub fn set_logged_in_user(&mut self, user: Option<LoggedInUser>) {
        self.logged_in_user = user;
    }

    /// 外部 URL 变化时调用
    ///
    /// 与当前搜索语义相同（用户名/格式规范化后相同，页码、排序、私有标志相同）时
    /// 不做任何事，返回 `None`；否则等同于 [`Self::search`]。
    pub fn apply_incoming_query(&mut self, query: SearchQuery) -> Option<PendingFetch> {
        let query = query.normalized();
        if self.has_issued_request() && self.state.query().same_search(&query) {
            debug!("查询条件未变化，跳过刷新: {:?}", query);
            return None;
        }
        Some(self.search(query))
    }

    /// 解码 URL 查询字符串后调用 [`Self::apply_incoming_query`]
    pub fn apply_incoming_url(&mut self, fragment: &str) -> Option<PendingFetch> {
        let params = decode_query(fragment);
        self.apply_incoming_query(SearchQuery::from_params(&params))
    }

    /// 发起搜索
    ///
    /// 用户名和格式都为空时转为浏览最近录像。
    pub fn search(&mut self, query: SearchQuery) -> PendingFetch {
        let query = query.normalized();
        if query.is_browse() {
            return self.recent();
        }

        self.state.commit(&query);

        let url = canonical_url(&query);
        info!("发布搜索 URL: {}", url);
        self.router.replace(&url);

        self.state.results = SearchResults::Loading;
        let token = self.mint_token();

        let endpoint = if query.is_private {
            Endpoint::SearchPrivate
        } else {
            Endpoint::Search
        };
        let mut params = QueryParams::new();
        params.insert("username", query.user.as_str());
        params.insert("format", query.format.as_str());
        params.insert("page", query.page.to_string());
        params.insert_opt("sort", query.sort_by_rating.then_some("rating"));

        info!(
            "发起请求 {} (令牌 {}) user={:?} format={:?} page={}",
            endpoint.path(),
            token.value(),
            query.user,
            query.format,
            query.page
        );

        PendingFetch {
            token,
            endpoint,
            query: params,
            private_convention: query.is_private,
            snapshot: query,
        }
    }

    /// 提交搜索表单：回到第 1 页，保留当前排序偏好
    pub fn submit(&mut self, form: SearchForm) -> PendingFetch {
        self.search(SearchQuery {
            user: form.user,
            format: form.format,
            is_private: form.is_private,
            page: 1,
            sort_by_rating: self.state.sort_by_rating,
        })
    }

    /// 搜索当前登录用户的录像，未登录时返回 `None`
    pub fn search_logged_in(&mut self, form: SearchForm) -> Option<PendingFetch> {
        let userid = self.logged_in_user.as_ref()?.userid.clone();
        Some(self.submit(SearchForm {
            user: userid,
            ..form
        }))
    }

    /// 取消搜索，回到浏览模式
    pub fn cancel(&mut self) -> PendingFetch {
        self.recent()
    }

    /// 浏览最近上传的录像
    pub fn recent(&mut self) -> PendingFetch {
        let browse = SearchQuery::default();
        self.state.commit(&browse);

        info!("发布浏览 URL");
        self.router.replace("");

        self.state.results = SearchResults::Loading;
        let token = self.mint_token();
        info!("发起请求 {} (令牌 {})", Endpoint::Recent.path(), token.value());

        PendingFetch {
            token,
            endpoint: Endpoint::Recent,
            query: QueryParams::new(),
            private_convention: true,
            snapshot: browse,
        }
    }

    /// 请求完成
    ///
    /// 仅当令牌仍是最新时才更新结果；返回是否已应用。
    pub fn complete(&mut self, pending: PendingFetch, outcome: Result<String, FetchError>) -> bool {
        if pending.token != self.state.request_token {
            debug!(
                "丢弃过期响应 {} (令牌 {}，当前 {})",
                pending.endpoint.path(),
                pending.token.value(),
                self.state.request_token.value()
            );
            return false;
        }

        self.state.results = match outcome {
            Ok(text) => match parse_response(&text, pending.private_convention) {
                Ok(results) => {
                    debug!("加载了 {} 条录像 (令牌 {})", results.len(), pending.token.value());
                    SearchResults::Ready(results)
                }
                Err(message) => {
                    warn!("无法识别的响应 {}: {}", pending.endpoint.path(), message);
                    SearchResults::Failed(message)
                }
            },
            Err(e) => {
                warn!("请求 {} 失败: {}", pending.endpoint.path(), e);
                SearchResults::Failed(e.to_string())
            }
        };
        true
    }

    /// 是否处于搜索模式（非浏览模式）
    pub fn is_actively_searching(&self) -> bool {
        !self.state.user.is_empty() || !self.state.format.is_empty()
    }

    /// 本页展示的结果（最多 [`PAGE_SIZE`] 条）
    pub fn visible_results(&self) -> &[ReplayResult] {
        let results = self.state.results().unwrap_or_default();
        &results[..results.len().min(PAGE_SIZE)]
    }

    pub fn has_next_page(&self) -> bool {
        self.state.results().map_or(0, |results| results.len()) > PAGE_SIZE
    }

    /// 是否提供“按日期/按评分”排序链接
    pub fn sort_links_offered(&self) -> bool {
        self.is_actively_searching() && self.state.query().allows_rating_sort()
    }

    /// 上一页链接，第 1 页或浏览模式时为 `None`
    pub fn previous_page_link(&self) -> Option<String> {
        if !self.is_actively_searching() {
            return None;
        }
        page_link(&self.state.query(), -1).map(|suffix| self.router.href(&suffix))
    }

    /// 下一页链接，仅在结果超过一页时提供
    pub fn next_page_link(&self) -> Option<String> {
        if !self.is_actively_searching() || !self.has_next_page() {
            return None;
        }
        page_link(&self.state.query(), 1).map(|suffix| self.router.href(&suffix))
    }

    /// 排序链接
    pub fn sort_link(&self, by_rating: bool) -> Option<String> {
        if !self.sort_links_offered() {
            return None;
        }
        Some(self.router.href(&sort_link(&self.state.query(), by_rating)))
    }

    /// 录像链接，当前搜索的用户是第二位玩家时切换视角
    pub fn replay_link(&self, replay: &ReplayResult) -> String {
        self.router.href(&replay.permalink(&self.state.user))
    }

    fn has_issued_request(&self) -> bool {
        self.state.request_token != RequestToken::default()
    }

    fn mint_token(&mut self) -> RequestToken {
        self.last_token += 1;
        let token = RequestToken(self.last_token);
        self.state.request_token = token;
        debug!("生成请求令牌 {}", token.value());
        token
    }
}

// 搜索模块 - 录像搜索/浏览控制
//
// 本模块提供：
// - 搜索控制器（状态同步 + 过期响应过滤）
// - 响应解析
// - 规范 URL 与分页链接
// - 客户端配置

pub mod config;
pub mod controller;
pub mod error;
pub mod links;
pub mod parser;

pub use config::ClientConfig;
pub use controller::{
    PendingFetch, RequestToken, SearchController, SearchResults, SearchState, PAGE_SIZE,
};
pub use error::ConfigError;
pub use links::{canonical_url, page_link, sort_link, to_query_params};
pub use parser::{parse_response, RESPONSE_SENTINEL};

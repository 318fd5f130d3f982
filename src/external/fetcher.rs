use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::error::FetchError;
use super::query::QueryParams;

/// 录像 API 端点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// 公开录像搜索
    Search,
    /// 私有录像搜索（需要登录会话）
    SearchPrivate,
    /// 最近上传的录像
    Recent,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Search => "/api/replays/search",
            Endpoint::SearchPrivate => "/api/replays/searchprivate",
            Endpoint::Recent => "/api/replays/recent",
        }
    }
}

/// 结果获取器：对指定端点发起 GET 请求并返回响应文本
#[async_trait]
pub trait ResultFetcher: Send + Sync {
    async fn get(&self, endpoint: Endpoint, query: &QueryParams) -> Result<String, FetchError>;
}

/// 基于 reqwest 的 HTTP 获取器
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
}

impl HttpFetcher {
    /// 创建 HTTP 获取器
    ///
    /// # 参数
    /// - `base_url`: 录像服务器地址，如 `https://replay.pokemonshowdown.com`
    /// - `timeout`: 单次请求超时
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| FetchError::Client(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl ResultFetcher for HttpFetcher {
    async fn get(&self, endpoint: Endpoint, query: &QueryParams) -> Result<String, FetchError> {
        let url = self.base_url.join(endpoint.path())?;
        tracing::debug!("请求 {} 参数 {:?}", url, query);

        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query.as_pairs());
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }
}

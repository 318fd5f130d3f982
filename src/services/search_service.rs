// 搜索服务 - 驱动搜索控制器发起异步请求
//
// 控制器放在 Arc<Mutex> 中，锁只在同步的状态变更期间持有；
// 网络请求期间不持锁，因此多个搜索可以同时在途，由请求令牌决定谁能生效。

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::external::{ResultFetcher, Router};
use crate::models::{SearchForm, SearchQuery};
use crate::services::search::{PendingFetch, SearchController, SearchState};

pub struct SearchService<R: Router> {
    controller: Arc<Mutex<SearchController<R>>>,
    fetcher: Arc<dyn ResultFetcher>,
}

impl<R: Router> Clone for SearchService<R> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<R: Router + Send> SearchService<R> {
    pub fn new(controller: SearchController<R>, fetcher: Arc<dyn ResultFetcher>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            fetcher,
        }
    }

    /// 共享的控制器（供展示层读取状态）
    pub fn controller(&self) -> Arc<Mutex<SearchController<R>>> {
        Arc::clone(&self.controller)
    }

    /// 当前搜索状态的副本
    pub async fn snapshot(&self) -> SearchState {
        self.controller.lock().await.state().clone()
    }

    /// 执行请求并交回控制器，返回结果是否被应用
    pub async fn dispatch(&self, pending: PendingFetch) -> bool {
        let outcome = self.fetcher.get(pending.endpoint, &pending.query).await;
        self.controller.lock().await.complete(pending, outcome)
    }

    /// 处理外部 URL 变化；无需刷新时返回 `None`
    pub async fn apply_incoming_url(&self, fragment: &str) -> Option<bool> {
        let pending = self.controller.lock().await.apply_incoming_url(fragment)?;
        Some(self.dispatch(pending).await)
    }

    pub async fn apply_incoming_query(&self, query: SearchQuery) -> Option<bool> {
        let pending = self.controller.lock().await.apply_incoming_query(query)?;
        Some(self.dispatch(pending).await)
    }

    pub async fn search(&self, query: SearchQuery) -> bool {
        let pending = self.controller.lock().await.search(query);
        self.dispatch(pending).await
    }

    pub async fn submit(&self, form: SearchForm) -> bool {
        let pending = self.controller.lock().await.submit(form);
        self.dispatch(pending).await
    }

    /// 搜索当前登录用户的录像；未登录时返回 `None`
    pub async fn search_logged_in(&self, form: SearchForm) -> Option<bool> {
        let pending = self.controller.lock().await.search_logged_in(form)?;
        Some(self.dispatch(pending).await)
    }

    pub async fn cancel(&self) -> bool {
        let pending = self.controller.lock().await.cancel();
        self.dispatch(pending).await
    }

    pub async fn recent(&self) -> bool {
        let pending = self.controller.lock().await.recent();
        self.dispatch(pending).await
    }
}

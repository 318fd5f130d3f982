pub mod search;
pub mod search_service;

pub use search::{
    canonical_url, parse_response, ClientConfig, ConfigError, PendingFetch, RequestToken,
    SearchController, SearchResults, SearchState,
};
pub use search_service::SearchService;

pub mod error;
pub mod fetcher;
pub mod query;
pub mod router;

pub use error::FetchError;
pub use fetcher::{Endpoint, HttpFetcher, ResultFetcher};
pub use query::{decode_query, encode_query, QueryParams};
pub use router::{MemoryRouter, Router};

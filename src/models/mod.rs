pub mod replay;
pub mod search;

pub use replay::{format_id, to_id, ReplayResult, FORMAT_RENAME_CUTOVER};
pub use search::{normalized_users, LoggedInUser, SearchForm, SearchQuery};

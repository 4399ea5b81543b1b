pub mod catalog;
pub mod config;
pub mod error;
pub mod matcher;
pub mod paging;
pub mod permission;
pub mod query;
pub mod storage;

pub use catalog::{CatalogAccess, ResourceKind, ResourceNode};
pub use config::SearchConfig;
pub use error::SearchError;
pub use paging::{ItemSummary, SearchResultPage};
pub use permission::{AccessLevel, PermissionAccess, Principal, UserIdentity};
pub use query::{ScopedSearch, SearchQuery};

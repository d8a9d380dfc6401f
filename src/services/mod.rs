//! Business logic services.
//!
//! The trending engine is split into independent pieces so each can be
//! tested without a server:
//! - `change_source` / `gerrit_client`: the paginated remote query
//! - `fetcher`: drains all pages of a query
//! - `scoring` and `ranker`: pure scoring and ordering
//! - `cache_store`: per-account, time-gated result cache
//! - `trending`: the orchestrating pipeline

pub mod cache_store;
pub mod change_source;
pub mod credentials;
pub mod fetcher;
pub mod gerrit_client;
pub mod preferences;
pub mod ranker;
pub mod scoring;
pub mod trending;

pub use cache_store::CacheStore;
pub use change_source::{ChangeOption, ChangeSource};
pub use credentials::CredentialService;
pub use gerrit_client::{GerritClient, GerritClientConfig};
pub use preferences::{PreferenceProvider, SqlitePreferences};
pub use trending::{ResultOrigin, TrendingPipeline, TrendingResult};

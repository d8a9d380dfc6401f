//! Change Trends - ranks the hottest open changes on a Gerrit server.
//!
//! Every open change is fetched, scored from five activity signals plus a
//! recency bonus, filtered, sorted and truncated. Results are cached per
//! account for an hour because a full fetch is expensive for both sides.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use error::AppError;
pub use models::{AccountKey, ChangeRecord, ScoredChange};
pub use services::{TrendingPipeline, TrendingResult};

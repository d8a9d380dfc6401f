//! Data models for the trending engine.
//!
//! Change records are decoded from the review server (or from a cache
//! payload) and never mutated; scores are carried beside them.

pub mod account;
pub mod change;
pub mod scored_change;

// Re-exports for convenient access
pub use account::AccountKey;
pub use change::{AccountRef, ChangeMessage, ChangeRecord, ReviewerStatus, RevisionInfo};
pub use scored_change::ScoredChange;

//! Contract for the paginated remote change query.

use crate::error::AppError;
use crate::models::ChangeRecord;
use std::future::Future;

/// Extra detail the server should attach to each returned change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOption {
    DetailedAccounts,
    Labels,
    Reviewed,
    Messages,
    CurrentRevision,
}

impl ChangeOption {
    /// Wire name of the option (`o=` query parameter).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DetailedAccounts => "DETAILED_ACCOUNTS",
            Self::Labels => "LABELS",
            Self::Reviewed => "REVIEWED",
            Self::Messages => "MESSAGES",
            Self::CurrentRevision => "CURRENT_REVISION",
        }
    }
}

impl std::fmt::Display for ChangeOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A paginated source of change records.
///
/// Implementations return at most `limit` records starting at `offset`.
/// Errors are returned as-is; callers decide whether a failed page is fatal.
pub trait ChangeSource {
    fn get_page(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
        options: &[ChangeOption],
    ) -> impl Future<Output = Result<Vec<ChangeRecord>, AppError>> + Send;
}

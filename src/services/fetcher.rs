//! Paginated fetcher.
//!
//! Drains a [`ChangeSource`] page by page into one complete result set.

use crate::error::AppError;
use crate::models::ChangeRecord;
use crate::services::change_source::{ChangeOption, ChangeSource};

/// Number of changes requested per page.
pub const FETCH_PAGE_SIZE: usize = 75;

/// Detail the scoring engine needs on every change.
pub const TRENDING_OPTIONS: &[ChangeOption] = &[
    ChangeOption::DetailedAccounts,
    ChangeOption::Labels,
    ChangeOption::Reviewed,
    ChangeOption::Messages,
    ChangeOption::CurrentRevision,
];

/// Fetch every change matching `query`.
///
/// Pages are requested sequentially at offsets `0, page_size, 2 * page_size, ...`
/// until a page comes back short (or empty). The first failed page aborts the
/// whole fetch; no partial result is returned.
pub async fn fetch_all<S: ChangeSource>(
    source: &S,
    query: &str,
    page_size: usize,
) -> Result<Vec<ChangeRecord>, AppError> {
    if page_size == 0 {
        return Err(AppError::invalid_input_field(
            "Page size must be positive",
            "page_size",
        ));
    }

    let mut all_changes = Vec::new();
    let mut offset = 0usize;

    loop {
        let page = source
            .get_page(query, page_size, offset, TRENDING_OPTIONS)
            .await?;
        let fetched = page.len();
        all_changes.extend(page);

        log::debug!(
            "Fetched {} changes at offset {} ({} total)",
            fetched,
            offset,
            all_changes.len()
        );

        if fetched < page_size {
            break;
        }
        offset += page_size;
    }

    Ok(all_changes)
}

//! Account and preference provider consumed by the trending pipeline.

use crate::db::pool::DbPool;
use crate::db::preferences;
use crate::error::AppError;
use crate::models::AccountKey;
use std::future::Future;

/// Default number of trending changes shown to an account.
pub const DEFAULT_MAX_FETCHED_ITEMS: usize = 25;

/// Supplies the requesting account and its result-size preference.
pub trait PreferenceProvider {
    fn current_account(&self) -> AccountKey;

    fn max_fetched_items(&self, account: &AccountKey) -> impl Future<Output = usize> + Send;
}

/// Preferences stored in the cache database, with a fallback default.
#[derive(Debug, Clone)]
pub struct SqlitePreferences {
    pool: DbPool,
    account: AccountKey,
    default_max_items: usize,
}

impl SqlitePreferences {
    pub fn new(pool: DbPool, account: AccountKey, default_max_items: usize) -> Self {
        Self {
            pool,
            account,
            default_max_items,
        }
    }

    /// Store the maximum trending item count for the current account.
    pub async fn set_max_fetched_items(&self, max_items: usize) -> Result<(), AppError> {
        if max_items == 0 {
            return Err(AppError::invalid_input_field(
                "Maximum item count must be positive",
                "max_fetched_items",
            ));
        }
        let value = i64::try_from(max_items)
            .map_err(|_| AppError::invalid_input_field("Value too large", "max_fetched_items"))?;
        preferences::set_max_fetched_items(&self.pool, self.account.as_str(), value).await
    }
}

impl PreferenceProvider for SqlitePreferences {
    fn current_account(&self) -> AccountKey {
        self.account.clone()
    }

    async fn max_fetched_items(&self, account: &AccountKey) -> usize {
        match preferences::get_max_fetched_items(&self.pool, account.as_str()).await {
            Ok(Some(value)) => usize::try_from(value).unwrap_or(self.default_max_items),
            Ok(None) => self.default_max_items,
            Err(e) => {
                log::warn!("Failed to read preferences for {}: {}", account, e);
                self.default_max_items
            }
        }
    }
}

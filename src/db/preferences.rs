//! Database queries for per-account preferences.

use crate::db::pool::DbPool;
use crate::error::AppError;

/// Get the stored maximum number of trending items for an account.
pub async fn get_max_fetched_items(
    pool: &DbPool,
    account_key: &str,
) -> Result<Option<i64>, AppError> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT max_fetched_items FROM account_preferences WHERE account_key = ?")
            .bind(account_key)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(max,)| max))
}

/// Store the maximum number of trending items for an account.
pub async fn set_max_fetched_items(
    pool: &DbPool,
    account_key: &str,
    max_fetched_items: i64,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO account_preferences (account_key, max_fetched_items, updated_at)
        VALUES (?, ?, strftime('%s', 'now'))
        ON CONFLICT(account_key) DO UPDATE SET
            max_fetched_items = excluded.max_fetched_items,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(account_key)
    .bind(max_fetched_items)
    .execute(pool)
    .await?;

    Ok(())
}

//! Database queries for the per-account trending cache.

use crate::db::pool::DbPool;
use crate::error::AppError;
use sqlx::FromRow;

/// A raw row of the `trending_cache` table.
#[derive(Debug, Clone, FromRow)]
pub struct TrendingCacheRow {
    pub account_key: String,
    /// Epoch millis of the write.
    pub written_at: i64,
    pub payload: Vec<u8>,
}

/// Replace the cache entry for an account wholesale.
pub async fn upsert_cache_entry(
    pool: &DbPool,
    account_key: &str,
    written_at: i64,
    payload: &[u8],
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT OR REPLACE INTO trending_cache (account_key, written_at, payload) VALUES (?, ?, ?)",
    )
    .bind(account_key)
    .bind(written_at)
    .bind(payload)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the cache entry for an account, if one was ever written.
pub async fn get_cache_entry(
    pool: &DbPool,
    account_key: &str,
) -> Result<Option<TrendingCacheRow>, AppError> {
    let row = sqlx::query_as::<_, TrendingCacheRow>(
        "SELECT account_key, written_at, payload FROM trending_cache WHERE account_key = ?",
    )
    .bind(account_key)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Get only the write time of an account's cache entry.
pub async fn get_cache_age(pool: &DbPool, account_key: &str) -> Result<Option<i64>, AppError> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT written_at FROM trending_cache WHERE account_key = ?")
            .bind(account_key)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(written_at,)| written_at))
}

/// Delete the cache entry for an account.
pub async fn delete_cache_entry(pool: &DbPool, account_key: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM trending_cache WHERE account_key = ?")
        .bind(account_key)
        .execute(pool)
        .await?;

    Ok(())
}

//! Time-gated cache of scored trending results, one entry per account.
//!
//! Reads and writes never fail the caller: a read problem is a cache miss
//! and a write problem means the next cycle refetches. Both are logged.

use crate::db::pool::DbPool;
use crate::db::trending_cache;
use crate::error::AppError;
use crate::models::{AccountKey, ScoredChange};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Maximum age of a cached result.
pub const CACHE_TTL: TimeDelta = TimeDelta::hours(1);

/// Version of the payload layout written by [`encode_payload`].
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// Decide whether a cached result written at `written_at` may be served.
pub fn should_use_cache(
    now: DateTime<Utc>,
    written_at: DateTime<Utc>,
    force_refresh: bool,
    ttl: TimeDelta,
) -> bool {
    !force_refresh && now - written_at < ttl
}

/// A decoded cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub account_key: AccountKey,
    /// Write time taken from the cache row, not from the payload.
    pub written_at: DateTime<Utc>,
    pub items: Vec<ScoredChange>,
}

/// Serialized payload layout.
#[derive(Debug, Deserialize)]
struct CachePayload {
    schema_version: u32,
    /// Epoch millis. Informational only; staleness uses the row.
    #[allow(dead_code)]
    written_at: i64,
    items: Vec<ScoredChange>,
}

/// Encode scored changes into a cache payload.
pub fn encode_payload(items: &[ScoredChange], written_at: DateTime<Utc>) -> Result<Vec<u8>, AppError> {
    #[derive(Serialize)]
    struct PayloadRef<'a> {
        schema_version: u32,
        written_at: i64,
        items: &'a [ScoredChange],
    }

    serde_json::to_vec(&PayloadRef {
        schema_version: CACHE_SCHEMA_VERSION,
        written_at: written_at.timestamp_millis(),
        items,
    })
    .map_err(|e| AppError::cache(format!("Failed to encode payload: {}", e)))
}

/// Decode a cache payload. Payloads of another schema version are rejected.
pub fn decode_payload(bytes: &[u8]) -> Result<Vec<ScoredChange>, AppError> {
    let payload: CachePayload = serde_json::from_slice(bytes)
        .map_err(|e| AppError::cache(format!("Failed to decode payload: {}", e)))?;

    if payload.schema_version != CACHE_SCHEMA_VERSION {
        return Err(AppError::cache(format!(
            "Unsupported payload schema version {} (expected {})",
            payload.schema_version, CACHE_SCHEMA_VERSION
        )));
    }

    Ok(payload.items)
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::cache(format!("Invalid cache timestamp {}", millis)))
}

/// SQLite-backed trending cache.
#[derive(Debug, Clone)]
pub struct CacheStore {
    pool: DbPool,
}

impl CacheStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Write time of the account's entry, if any.
    pub async fn written_at(&self, account: &AccountKey) -> Option<DateTime<Utc>> {
        let result = match trending_cache::get_cache_age(&self.pool, account.as_str()).await {
            Ok(Some(millis)) => from_millis(millis).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            log::warn!("Failed to read trending cache age for {}: {}", account, e);
            None
        })
    }

    /// Read and decode the account's entry. Any failure is a miss.
    pub async fn read(&self, account: &AccountKey) -> Option<CacheEntry> {
        match self.try_read(account).await {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Failed to read trending cache for {}: {}", account, e);
                None
            }
        }
    }

    async fn try_read(&self, account: &AccountKey) -> Result<Option<CacheEntry>, AppError> {
        let Some(row) = trending_cache::get_cache_entry(&self.pool, account.as_str()).await? else {
            return Ok(None);
        };

        let items = decode_payload(&row.payload)
            .map_err(|e| AppError::cache_for_account(e.to_string(), account.as_str()))?;

        Ok(Some(CacheEntry {
            account_key: account.clone(),
            written_at: from_millis(row.written_at)?,
            items,
        }))
    }

    /// Read the account's entry only if the cache gate allows it.
    ///
    /// A forced refresh never touches the database.
    pub async fn read_fresh(
        &self,
        account: &AccountKey,
        now: DateTime<Utc>,
        force_refresh: bool,
    ) -> Option<CacheEntry> {
        if force_refresh {
            return None;
        }

        let written_at = self.written_at(account).await?;
        if !should_use_cache(now, written_at, force_refresh, CACHE_TTL) {
            log::debug!(
                "Trending cache for {} is stale (written {})",
                account,
                written_at
            );
            return None;
        }

        self.read(account).await
    }

    /// Replace the account's entry. Failures are logged and swallowed.
    pub async fn write(&self, account: &AccountKey, items: &[ScoredChange], written_at: DateTime<Utc>) {
        let result = match encode_payload(items, written_at) {
            Ok(payload) => {
                trending_cache::upsert_cache_entry(
                    &self.pool,
                    account.as_str(),
                    written_at.timestamp_millis(),
                    &payload,
                )
                .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => log::debug!("Cached {} trending changes for {}", items.len(), account),
            Err(e) => log::warn!("Failed to write trending cache for {}: {}", account, e),
        }
    }

    /// Drop the account's entry so the next fetch goes to the server.
    pub async fn invalidate(&self, account: &AccountKey) -> Result<(), AppError> {
        trending_cache::delete_cache_entry(&self.pool, account.as_str()).await
    }
}

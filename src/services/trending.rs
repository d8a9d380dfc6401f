//! Trending pipeline.
//!
//! Composes the cache store, paginated fetcher, scoring engine and ranker:
//!
//! ```text
//! CHECK_CACHE -> CACHE_HIT -> DONE
//!             -> CACHE_MISS -> FETCHING -> SCORING -> RANKING -> WRITE_CACHE -> DONE
//! ```
//!
//! A forced refresh starts at `FETCHING`. One invocation per account is
//! expected at a time; concurrent invocations for the same account race on
//! the cache write and the last writer wins.

use crate::error::AppError;
use crate::models::{AccountKey, ScoredChange};
use crate::services::cache_store::CacheStore;
use crate::services::change_source::ChangeSource;
use crate::services::fetcher::{fetch_all, FETCH_PAGE_SIZE};
use crate::services::preferences::PreferenceProvider;
use crate::services::ranker::rank;
use crate::services::scoring::score_all;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Where a trending result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultOrigin {
    Cache,
    Remote,
}

/// Ranked trending changes handed to the host.
#[derive(Debug, Clone, Serialize)]
pub struct TrendingResult {
    pub changes: Vec<ScoredChange>,
    pub origin: ResultOrigin,

    /// When the ranked list was computed (the cache write time on a hit).
    pub computed_at: DateTime<Utc>,

    /// Always false: the full trending set is computed in one shot, so the
    /// host must not request further pages.
    pub has_more: bool,
}

/// Pipeline stages, used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    CheckCache,
    CacheHit,
    CacheMiss,
    Fetching,
    Scoring,
    Ranking,
    WriteCache,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CheckCache => "CHECK_CACHE",
            Self::CacheHit => "CACHE_HIT",
            Self::CacheMiss => "CACHE_MISS",
            Self::Fetching => "FETCHING",
            Self::Scoring => "SCORING",
            Self::Ranking => "RANKING",
            Self::WriteCache => "WRITE_CACHE",
            Self::Done => "DONE",
        };
        f.write_str(name)
    }
}

fn enter(account: &AccountKey, state: PipelineState) {
    log::debug!("[trending] {}: {}", account, state);
}

/// Cache-gated trending computation for one review server.
pub struct TrendingPipeline<S, P> {
    source: S,
    preferences: P,
    cache: CacheStore,
}

impl<S, P> TrendingPipeline<S, P>
where
    S: ChangeSource + Sync,
    P: PreferenceProvider + Sync,
{
    pub fn new(source: S, preferences: P, cache: CacheStore) -> Self {
        Self {
            source,
            preferences,
            cache,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn preferences(&self) -> &P {
        &self.preferences
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Trending changes for `query`, served from the cache when fresh unless
    /// `force_refresh` is set.
    pub async fn fetch(&self, query: &str, force_refresh: bool) -> Result<TrendingResult, AppError> {
        self.fetch_at(query, force_refresh, Utc::now()).await
    }

    /// Recompute trending changes for `query`, ignoring the cache.
    pub async fn refresh(&self, query: &str) -> Result<TrendingResult, AppError> {
        self.fetch(query, true).await
    }

    /// [`fetch`](Self::fetch) evaluated at an explicit time.
    pub async fn fetch_at(
        &self,
        query: &str,
        force_refresh: bool,
        now: DateTime<Utc>,
    ) -> Result<TrendingResult, AppError> {
        let start = Instant::now();
        let account = self.preferences.current_account();
        let max_items = self.preferences.max_fetched_items(&account).await;

        if !force_refresh {
            enter(&account, PipelineState::CheckCache);
            if let Some(entry) = self.cache.read_fresh(&account, now, force_refresh).await {
                enter(&account, PipelineState::CacheHit);
                // Cached lists are already ranked; re-ranking only applies a
                // lowered item limit.
                let changes = rank(entry.items, max_items);
                enter(&account, PipelineState::Done);
                log::info!(
                    "Served {} trending changes for {} from cache",
                    changes.len(),
                    account
                );
                return Ok(TrendingResult {
                    changes,
                    origin: ResultOrigin::Cache,
                    computed_at: entry.written_at,
                    has_more: false,
                });
            }
            enter(&account, PipelineState::CacheMiss);
        }

        enter(&account, PipelineState::Fetching);
        let changes = fetch_all(&self.source, query, FETCH_PAGE_SIZE).await?;
        let fetched = changes.len();

        enter(&account, PipelineState::Scoring);
        let scored = score_all(changes, now);

        enter(&account, PipelineState::Ranking);
        let ranked = rank(scored, max_items);

        enter(&account, PipelineState::WriteCache);
        self.cache.write(&account, &ranked, now).await;

        enter(&account, PipelineState::Done);
        log::info!(
            "Ranked {} of {} changes for {} in {}ms",
            ranked.len(),
            fetched,
            account,
            start.elapsed().as_millis()
        );

        Ok(TrendingResult {
            changes: ranked,
            origin: ResultOrigin::Remote,
            computed_at: now,
            has_more: false,
        })
    }
}

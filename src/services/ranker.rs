//! Ranking of scored changes.

use crate::models::ScoredChange;
use crate::services::scoring::TRENDING_MIN_SCORE;
use std::cmp::Ordering;

/// Trending order: higher score first, then most recently updated, then id
/// so equal records still sort deterministically.
pub fn trending_order(a: &ScoredChange, b: &ScoredChange) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.change.updated.cmp(&a.change.updated))
        .then_with(|| a.change.id.cmp(&b.change.id))
}

/// Keep qualifying changes, sort them in trending order and keep the top
/// `max_items`.
pub fn rank(scored: Vec<ScoredChange>, max_items: usize) -> Vec<ScoredChange> {
    let mut trending: Vec<ScoredChange> = scored
        .into_iter()
        .filter(|c| c.score >= TRENDING_MIN_SCORE)
        .collect();

    trending.sort_by(trending_order);
    trending.truncate(max_items);
    trending
}

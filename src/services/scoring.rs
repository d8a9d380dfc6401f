//! Trending score computation.
//!
//! Five activity signals are each clipped and scaled into a sub-score, then
//! summed together with a recency bonus:
//!
//! | Signal                         | weight | min | max |
//! |--------------------------------|--------|-----|-----|
//! | patch sets                     | 4      | 3   | 20  |
//! | human votes                    | 3      | 1   | 10  |
//! | human messages                 | 3      | 1   | 20  |
//! | distinct human commenters      | 4      | 3   | 7   |
//! | active reviewers               | 3      | 5   | 15  |
//! | updated in the last two hours  | +3     |     |     |
//!
//! These constants have no documented derivation. They are kept as-is so
//! scores stay comparable with earlier releases.

use crate::models::{ChangeRecord, ReviewerStatus, ScoredChange};
use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::OnceLock;

/// A change qualifies as trending at or above this score.
pub const TRENDING_MIN_SCORE: u32 = 8;

/// Highest score a change can reach.
pub const TRENDING_MAX_SCORE: u32 = 20;

/// Bonus for changes updated within [`RECENCY_WINDOW`].
pub const RECENCY_BONUS: u32 = 3;

pub const RECENCY_WINDOW: TimeDelta = TimeDelta::hours(2);

/// Clipping and scaling parameters of one signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalWeight {
    pub weight: f32,
    pub min: u32,
    pub max: u32,
}

impl SignalWeight {
    pub const fn new(weight: f32, min: u32, max: u32) -> Self {
        Self { weight, min, max }
    }

    pub fn apply(&self, value: u32) -> u32 {
        sub_score(value, self.weight, self.min, self.max)
    }
}

pub const PATCHSETS: SignalWeight = SignalWeight::new(4.0, 3, 20);
pub const VOTES: SignalWeight = SignalWeight::new(3.0, 1, 10);
pub const MESSAGES: SignalWeight = SignalWeight::new(3.0, 1, 20);
pub const COMMENTERS: SignalWeight = SignalWeight::new(4.0, 3, 7);
pub const REVIEWERS: SignalWeight = SignalWeight::new(3.0, 5, 15);

/// Scale `value` into `0..=weight`.
///
/// Below `min` scores nothing, at or above `max` scores the full weight
/// (truncated), and values in between scale linearly and round half up.
pub fn sub_score(value: u32, weight: f32, min: u32, max: u32) -> u32 {
    if value < min {
        return 0;
    }
    if value >= max {
        return weight as u32;
    }

    let scaled = (value - min) as f32 * weight / (max - min) as f32;
    scaled.round() as u32
}

/// Per-signal contribution to a change's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub patchsets: u32,
    pub votes: u32,
    pub messages: u32,
    pub commenters: u32,
    pub reviewers: u32,
    pub recency: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.patchsets + self.votes + self.messages + self.commenters + self.reviewers + self.recency
    }

    pub fn is_trending(&self) -> bool {
        self.total() >= TRENDING_MIN_SCORE
    }
}

fn vote_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[+-][0-9]").expect("vote pattern is valid"))
}

/// Heuristic vote detection: the first line of the message carries a signed
/// digit, as in `Patch Set 3: Code-Review+2`.
///
/// If the text starts with a newline the whole text is inspected.
pub fn is_vote_message(text: &str) -> bool {
    let first_line = match text.find('\n') {
        Some(pos) if pos > 0 => &text[..pos],
        _ => text,
    };
    vote_pattern().is_match(first_line)
}

/// Check if a message carries a comment paragraph after its first line,
/// as opposed to a bare vote or status line.
pub fn has_comment_body(text: &str) -> bool {
    text.find("\n\n").is_some_and(|pos| pos > 0)
}

/// Patch set number of the current revision, or 0 if unknown.
pub fn count_patchsets(change: &ChangeRecord) -> u32 {
    change.current_patchset().unwrap_or(0)
}

/// Human messages that record a vote.
pub fn count_votes(change: &ChangeRecord) -> u32 {
    change
        .human_messages()
        .filter(|m| is_vote_message(&m.message))
        .count() as u32
}

/// Messages written by humans.
pub fn count_messages(change: &ChangeRecord) -> u32 {
    change.human_messages().count() as u32
}

/// Distinct human authors that wrote an actual comment.
pub fn count_commenters(change: &ChangeRecord) -> u32 {
    let accounts: HashSet<i64> = change
        .human_messages()
        .filter(|m| has_comment_body(&m.message))
        .filter_map(|m| m.author.as_ref().map(|a| a.account_id))
        .collect();
    accounts.len() as u32
}

/// Reviewers and CCs still attached to the change.
pub fn count_reviewers(change: &ChangeRecord) -> u32 {
    change
        .reviewers
        .iter()
        .filter(|(status, _)| **status != ReviewerStatus::Removed)
        .map(|(_, accounts)| accounts.len() as u32)
        .sum()
}

/// Check if the change was updated strictly less than two hours before `now`.
pub fn is_recent(change: &ChangeRecord, now: DateTime<Utc>) -> bool {
    now - change.updated < RECENCY_WINDOW
}

/// Compute each signal's contribution for `change` at time `now`.
pub fn explain(change: &ChangeRecord, now: DateTime<Utc>) -> ScoreBreakdown {
    ScoreBreakdown {
        patchsets: PATCHSETS.apply(count_patchsets(change)),
        votes: VOTES.apply(count_votes(change)),
        messages: MESSAGES.apply(count_messages(change)),
        commenters: COMMENTERS.apply(count_commenters(change)),
        reviewers: REVIEWERS.apply(count_reviewers(change)),
        recency: if is_recent(change, now) { RECENCY_BONUS } else { 0 },
    }
}

/// Trending score of `change` at time `now`.
pub fn score(change: &ChangeRecord, now: DateTime<Utc>) -> u32 {
    explain(change, now).total()
}

/// Score every change, keeping input order.
pub fn score_all(changes: Vec<ChangeRecord>, now: DateTime<Utc>) -> Vec<ScoredChange> {
    changes
        .into_iter()
        .map(|change| {
            let total = score(&change, now);
            ScoredChange::new(change, total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountRef, ChangeMessage, RevisionInfo};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn empty_change() -> ChangeRecord {
        ChangeRecord {
            id: "demo~main~I1".to_string(),
            number: 1,
            project: "demo".to_string(),
            subject: "Subject".to_string(),
            updated: now() - TimeDelta::days(1),
            current_revision: None,
            revisions: Default::default(),
            messages: Vec::new(),
            reviewers: Default::default(),
        }
    }

    fn message(author: i64, tag: Option<&str>, text: &str) -> ChangeMessage {
        ChangeMessage {
            author: Some(AccountRef::new(author)),
            tag: tag.map(String::from),
            message: text.to_string(),
        }
    }

    #[test]
    fn test_sub_score_clipping() {
        for signal in [PATCHSETS, VOTES, MESSAGES, COMMENTERS, REVIEWERS] {
            for value in 0..signal.min {
                assert_eq!(signal.apply(value), 0);
            }
            for value in signal.max..signal.max + 5 {
                assert_eq!(signal.apply(value), signal.weight as u32);
            }
            let mut previous = 0;
            for value in signal.min..=signal.max {
                let current = signal.apply(value);
                assert!(current >= previous, "{:?} not monotonic at {}", signal, value);
                assert!(current <= signal.weight as u32);
                previous = current;
            }
        }
    }

    #[test]
    fn test_sub_score_rounding() {
        // (5 - 3) * 4 / 4 = 2
        assert_eq!(sub_score(5, 4.0, 3, 7), 2);
        // (4 - 3) * 4 / 4 = 1
        assert_eq!(sub_score(4, 4.0, 3, 7), 1);
        // (10 - 5) * 3 / 10 = 1.5 rounds up
        assert_eq!(sub_score(10, 3.0, 5, 15), 2);
        // (6 - 5) * 3 / 10 = 0.3 rounds down
        assert_eq!(sub_score(6, 3.0, 5, 15), 0);
        assert_eq!(sub_score(3, 4.0, 3, 20), 0);
    }

    #[test]
    fn test_vote_pattern() {
        assert!(is_vote_message("Patch Set 2: Code-Review+2"));
        assert!(is_vote_message("Patch Set 2: Verified-1\n\nBroken build"));
        assert!(!is_vote_message("Patch Set 2:\n\nCode-Review+2 later"));
        assert!(!is_vote_message("Uploaded patch set 3."));
        assert!(!is_vote_message("Looks + good"));
        // A leading newline means the whole text is the first line
        assert!(is_vote_message("\nCode-Review+1"));
    }

    #[test]
    fn test_has_comment_body() {
        assert!(has_comment_body("Patch Set 1:\n\nPlease fix the typo."));
        assert!(!has_comment_body("Patch Set 1: Code-Review+1"));
        assert!(!has_comment_body("\n\nstarts with blank line"));
    }

    #[test]
    fn test_empty_change_scores_zero() {
        let change = empty_change();
        assert_eq!(explain(&change, now()), ScoreBreakdown::default());
        assert_eq!(score(&change, now()), 0);
    }

    #[test]
    fn test_patchset_signal() {
        let mut change = empty_change();
        change.current_revision = Some("abc".to_string());
        change.revisions.insert("abc".to_string(), RevisionInfo { number: 20 });
        assert_eq!(count_patchsets(&change), 20);
        assert_eq!(explain(&change, now()).patchsets, 4);

        // Current revision missing from the map
        change.current_revision = Some("def".to_string());
        assert_eq!(count_patchsets(&change), 0);
        assert_eq!(explain(&change, now()).patchsets, 0);
    }

    #[test]
    fn test_robot_messages_excluded() {
        let mut change = empty_change();
        for author in 1..=8 {
            change.messages.push(message(
                author,
                Some("autogenerated:ci"),
                "Patch Set 1: Verified+1\n\nBuild succeeded",
            ));
        }
        assert_eq!(count_votes(&change), 0);
        assert_eq!(count_messages(&change), 0);
        assert_eq!(count_commenters(&change), 0);

        change.messages.push(message(9, None, "Patch Set 1: Code-Review+1\n\nNice"));
        assert_eq!(count_votes(&change), 1);
        assert_eq!(count_messages(&change), 1);
        assert_eq!(count_commenters(&change), 1);
    }

    #[test]
    fn test_commenters_are_distinct() {
        let mut change = empty_change();
        change.messages.push(message(1, None, "Patch Set 1:\n\nFirst"));
        change.messages.push(message(1, None, "Patch Set 2:\n\nSecond"));
        change.messages.push(message(2, None, "Patch Set 2: Code-Review+1"));
        change.messages.push(ChangeMessage {
            author: None,
            tag: None,
            message: "Change has been merged\n\nby server".to_string(),
        });
        assert_eq!(count_commenters(&change), 1);
        assert_eq!(count_messages(&change), 4);
        assert_eq!(count_votes(&change), 1);
    }

    #[test]
    fn test_removed_reviewers_excluded() {
        let mut change = empty_change();
        let accounts = |ids: std::ops::Range<i64>| ids.map(AccountRef::new).collect::<Vec<_>>();
        change.reviewers.insert(ReviewerStatus::Reviewer, accounts(0..4));
        change.reviewers.insert(ReviewerStatus::Cc, accounts(4..6));
        change.reviewers.insert(ReviewerStatus::Removed, accounts(6..20));
        assert_eq!(count_reviewers(&change), 6);
    }

    #[test]
    fn test_recency_boundary() {
        let mut change = empty_change();

        change.updated = now() - RECENCY_WINDOW;
        assert!(!is_recent(&change, now()));
        assert_eq!(explain(&change, now()).recency, 0);

        change.updated = now() - RECENCY_WINDOW + TimeDelta::milliseconds(1);
        assert!(is_recent(&change, now()));
        assert_eq!(explain(&change, now()).recency, RECENCY_BONUS);
    }

    #[test]
    fn test_full_score() {
        let mut change = empty_change();
        change.updated = now() - TimeDelta::minutes(10);
        change.current_revision = Some("abc".to_string());
        change.revisions.insert("abc".to_string(), RevisionInfo { number: 25 });
        for author in 1..=10 {
            change
                .messages
                .push(message(author, None, "Patch Set 1: Code-Review+1\n\nComment"));
        }
        for author in 11..=20 {
            change.messages.push(message(author, None, "Plain note"));
        }
        change.reviewers.insert(
            ReviewerStatus::Reviewer,
            (0..15).map(AccountRef::new).collect(),
        );

        let breakdown = explain(&change, now());
        assert_eq!(
            breakdown,
            ScoreBreakdown {
                patchsets: 4,
                votes: 3,
                messages: 3,
                commenters: 4,
                reviewers: 3,
                recency: 3,
            }
        );
        assert_eq!(breakdown.total(), TRENDING_MAX_SCORE);
        assert!(breakdown.is_trending());
    }

    #[test]
    fn test_score_is_deterministic() {
        let mut change = empty_change();
        change.messages.push(message(1, None, "Patch Set 1: Code-Review-1"));
        let scored = score_all(vec![change.clone(), change.clone()], now());
        assert_eq!(scored[0].score, scored[1].score);
        assert_eq!(scored[0].change, change);
    }
}

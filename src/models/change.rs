//! Change record model as returned by the review server.
//!
//! Field names follow the Gerrit REST `ChangeInfo` JSON so that records can
//! be decoded straight from a query response and re-encoded into the cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Reference to a review server account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    /// Numeric account ID.
    #[serde(rename = "_account_id")]
    pub account_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl AccountRef {
    pub fn new(account_id: i64) -> Self {
        Self {
            account_id,
            name: None,
            username: None,
        }
    }
}

/// Reviewer state for an account attached to a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewerStatus {
    Reviewer,
    Cc,
    Removed,
    #[serde(other)]
    Other,
}

/// One entry of the change message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMessage {
    /// Message author. Server-generated messages may have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AccountRef>,

    /// Non-empty for machine-generated (robot) messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default)]
    pub message: String,
}

impl ChangeMessage {
    /// Check if this message was posted by an automated account.
    pub fn is_robot(&self) -> bool {
        self.tag.as_deref().is_some_and(|tag| !tag.is_empty())
    }
}

/// A single revision (patch set) of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionInfo {
    /// Sequential patch set number.
    #[serde(rename = "_number")]
    pub number: u32,
}

/// A reviewable change.
///
/// Records are immutable once decoded; scores travel alongside them in
/// [`ScoredChange`](super::ScoredChange).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Opaque change identifier (`project~branch~Change-Id`).
    pub id: String,

    /// Numeric change number.
    #[serde(rename = "_number", default)]
    pub number: i64,

    #[serde(default)]
    pub project: String,

    #[serde(default)]
    pub subject: String,

    /// Last server-side mutation.
    #[serde(with = "gerrit_timestamp")]
    pub updated: DateTime<Utc>,

    /// Commit SHA of the current revision, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_revision: Option<String>,

    #[serde(default)]
    pub revisions: HashMap<String, RevisionInfo>,

    #[serde(default)]
    pub messages: Vec<ChangeMessage>,

    #[serde(default)]
    pub reviewers: BTreeMap<ReviewerStatus, Vec<AccountRef>>,
}

impl ChangeRecord {
    /// Patch set number of the current revision, if it is present in the
    /// revision map.
    pub fn current_patchset(&self) -> Option<u32> {
        let current = self.current_revision.as_ref()?;
        self.revisions.get(current).map(|r| r.number)
    }

    /// Messages written by humans.
    pub fn human_messages(&self) -> impl Iterator<Item = &ChangeMessage> {
        self.messages.iter().filter(|m| !m.is_robot())
    }
}

/// Serde adapter for the review server's timestamp format
/// (`2013-02-21 11:16:36.775000000`, always UTC).
pub mod gerrit_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";
    const PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    pub fn format(value: &DateTime<Utc>) -> String {
        value.format(FORMAT).to_string()
    }

    pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        NaiveDateTime::parse_from_str(s, PARSE_FORMAT).map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const CHANGE_JSON: &str = r#"{
        "id": "demo~main~I8473b95934b5732ac55d26311a706c9c2bde9940",
        "_number": 3965,
        "project": "demo",
        "subject": "Implement feature X",
        "updated": "2013-02-21 11:16:36.775000000",
        "current_revision": "184ebe53805e102605d11f6b143486d15c23a09c",
        "revisions": {
            "184ebe53805e102605d11f6b143486d15c23a09c": {"_number": 4},
            "0a1b2c": {"_number": 3}
        },
        "messages": [
            {"author": {"_account_id": 1000096, "name": "John Doe"}, "message": "Uploaded patch set 1."},
            {"tag": "autogenerated:ci", "message": "Build started"}
        ],
        "reviewers": {
            "REVIEWER": [{"_account_id": 1}, {"_account_id": 2}],
            "CC": [{"_account_id": 3}],
            "REMOVED": [{"_account_id": 4}]
        }
    }"#;

    #[test]
    fn test_decode_change_info() {
        let change: ChangeRecord = serde_json::from_str(CHANGE_JSON).unwrap();
        assert_eq!(change.number, 3965);
        assert_eq!(change.current_patchset(), Some(4));
        assert_eq!(change.messages.len(), 2);
        assert_eq!(change.reviewers[&ReviewerStatus::Reviewer].len(), 2);
        assert_eq!(change.reviewers[&ReviewerStatus::Removed].len(), 1);
        assert_eq!(
            change.updated,
            Utc.with_ymd_and_hms(2013, 2, 21, 11, 16, 36).unwrap()
                + chrono::Duration::milliseconds(775)
        );
    }

    #[test]
    fn test_unknown_reviewer_status() {
        let json = r#"{"id": "x", "updated": "2024-01-15 10:30:00.000000000",
            "reviewers": {"WATCHER": [{"_account_id": 9}]}}"#;
        let change: ChangeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(change.reviewers[&ReviewerStatus::Other].len(), 1);
    }

    #[test]
    fn test_robot_message() {
        let change: ChangeRecord = serde_json::from_str(CHANGE_JSON).unwrap();
        assert!(!change.messages[0].is_robot());
        assert!(change.messages[1].is_robot());
        assert_eq!(change.human_messages().count(), 1);

        let empty_tag = ChangeMessage {
            author: None,
            tag: Some(String::new()),
            message: "LGTM".to_string(),
        };
        assert!(!empty_tag.is_robot());
    }

    #[test]
    fn test_current_patchset_missing_revision() {
        let mut change: ChangeRecord = serde_json::from_str(CHANGE_JSON).unwrap();
        change.current_revision = Some("deadbeef".to_string());
        assert_eq!(change.current_patchset(), None);

        change.current_revision = None;
        assert_eq!(change.current_patchset(), None);
    }

    #[test]
    fn test_timestamp_format_keeps_nanos() {
        let ts = gerrit_timestamp::parse("2024-01-15 10:30:00.123456789").unwrap();
        assert_eq!(gerrit_timestamp::format(&ts), "2024-01-15 10:30:00.123456789");
        assert!(gerrit_timestamp::parse("2024-01-15T10:30:00Z").is_err());
    }
}

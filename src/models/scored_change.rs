//! A change paired with its trending score.

use super::change::ChangeRecord;
use serde::{Deserialize, Serialize};

/// Output of the scoring engine: the untouched record and its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChange {
    pub change: ChangeRecord,
    pub score: u32,
}

impl ScoredChange {
    pub fn new(change: ChangeRecord, score: u32) -> Self {
        Self { change, score }
    }

    pub fn id(&self) -> &str {
        &self.change.id
    }
}

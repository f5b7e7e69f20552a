//! Match results and the tournament log submitted to the ledger.

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

/// Number of matches in a four-player bracket.
pub const TOTAL_ROUNDS: u32 = 3;

/// One side of a finished match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub name: String,
    pub score: u32,
}

/// Result of one completed match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Round number the match was played in (1, 2 or 3).
    pub game_id: u32,
    pub winner: PlayerResult,
    pub loser: PlayerResult,
}

/// Ordered match records, sealed with a completion timestamp once the final is decided.
///
/// Serializes as a flat array: the records followed by the integer timestamp when sealed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TournamentLog {
    records: Vec<MatchRecord>,
    completed_at: Option<i64>,
}

impl TournamentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unix timestamp (seconds) appended when the log was sealed.
    pub fn completed_at(&self) -> Option<i64> {
        self.completed_at
    }

    pub fn is_sealed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// True when every match of the bracket has a record.
    pub fn is_full(&self) -> bool {
        self.records.len() == TOTAL_ROUNDS as usize
    }

    pub(crate) fn push(&mut self, record: MatchRecord) {
        self.records.push(record);
    }

    /// Append the completion timestamp. Only a full, unsealed log can be sealed.
    pub(crate) fn seal(&mut self, timestamp: i64) -> bool {
        if !self.is_full() || self.is_sealed() {
            return false;
        }
        self.completed_at = Some(timestamp);
        true
    }
}

impl Serialize for TournamentLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.records.len() + usize::from(self.completed_at.is_some());
        let mut seq = serializer.serialize_seq(Some(len))?;
        for record in &self.records {
            seq.serialize_element(record)?;
        }
        if let Some(ts) = self.completed_at {
            seq.serialize_element(&ts)?;
        }
        seq.end()
    }
}

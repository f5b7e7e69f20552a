//! Ledger seam: where finished tournament logs are recorded.

use crate::models::TournamentLog;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("could not encode tournament log: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("ledger rejected tournament log: {0}")]
    Rejected(String),
}

/// Append-only store for finalized tournament logs.
///
/// `record` may block (network round-trip, transaction confirmation); rooms call it off the
/// async runtime.
pub trait Ledger: Send + Sync + 'static {
    fn record(&self, tournament_log: &TournamentLog) -> Result<(), LedgerError>;
}

/// Ledger that keeps submitted logs in memory as their JSON encoding.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: RwLock<Vec<serde_json::Value>>,
    reject_with: Option<String>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger that refuses every submission.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            reject_with: Some(reason.into()),
        }
    }

    pub fn entries(&self) -> Vec<serde_json::Value> {
        self.entries
            .read()
            .map(|g| g.clone())
            .unwrap_or_default()
    }
}

impl Ledger for MemoryLedger {
    fn record(&self, tournament_log: &TournamentLog) -> Result<(), LedgerError> {
        if let Some(reason) = &self.reject_with {
            return Err(LedgerError::Rejected(reason.clone()));
        }
        let entry = serde_json::to_value(tournament_log)?;
        let mut g = self
            .entries
            .write()
            .map_err(|_| LedgerError::Rejected("ledger lock poisoned".to_string()))?;
        g.push(entry);
        log::info!("Recorded tournament log #{} ({} results)", g.len(), tournament_log.len());
        Ok(())
    }
}

//! Sync bookkeeping: per-record upsert outcomes and the summary returned to callers.
//!
//! Pure data, decoupled from I/O. The store records an outcome per upserted
//! country and the service turns the totals into a [`SyncSummary`].

use serde::{Deserialize, Serialize};

/// Outcome of upserting a single country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Code was not stored yet - a new row was created
    Created,
    /// Code already stored - every mutable field was overwritten
    Updated,
}

impl UpsertOutcome {
    /// Classifies an upsert by whether the code was already present.
    pub fn from_existing(existed: bool) -> Self {
        if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        }
    }
}

/// Statistics for one batch upsert.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub created: usize,
    pub updated: usize,
}

impl SyncStats {
    /// Creates a new empty stats tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an outcome, incrementing the appropriate counter.
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }

    /// Returns the total number of upserted countries.
    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

/// Result of a sync, as reported over the API and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub inserted: usize,
    pub updated: usize,
    pub total: usize,
    pub message: String,
}

impl From<SyncStats> for SyncSummary {
    fn from(stats: SyncStats) -> Self {
        Self {
            inserted: stats.created,
            updated: stats.updated,
            total: stats.total(),
            message: format!(
                "Sync completed: {} inserted, {} updated.",
                stats.created, stats.updated
            ),
        }
    }
}

//! Summary of one harvest run.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wikiharvest_shared::{FailureKind, ItemFailure};

/// What a run attempted, what it produced, and what went wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestReport {
    pub run_id: Uuid,
    pub index_url: String,
    pub output_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    /// Unique item locations found on the index page.
    pub discovered: usize,
    pub attempted: usize,
    pub succeeded: usize,
    /// Successful items whose key was already harvested.
    pub duplicates: usize,
    /// Failed items in completion order.
    pub failures: Vec<ItemFailure>,
}

impl HarvestReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when every attempted item produced a record.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.succeeded == self.attempted
    }

    /// Failure count per kind, in kind order.
    pub fn failure_counts(&self) -> Vec<(FailureKind, usize)> {
        let mut counts: Vec<(FailureKind, usize)> = Vec::new();
        for failure in &self.failures {
            match counts.iter_mut().find(|(kind, _)| *kind == failure.kind) {
                Some((_, n)) => *n += 1,
                None => counts.push((failure.kind, 1)),
            }
        }
        counts.sort_by_key(|(kind, _)| *kind as u8);
        counts
    }
}

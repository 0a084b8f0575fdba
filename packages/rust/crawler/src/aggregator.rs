//! Collects item outcomes into the corpus.
//!
//! One [`Aggregator`] is owned by the task draining the completion channel,
//! so every insertion into the corpus happens on that task, one at a time.

use tracing::{debug, warn};

use wikiharvest_shared::{Corpus, FailureKind, HarvestError, ItemFailure, ItemId, Record};

/// What one worker task produced.
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Harvested {
        location: String,
        id: ItemId,
        record: Record,
    },
    Failed(ItemFailure),
}

impl ItemOutcome {
    /// Build a failure outcome from the error that ended the task.
    pub fn failed(location: impl Into<String>, item: Option<ItemId>, error: &HarvestError) -> Self {
        ItemOutcome::Failed(ItemFailure {
            location: location.into(),
            item,
            kind: error.failure_kind().unwrap_or(FailureKind::NetworkError),
            message: error.to_string(),
        })
    }

    pub fn location(&self) -> &str {
        match self {
            ItemOutcome::Harvested { location, .. } => location,
            ItemOutcome::Failed(failure) => &failure.location,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Harvested { .. })
    }
}

/// Everything a finished pool run produced.
#[derive(Debug, Clone, Default)]
pub struct HarvestRun {
    pub corpus: Corpus,
    pub failures: Vec<ItemFailure>,
    /// Number of tasks the run was started with.
    pub attempted: usize,
    /// Number of tasks that produced a record.
    pub succeeded: usize,
    /// Successful tasks whose key was already in the corpus.
    pub duplicates: usize,
}

/// Accumulates outcomes in completion order.
#[derive(Debug)]
pub struct Aggregator {
    corpus: Corpus,
    failures: Vec<ItemFailure>,
    total: usize,
    completed: usize,
    succeeded: usize,
    duplicates: usize,
}

impl Aggregator {
    pub fn new(total: usize) -> Self {
        Self {
            corpus: Corpus::new(),
            failures: Vec::new(),
            total,
            completed: 0,
            succeeded: 0,
            duplicates: 0,
        }
    }

    /// Record one outcome. Returns whether it was a success.
    pub fn record(&mut self, outcome: ItemOutcome) -> bool {
        self.completed += 1;
        match outcome {
            ItemOutcome::Harvested {
                location,
                id,
                record,
            } => {
                debug!(%location, item = %id, "item harvested");
                if self.corpus.insert(id.clone(), record).is_some() {
                    warn!(%location, item = %id, "duplicate item, keeping the latest record");
                    self.duplicates += 1;
                }
                self.succeeded += 1;
                true
            }
            ItemOutcome::Failed(failure) => {
                warn!(
                    location = %failure.location,
                    kind = %failure.kind,
                    error = %failure.message,
                    "item failed"
                );
                self.failures.push(failure);
                false
            }
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn failures(&self) -> &[ItemFailure] {
        &self.failures
    }

    pub fn finish(self) -> HarvestRun {
        HarvestRun {
            corpus: self.corpus,
            failures: self.failures,
            attempted: self.total,
            succeeded: self.succeeded,
            duplicates: self.duplicates,
        }
    }
}

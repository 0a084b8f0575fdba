//! Fixed-size worker pool over the item list.
//!
//! `concurrency` worker tasks pull locations from a shared queue, fetch and
//! extract each one, and send the outcome down a channel. The calling task
//! drains that channel into an [`Aggregator`]. Outcomes arrive in completion
//! order, and a failed item never stops the other workers.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};
use url::Url;

use wikiharvest_markup::{HtmlParser, MarkupParser, extract_from_html};
use wikiharvest_shared::{HarvestError, ItemId};

use crate::aggregator::{Aggregator, HarvestRun, ItemOutcome};
use crate::fetcher::PageFetcher;

/// Called by the aggregating task after every completed item.
pub trait PoolProgress: Send + Sync {
    fn item_finished(&self, location: &str, completed: usize, total: usize, ok: bool);
}

/// No-op progress for headless/test usage.
pub struct SilentPoolProgress;

impl PoolProgress for SilentPoolProgress {
    fn item_finished(&self, _location: &str, _completed: usize, _total: usize, _ok: bool) {}
}

// ---------------------------------------------------------------------------
// Harvester
// ---------------------------------------------------------------------------

/// Bounded-concurrency fetch → extract over a list of item locations.
pub struct Harvester<F, P = HtmlParser> {
    fetcher: Arc<F>,
    parser: Arc<P>,
    base_url: Url,
    concurrency: usize,
}

impl<F: PageFetcher> Harvester<F> {
    /// Create a harvester resolving locations against `base_url`.
    pub fn new(fetcher: F, base_url: Url, concurrency: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            parser: Arc::new(HtmlParser),
            base_url,
            concurrency: concurrency.max(1),
        }
    }
}

impl<F: PageFetcher, P: MarkupParser + 'static> Harvester<F, P> {
    /// Swap the markup backend.
    pub fn with_parser<Q: MarkupParser + 'static>(self, parser: Q) -> Harvester<F, Q> {
        Harvester {
            fetcher: self.fetcher,
            parser: Arc::new(parser),
            base_url: self.base_url,
            concurrency: self.concurrency,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetch and extract every location, returning once all tasks settle.
    #[instrument(skip_all, fields(items = locations.len(), concurrency = self.concurrency))]
    pub async fn run(&self, locations: Vec<String>, progress: &dyn PoolProgress) -> HarvestRun {
        let total = locations.len();
        let workers = self.concurrency.min(total).max(1);
        let queue = Arc::new(Mutex::new(VecDeque::from(locations)));
        let (tx, mut rx) = mpsc::channel::<ItemOutcome>(workers * 2);

        info!(total, workers, "starting workers");

        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let parser = Arc::clone(&self.parser);
            let base_url = self.base_url.clone();

            handles.push(tokio::spawn(async move {
                let mut handled = 0usize;
                loop {
                    let next = queue.lock().await.pop_front();
                    let Some(location) = next else {
                        break;
                    };
                    let outcome = harvest_item(&*fetcher, &*parser, &base_url, location).await;
                    handled += 1;
                    if tx.send(outcome).await.is_err() {
                        break;
                    }
                }
                debug!(worker, handled, "worker finished");
            }));
        }

        // Workers hold the remaining senders; the channel closes when the last one exits.
        drop(tx);

        let mut aggregator = Aggregator::new(total);
        while let Some(outcome) = rx.recv().await {
            let location = outcome.location().to_string();
            let ok = aggregator.record(outcome);
            progress.item_finished(&location, aggregator.completed(), total, ok);
        }

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "worker task failed");
            }
        }

        let run = aggregator.finish();
        info!(
            attempted = run.attempted,
            succeeded = run.succeeded,
            failed = run.failures.len(),
            "workers finished"
        );
        run
    }
}

/// Resolve, fetch, decode and extract one item.
async fn harvest_item<F: PageFetcher, P: MarkupParser>(
    fetcher: &F,
    parser: &P,
    base_url: &Url,
    location: String,
) -> ItemOutcome {
    let id = match ItemId::from_location(&location) {
        Ok(id) => id,
        Err(e) => return ItemOutcome::failed(location, None, &e),
    };

    let url = match base_url.join(&location) {
        Ok(url) => url,
        Err(_) => {
            let err = HarvestError::invalid_identifier(&location);
            return ItemOutcome::failed(location, Some(id), &err);
        }
    };

    let body = match fetcher.fetch(&url).await {
        Ok(body) => body,
        Err(e) => return ItemOutcome::failed(location, Some(id), &e),
    };

    match extract_from_html(parser, &body) {
        Ok(record) => ItemOutcome::Harvested {
            location,
            id,
            record,
        },
        Err(e) => ItemOutcome::failed(location, Some(id), &e),
    }
}

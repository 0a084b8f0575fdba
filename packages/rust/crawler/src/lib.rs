//! Concurrent item fetching and result aggregation.
//!
//! This crate provides:
//! - [`PageFetcher`] / [`HttpFetcher`]: the shared network capability
//! - [`Harvester`]: a fixed-size worker pool that fetches and extracts every item
//! - [`Aggregator`]: the single owner of the corpus while a run is in flight

pub mod aggregator;
pub mod engine;
pub mod fetcher;

pub use aggregator::{Aggregator, HarvestRun, ItemOutcome};
pub use engine::{Harvester, PoolProgress, SilentPoolProgress};
pub use fetcher::{HttpFetcher, PageFetcher, decode_body};

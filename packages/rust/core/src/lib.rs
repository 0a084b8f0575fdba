//! Run orchestration for wikiharvest.
//!
//! This crate ties together discovery, the fetch worker pool, and the
//! output writer into one end-to-end run (`harvest`).

pub mod output;
pub mod pipeline;
pub mod report;

pub use output::{write_corpus, write_json};
pub use pipeline::{ProgressReporter, SilentProgress, discover_items, extract_file, extract_url, harvest};
pub use report::HarvestReport;

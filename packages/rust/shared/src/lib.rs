//! Shared types, error model, and configuration for wikiharvest.
//!
//! This crate is the foundation depended on by all other wikiharvest crates.
//! It provides:
//! - [`HarvestError`]: the unified error type, plus [`FailureKind`] for per-item failures
//! - Domain types ([`ItemId`], [`Record`], [`NormalizedText`], [`Corpus`])
//! - Configuration ([`AppConfig`], [`HarvestConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_INDEX_URL, HarvestConfig, HarvestDefaults, HttpConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{FailureKind, HarvestError, Result};
pub use types::{Corpus, ITEM_PATTERN, ItemFailure, ItemId, NormalizedText, Record};

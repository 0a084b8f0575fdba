//! Wiki markup to normalized text.
//!
//! This crate provides:
//! - [`Element`] / [`Node`]: an owned markup tree with the lookup, flattening and
//!   replace-with-text primitives the rewrite rules need
//! - [`MarkupParser`] / [`HtmlParser`]: turns raw HTML into that tree (via `scraper`)
//! - [`normalize`]: the text normalizer applied to each section
//! - [`extract_record`]: splits a page into sections and builds its [`Record`]
//!
//! [`Record`]: wikiharvest_shared::Record

pub mod extract;
pub mod normalize;
pub mod parser;
pub mod tree;

pub use extract::{Section, SectionKind, classify, extract_from_html, extract_record, split_sections};
pub use normalize::{normalize, normalize_node};
pub use parser::{HtmlParser, MarkupParser};
pub use tree::{Element, Node};

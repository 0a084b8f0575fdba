//! Core domain types for the harvested corpus.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FailureKind, HarvestError, Result};

/// Pattern every item location must contain: `<year>_IMO_Problems/Problem_<n>`.
pub const ITEM_PATTERN: &str = r"(\d{4})_IMO_Problems/Problem_(\d+)";

static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(ITEM_PATTERN).expect("item regex"));

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("digits regex"));

// ---------------------------------------------------------------------------
// ItemId
// ---------------------------------------------------------------------------

/// The (group, sub-key) pair that keys one item in the corpus.
///
/// For IMO pages the group is the competition year and the sub-key the
/// problem number, both kept as the digit strings that appear in the URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId {
    pub group: String,
    pub sub_key: String,
}

impl ItemId {
    /// Build an identifier from its parts, rejecting anything that is not all digits.
    pub fn new(group: impl Into<String>, sub_key: impl Into<String>) -> Result<Self> {
        let group = group.into();
        let sub_key = sub_key.into();
        if !DIGITS_RE.is_match(&group) || !DIGITS_RE.is_match(&sub_key) {
            return Err(HarvestError::invalid_identifier(format!("{group}/{sub_key}")));
        }
        Ok(Self { group, sub_key })
    }

    /// Parse the identifier out of an item location such as
    /// `/wiki/index.php/2019_IMO_Problems/Problem_3`.
    pub fn from_location(location: &str) -> Result<Self> {
        let caps = ITEM_RE
            .captures(location)
            .ok_or_else(|| HarvestError::invalid_identifier(location))?;
        Self::new(&caps[1], &caps[2]).map_err(|_| HarvestError::invalid_identifier(location))
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.group, self.sub_key)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// The flattened text of one section, serialized as `{"text": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizedText {
    pub text: String,
}

impl NormalizedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Normalized problem statement plus its solutions, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Problem")]
    pub problem: Option<NormalizedText>,
    #[serde(rename = "Solutions")]
    pub solutions: Vec<NormalizedText>,
}

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

/// Two-level result set: group → sub-key → record.
///
/// Ordered maps keep the serialized output stable across runs regardless of
/// the order in which items completed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus(BTreeMap<String, BTreeMap<String, Record>>);

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its identifier, returning the record it replaced.
    pub fn insert(&mut self, id: ItemId, record: Record) -> Option<Record> {
        self.0.entry(id.group).or_default().insert(id.sub_key, record)
    }

    pub fn get(&self, id: &ItemId) -> Option<&Record> {
        self.0.get(&id.group)?.get(&id.sub_key)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Total number of records across all groups.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct groups.
    pub fn group_count(&self) -> usize {
        self.0.len()
    }

    /// The records of one group, keyed by sub-key.
    pub fn group(&self, group: &str) -> Option<&BTreeMap<String, Record>> {
        self.0.get(group)
    }

    /// Iterate over every `(group, sub_key, record)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Record)> {
        self.0.iter().flat_map(|(group, items)| {
            items
                .iter()
                .map(move |(sub_key, record)| (group.as_str(), sub_key.as_str(), record))
        })
    }
}

// ---------------------------------------------------------------------------
// ItemFailure
// ---------------------------------------------------------------------------

/// A per-item failure as it appears in the run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFailure {
    /// The location the item was discovered under.
    pub location: String,
    /// The parsed identifier, when the location carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemId>,
    pub kind: FailureKind,
    pub message: String,
}

//! Item page to [`Record`].
//!
//! A page's main content container is split into sections at each `<h2>`.
//! Section headings decide what the section is: video sections are skipped,
//! solution sections accumulate in page order, and the last problem section
//! wins.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use wikiharvest_shared::{HarvestError, Record, Result};

use crate::normalize::normalize;
use crate::parser::MarkupParser;
use crate::tree::Element;

/// Class of the MediaWiki element that wraps rendered page content.
pub const CONTENT_CLASS: &str = "mw-parser-output";

/// Id of the generated table of contents.
pub const TOC_ID: &str = "toc";

static VIDEO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)video").expect("video regex"));
static SOLUTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)solution").expect("solution regex"));
static PROBLEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)problem").expect("problem regex"));

/// What a section contributes to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Problem,
    Solutions,
    Ignored,
}

/// The members between one `<h2>` and the next.
#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    /// Trimmed heading text.
    pub heading: String,
    pub members: Vec<Element>,
}

/// Classify a section by its heading text.
pub fn classify(heading: &str) -> SectionKind {
    if VIDEO_RE.is_match(heading) {
        SectionKind::Ignored
    } else if SOLUTION_RE.is_match(heading) {
        SectionKind::Solutions
    } else if PROBLEM_RE.is_match(heading) {
        SectionKind::Problem
    } else {
        SectionKind::Ignored
    }
}

/// Split a content container into sections at its `<h2>` children.
///
/// Elements before the first `<h2>` belong to no section; bare text
/// between elements is not a member.
pub fn split_sections(container: Element) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();

    for el in container.into_child_elements() {
        if el.is("h2") {
            let heading = el.text().trim().to_string();
            sections.push(Section {
                kind: classify(&heading),
                heading,
                members: Vec::new(),
            });
        } else if let Some(current) = sections.last_mut() {
            current.members.push(el);
        }
    }

    sections
}

/// Build the record for a parsed item page.
pub fn extract_record(mut doc: Element) -> Result<Record> {
    let mut container = doc
        .remove_first(|el| el.is("div") && el.has_class(CONTENT_CLASS))
        .ok_or_else(|| HarvestError::malformed(format!("no div.{CONTENT_CLASS} on page")))?;

    if container
        .remove_first(|el| el.is("div") && el.id() == Some(TOC_ID))
        .is_some()
    {
        debug!("removed table of contents");
    }

    let mut record = Record::default();
    let mut ignored = 0usize;

    for section in split_sections(container) {
        match section.kind {
            SectionKind::Solutions => record.solutions.push(normalize(section.members)),
            SectionKind::Problem => record.problem = Some(normalize(section.members)),
            SectionKind::Ignored => {
                debug!(heading = %section.heading, "skipping section");
                ignored += 1;
            }
        }
    }

    debug!(
        has_problem = record.problem.is_some(),
        solutions = record.solutions.len(),
        ignored,
        "record extracted"
    );

    Ok(record)
}

/// Parse raw page markup with `parser` and build its record.
pub fn extract_from_html(parser: &dyn MarkupParser, raw: &str) -> Result<Record> {
    extract_record(parser.parse(raw))
}

//! JSON output.
//!
//! Artifacts are pretty-printed with four-space indentation, non-ASCII
//! characters are written as-is, and every write goes to a sibling
//! temporary file that is renamed over the target once complete.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use wikiharvest_shared::{Corpus, HarvestError, Result};

const INDENT: &[u8] = b"    ";

/// Write the corpus to `path`.
pub fn write_corpus(path: &Path, corpus: &Corpus) -> Result<()> {
    write_json(path, corpus)?;
    debug!(
        path = %path.display(),
        groups = corpus.group_count(),
        items = corpus.len(),
        "wrote corpus"
    );
    Ok(())
}

/// Serialize `data` and write it to `path` atomically.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = to_pretty_json(data)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| HarvestError::io(parent, e))?;
    }

    let tmp = temp_sibling(path)?;
    std::fs::write(&tmp, json).map_err(|e| HarvestError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        HarvestError::io(path, e)
    })?;

    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

fn to_pretty_json<T: Serialize>(data: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    data.serialize(&mut ser)
        .map_err(|e| HarvestError::Serialize(format!("JSON serialization failed: {e}")))?;
    Ok(buf)
}

fn temp_sibling(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        HarvestError::config(format!("output path '{}' has no file name", path.display()))
    })?;
    let mut tmp_name = name.to_os_string();
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}

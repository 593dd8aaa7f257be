//! Stripping the optional-component prefix from script/config file names.
//!
//! Upstream archives mark optional files with a literal prefix (`cn_` by
//! default). In the bundle the prefix is removed so the file installs under its
//! real name.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::route::move_file;

/// Name of `file_name` with every leading `prefix` removed, or `None` if nothing
/// changes. Names that would become empty are left alone.
pub fn stripped_name<'a>(file_name: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let mut rest = file_name;
    while let Some(r) = rest.strip_prefix(prefix) {
        rest = r;
    }
    if rest.len() == file_name.len() || rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// Renames every file below `dir` that starts with `prefix`. Returns the new paths.
pub fn strip_prefix_in(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let candidates: Vec<PathBuf> = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();

    let mut renamed = Vec::new();
    for path in candidates {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(new_name) = stripped_name(name, prefix) else {
            continue;
        };
        let target = path.with_file_name(new_name);
        move_file(&path, &target)
            .with_context(|| format!("strip prefix from {}", path.display()))?;
        tracing::debug!(from = %name, to = %new_name, "stripped prefix");
        renamed.push(target);
    }
    Ok(renamed)
}

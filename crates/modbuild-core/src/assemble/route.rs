//! Sorting extracted files into the build tree by extension.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::extract::has_extension;
use super::BuildLayout;

/// Directory moved wholesale into `Mods/` when found at the top of scratch.
pub const MOD_DATA_DIR: &str = "mod_data";

/// Script/config extensions, in routing order.
pub const SCRIPT_CONFIG_EXTENSIONS: [&str; 3] = ["package", "ts4script", "config"];

pub const DOCUMENTATION_EXTENSION: &str = "txt";

/// Role of an extracted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    ScriptConfig,
    Documentation,
    /// The wholesale `mod_data` directory.
    Data,
    Unknown,
}

impl EntryKind {
    pub fn of(path: &Path) -> Self {
        if path.is_dir() && path.file_name().is_some_and(|n| n == MOD_DATA_DIR) {
            EntryKind::Data
        } else if SCRIPT_CONFIG_EXTENSIONS
            .iter()
            .any(|ext| has_extension(path, ext))
        {
            EntryKind::ScriptConfig
        } else if has_extension(path, DOCUMENTATION_EXTENSION) {
            EntryKind::Documentation
        } else {
            EntryKind::Unknown
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteReport {
    pub moved_mod_data: bool,
    pub script_config: usize,
    pub documentation: usize,
    /// Files left in scratch because no rule matched.
    pub unroutable: Vec<PathBuf>,
}

/// Routes everything in `scratch` for the source file `mod_name`.
///
/// `mod_data` goes first, then script/config files in
/// [`SCRIPT_CONFIG_EXTENSIONS`] order, then documentation. Unknown files stay.
pub fn route(scratch: &Path, layout: &BuildLayout, mod_name: &str) -> Result<RouteReport> {
    let mut report = RouteReport::default();

    let mod_data = scratch.join(MOD_DATA_DIR);
    if EntryKind::of(&mod_data) == EntryKind::Data {
        move_dir_merging(&mod_data, &layout.mods.join(MOD_DATA_DIR))?;
        report.moved_mod_data = true;
    }

    let mut scripts = Vec::new();
    let mut docs = Vec::new();
    for file in files_below(scratch) {
        match EntryKind::of(&file) {
            EntryKind::ScriptConfig => scripts.push(file),
            EntryKind::Documentation => docs.push(file),
            EntryKind::Data | EntryKind::Unknown => {
                tracing::warn!(file = %file.display(), "no idea where to move, skipping");
                report.unroutable.push(file);
            }
        }
    }

    scripts.sort_by_key(|p| script_config_rank(p));
    for file in scripts {
        move_into(&file, &layout.scripts)?;
        report.script_config += 1;
    }

    if !docs.is_empty() {
        let dir = layout.docs_for(mod_name);
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        for file in docs {
            move_into(&file, &dir)?;
            report.documentation += 1;
        }
    }
    Ok(report)
}

fn script_config_rank(path: &Path) -> usize {
    SCRIPT_CONFIG_EXTENSIONS
        .iter()
        .position(|ext| has_extension(path, ext))
        .unwrap_or(SCRIPT_CONFIG_EXTENSIONS.len())
}

/// All files below `root`, found recursively in name order.
fn files_below(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}

/// Moves `file` into `dir`, keeping its name. An existing file is replaced.
pub(crate) fn move_into(file: &Path, dir: &Path) -> Result<PathBuf> {
    let name = file
        .file_name()
        .with_context(|| format!("no file name in {}", file.display()))?;
    let dest = dir.join(name);
    move_file(file, &dest)?;
    Ok(dest)
}

pub(crate) fn move_file(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        tracing::warn!(file = %to.display(), "overwriting existing file");
        fs::remove_file(to).with_context(|| format!("remove {}", to.display()))?;
    }
    if fs::rename(from, to).is_err() {
        // Cross-device: copy then remove.
        fs::copy(from, to)
            .with_context(|| format!("copy {} to {}", from.display(), to.display()))?;
        fs::remove_file(from).with_context(|| format!("remove {}", from.display()))?;
    }
    Ok(())
}

/// Moves the directory `from` to `to`, merging file by file when `to` exists.
fn move_dir_merging(from: &Path, to: &Path) -> Result<()> {
    if !to.exists() && fs::rename(from, to).is_ok() {
        return Ok(());
    }
    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .with_context(|| format!("{} outside {}", entry.path().display(), from.display()))?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            move_file(entry.path(), &target)?;
        }
    }
    fs::remove_dir_all(from).with_context(|| format!("remove {}", from.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, path.to_string_lossy().as_bytes()).unwrap();
    }

    fn setup() -> (tempfile::TempDir, PathBuf, BuildLayout) {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = tmp.path().join("u");
        fs::create_dir_all(&scratch).unwrap();
        let layout = BuildLayout::new(&tmp.path().join("release"), "B", "_cn_");
        layout.create().unwrap();
        (tmp, scratch, layout)
    }

    #[test]
    fn classify_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join(MOD_DATA_DIR);
        fs::create_dir(&data).unwrap();
        assert_eq!(EntryKind::of(&data), EntryKind::Data);
        assert_eq!(EntryKind::of(Path::new("x.package")), EntryKind::ScriptConfig);
        assert_eq!(EntryKind::of(Path::new("x.ts4script")), EntryKind::ScriptConfig);
        assert_eq!(EntryKind::of(Path::new("x.cfg.config")), EntryKind::ScriptConfig);
        assert_eq!(EntryKind::of(Path::new("x.TXT")), EntryKind::Documentation);
        assert_eq!(EntryKind::of(Path::new("x.png")), EntryKind::Unknown);
    }

    #[test]
    fn one_file_of_each_kind_lands_in_its_destination() {
        let (_tmp, scratch, layout) = setup();
        touch(&scratch.join("a.package"));
        touch(&scratch.join("nested/b.ts4script"));
        touch(&scratch.join("c.config"));
        touch(&scratch.join("d.txt"));
        touch(&scratch.join("mod_data/settings/e.json"));
        touch(&scratch.join("f.png"));

        let report = route(&scratch, &layout, "mod.v1").unwrap();

        assert!(report.moved_mod_data);
        assert_eq!(report.script_config, 3);
        assert_eq!(report.documentation, 1);
        assert!(layout.scripts.join("a.package").is_file());
        assert!(layout.scripts.join("b.ts4script").is_file());
        assert!(layout.scripts.join("c.config").is_file());
        assert!(layout.docs_for("mod.v1").join("d.txt").is_file());
        assert!(layout.mods.join("mod_data/settings/e.json").is_file());

        let left = files_below(&scratch);
        assert_eq!(left, vec![scratch.join("f.png")]);
        assert_eq!(report.unroutable, left, "unknown entries are never moved");
    }

    #[test]
    fn no_docs_dir_without_text_files() {
        let (_tmp, scratch, layout) = setup();
        touch(&scratch.join("a.package"));
        route(&scratch, &layout, "mod").unwrap();
        assert!(!layout.docs_for("mod").exists());
    }

    #[test]
    fn mod_data_merges_into_existing() {
        let (_tmp, scratch, layout) = setup();
        touch(&layout.mods.join("mod_data/old.json"));
        touch(&scratch.join("mod_data/new.json"));
        route(&scratch, &layout, "mod").unwrap();
        assert!(layout.mods.join("mod_data/old.json").is_file());
        assert!(layout.mods.join("mod_data/new.json").is_file());
        assert!(!scratch.join("mod_data").exists());
    }

    #[test]
    fn script_config_files_route_from_nested_dirs() {
        let (_tmp, scratch, layout) = setup();
        touch(&scratch.join("b/x.config"));
        touch(&scratch.join("a/x.package"));
        touch(&scratch.join("x.ts4script"));
        let report = route(&scratch, &layout, "mod").unwrap();
        assert_eq!(report.script_config, 3);
        assert!(report.unroutable.is_empty());
        assert!(files_below(&scratch).is_empty());
    }

    #[test]
    fn later_file_overwrites_same_name() {
        let (_tmp, scratch, layout) = setup();
        fs::write(layout.scripts.join("a.package"), b"old").unwrap();
        fs::write(scratch.join("a.package"), b"new").unwrap();
        route(&scratch, &layout, "mod").unwrap();
        assert_eq!(fs::read(layout.scripts.join("a.package")).unwrap(), b"new");
    }
}

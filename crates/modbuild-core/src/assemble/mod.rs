//! Build assembly: turn a build's source files into a release tree.
//!
//! ```text
//! release/<build>/
//!     Mods/<default_mods_folder>/     packages, scripts, configs
//!     Mods/mod_data/                  wholesale data directories
//!     mod_documentation/<mod_name>/   text files
//! ```
//!
//! Every source file is unpacked into a freshly wiped scratch directory,
//! routed by extension, and checked against `version_info` for the artifact
//! suffix. Problems with a single file are reported and the build continues.

pub mod extract;
pub mod prefix;
pub mod route;
pub mod suffix;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use extract::Extracted;
use suffix::{SuffixUpdate, VersionSuffix};

/// Name of the scratch directory under the download folder.
pub const SCRATCH_DIR: &str = "u";

/// Paths of one build's release tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    pub root: PathBuf,
    pub mods: PathBuf,
    pub scripts: PathBuf,
    pub docs: PathBuf,
}

impl BuildLayout {
    pub fn new(release_dir: &Path, build: &str, mods_folder: &str) -> Self {
        let root = release_dir.join(build);
        let mods = root.join("Mods");
        Self {
            scripts: mods.join(mods_folder),
            docs: root.join("mod_documentation"),
            mods,
            root,
        }
    }

    /// Creates the `Mods/<scripts>` chain.
    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(&self.scripts)
            .with_context(|| format!("create {}", self.scripts.display()))
    }

    /// Documentation folder for one source file.
    pub fn docs_for(&self, mod_name: &str) -> PathBuf {
        self.docs.join(mod_name)
    }
}

/// Source file name without its last extension (`mod.v1.2.zip` -> `mod.v1.2`).
pub fn mod_name(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
}

/// What happened while assembling one build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub suffix: VersionSuffix,
    /// Source files with an unknown type (skipped).
    pub unsupported: Vec<String>,
    /// Extracted files no routing rule accepted.
    pub unroutable: Vec<PathBuf>,
    /// Source files matching `version_info` whose version could not be read.
    pub unversioned: Vec<String>,
    /// `(file, error)` for sources that could not be unpacked or routed.
    pub failed: Vec<(String, String)>,
}

fn unpack_and_route(
    source: &Path,
    scratch: &Path,
    layout: &BuildLayout,
    file: &str,
    report: &mut BuildReport,
) -> Result<()> {
    match extract::extract(source, scratch)
        .with_context(|| format!("extract {}", source.display()))?
    {
        Extracted::Files(n) => {
            tracing::debug!(file = %file, files = n, "extracted");
            let routed = route::route(scratch, layout, mod_name(file))?;
            report.unroutable.extend(routed.unroutable);
        }
        Extracted::Unsupported => {
            tracing::error!(file = %source.display(), "can't process file (unknown file type)");
            report.unsupported.push(file.to_string());
        }
    }
    Ok(())
}

/// Wipes and recreates the scratch directory.
pub fn reset_scratch(scratch: &Path) -> Result<()> {
    if scratch.exists() {
        fs::remove_dir_all(scratch).with_context(|| format!("wipe {}", scratch.display()))?;
    }
    fs::create_dir_all(scratch).with_context(|| format!("create {}", scratch.display()))
}

/// Assembles `build` under `release_dir`, reading sources from `download_dir`.
pub fn assemble_build(
    cfg: &Config,
    build: &str,
    download_dir: &Path,
    release_dir: &Path,
) -> Result<BuildReport> {
    let layout = BuildLayout::new(release_dir, build, &cfg.default_mods_folder);
    layout.create()?;
    let scratch = download_dir.join(SCRATCH_DIR);

    let mut report = BuildReport::default();

    for file in cfg.build_files(build) {
        tracing::info!(build = %build, file = %file, "processing");
        reset_scratch(&scratch)?;

        let source = download_dir.join(file);
        if let Err(e) = unpack_and_route(&source, &scratch, &layout, file, &mut report) {
            let msg = format!("{:#}", e);
            tracing::error!(file = %file, error = %msg, "source file failed, build continues");
            report.failed.push((file.clone(), msg));
        }

        prefix::strip_prefix_in(&layout.scripts, &cfg.strip_prefix)?;

        match suffix::accumulate(&mut report.suffix, file, &cfg.version_info) {
            SuffixUpdate::NotTracked => {}
            SuffixUpdate::Appended { tag, version } => {
                tracing::debug!(file = %file, tag = %tag, version = %version, "version suffix");
            }
            SuffixUpdate::NoVersion { tag } => {
                tracing::warn!(file = %file, tag = %tag, "no version in file name");
                report.unversioned.push(file.clone());
            }
        }
    }

    Ok(report)
}

//! The whole run: fetch, then assemble, document and zip every build.
//!
//! Builds only start once every download is verified. A checksum failure
//! returns before the release directory is touched.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::archive;
use crate::assemble::{self, BuildReport};
use crate::config::Config;
use crate::fetch::{self, FetchReport, Strategies};
use crate::readme;

/// Directories derived from the work root and config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    /// `<root>/<download_folder>`: raw downloads and scratch.
    pub download_dir: PathBuf,
    /// `<download_dir>/release`: build trees and artifacts.
    pub release_dir: PathBuf,
}

impl RunPaths {
    pub fn new(work_root: &Path, cfg: &Config) -> Self {
        let download_dir = work_root.join(&cfg.download_folder);
        Self {
            release_dir: download_dir.join("release"),
            download_dir,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuiltArtifact {
    pub build: String,
    pub path: PathBuf,
    pub report: BuildReport,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// At least one file is missing or has the wrong checksum; nothing was built.
    ChecksumFailure(FetchReport),
    Built {
        fetch: FetchReport,
        artifacts: Vec<BuiltArtifact>,
    },
}

impl RunOutcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::ChecksumFailure(_) => 1,
            RunOutcome::Built { .. } => 0,
        }
    }

    pub fn fetch_report(&self) -> &FetchReport {
        match self {
            RunOutcome::ChecksumFailure(fetch) | RunOutcome::Built { fetch, .. } => fetch,
        }
    }
}

/// Runs the full pipeline below `work_root`.
pub fn run(cfg: &Config, work_root: &Path, strategies: &Strategies) -> Result<RunOutcome> {
    let paths = RunPaths::new(work_root, cfg);
    let fetch = fetch_phase(cfg, &paths, strategies)?;
    build_phase(cfg, &paths, fetch)
}

/// Makes every configured URL available in the download folder.
///
/// The returned report is complete even when a later build fails, so prompts
/// and computed checksums can be shown before [`build_phase`] starts.
pub fn fetch_phase(cfg: &Config, paths: &RunPaths, strategies: &Strategies) -> Result<FetchReport> {
    fetch::fetch_all(cfg, &paths.download_dir, strategies)
}

/// Builds every artifact, unless `fetch` has failures.
pub fn build_phase(cfg: &Config, paths: &RunPaths, fetch: FetchReport) -> Result<RunOutcome> {
    if !fetch.is_ok() {
        tracing::error!(failed = ?fetch.failed_names(), "checksum verification failed, not building");
        return Ok(RunOutcome::ChecksumFailure(fetch));
    }
    let artifacts = build_all(cfg, paths)?;
    Ok(RunOutcome::Built { fetch, artifacts })
}

/// Rebuilds the release directory from scratch and produces every artifact.
pub fn build_all(cfg: &Config, paths: &RunPaths) -> Result<Vec<BuiltArtifact>> {
    if paths.release_dir.exists() {
        fs::remove_dir_all(&paths.release_dir)
            .with_context(|| format!("wipe {}", paths.release_dir.display()))?;
    }
    fs::create_dir_all(&paths.release_dir)
        .with_context(|| format!("create {}", paths.release_dir.display()))?;

    cfg.builds
        .iter()
        .map(|build| build_one(cfg, build, paths))
        .collect()
}

fn build_one(cfg: &Config, build: &str, paths: &RunPaths) -> Result<BuiltArtifact> {
    tracing::info!(build = %build, "building");
    let report = assemble::assemble_build(cfg, build, &paths.download_dir, &paths.release_dir)?;
    let layout = assemble::BuildLayout::new(&paths.release_dir, build, &cfg.default_mods_folder);

    readme::write_readme(
        &cfg.readme_template_path(),
        &cfg.banner,
        cfg.build_files(build),
        &cfg.build_notes_path(build),
        &layout.root.join("README.txt"),
    )?;

    let path = paths.release_dir.join(archive::artifact_name(
        build,
        &cfg.version,
        report.suffix.as_str(),
    ));
    archive::zip_dir(&layout.root, &path)?;
    Ok(BuiltArtifact {
        build: build.to_string(),
        path,
        report,
    })
}

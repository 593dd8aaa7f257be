//! Fetch phase: make every configured URL available as a verified local file.
//!
//! Each URL is checked against the on-disk cache, downloaded once if absent
//! (or deleted for a wrong checksum), then verified again. The phase never
//! aborts half-way; failures are collected in [`FetchReport`] and the caller
//! decides whether builds may run.

mod cloud;
mod http;
mod strategy;

pub use cloud::CloudDownload;
pub use http::HttpDownload;
pub use strategy::{DownloadStrategy, FetchOutcome, HostKind, ManualDownload, Strategies};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::checksum::{self, Verification};
use crate::config::Config;
use crate::url_model;

/// A file the operator must download by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualDownloadNeeded {
    pub file_name: String,
    pub source: String,
}

/// A file that is absent or still has the wrong checksum after the fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub file_name: String,
    pub path: PathBuf,
    pub expected: String,
    /// Digest of the rejected download, if one was made.
    pub actual: Option<String>,
    /// Download error, if the attempt itself failed.
    pub reason: Option<String>,
}

/// Result of [`fetch_all`].
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Files that are present and usable, in configuration order.
    pub ready: Vec<PathBuf>,
    /// `(file_name, sha256)` of files without a configured checksum.
    pub unpinned: Vec<(String, String)>,
    pub manual: Vec<ManualDownloadNeeded>,
    pub failed: Vec<FailedFile>,
}

impl FetchReport {
    /// True when builds may proceed.
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.file_name.as_str()).collect()
    }
}

/// Runs the fetch phase for every URL in `cfg`, in configuration order.
///
/// Only I/O errors unrelated to a single download (e.g. an unwritable
/// download folder) are returned as `Err`.
pub fn fetch_all(cfg: &Config, download_dir: &Path, strategies: &Strategies) -> Result<FetchReport> {
    fs::create_dir_all(download_dir)
        .with_context(|| format!("create {}", download_dir.display()))?;

    let mut report = FetchReport::default();
    for (url, expected) in &cfg.urls {
        fetch_one(url, expected, download_dir, strategies, &mut report)?;
    }
    tracing::info!(
        ready = report.ready.len(),
        failed = report.failed.len(),
        manual = report.manual.len(),
        "fetch phase finished"
    );
    Ok(report)
}

fn fetch_one(
    url: &str,
    expected: &str,
    download_dir: &Path,
    strategies: &Strategies,
    report: &mut FetchReport,
) -> Result<()> {
    let file_name = url_model::file_name_for(url)
        .with_context(|| format!("URL {} does not end in a file name", url))?;
    let path = download_dir.join(&file_name);
    tracing::debug!(file = %path.display(), "checking");

    let cached = checksum::verify(&path, expected)?;
    if let Verification::Mismatch { actual } = &cached {
        tracing::info!(file = %file_name, actual = %actual, "cached copy rejected, re-downloading");
    }

    let mut reason = None;
    let verification = if cached.is_usable() {
        cached
    } else {
        let strategy = strategies.select(url);
        tracing::debug!(url = %url, strategy = strategy.name(), "fetching");
        match strategy.fetch(url, &path) {
            FetchOutcome::Downloaded => {}
            FetchOutcome::ManualActionRequired { file_name, source } => {
                report.manual.push(ManualDownloadNeeded { file_name, source });
            }
            FetchOutcome::Failed(why) => {
                tracing::warn!(url = %url, reason = %why, "download failed");
                reason = Some(why);
            }
        }
        checksum::verify(&path, expected)?
    };

    match verification {
        Verification::Matched => report.ready.push(path),
        Verification::Unpinned { actual } => {
            tracing::info!(file = %file_name, sha256 = %actual, "no checksum configured");
            report.unpinned.push((file_name, actual));
            report.ready.push(path);
        }
        Verification::Missing => report.failed.push(FailedFile {
            file_name,
            path,
            expected: expected.to_string(),
            actual: None,
            reason,
        }),
        Verification::Mismatch { actual } => {
            tracing::error!(file = %file_name, actual = %actual, expected = %expected, "wrong checksum");
            report.failed.push(FailedFile {
                file_name,
                path,
                expected: expected.to_string(),
                actual: Some(actual),
                reason,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Writes fixed bytes and counts calls.
    struct FakeHttp {
        body: &'static [u8],
        calls: std::rc::Rc<Cell<u32>>,
    }

    impl DownloadStrategy for FakeHttp {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn fetch(&self, _url: &str, target: &Path) -> FetchOutcome {
            self.calls.set(self.calls.get() + 1);
            match fs::write(target, self.body) {
                Ok(()) => FetchOutcome::Downloaded,
                Err(e) => FetchOutcome::Failed(e.to_string()),
            }
        }
    }

    const HELLO_SHA256: &str = "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03";

    fn config(urls: &[(&str, &str)]) -> Config {
        let mut toml = String::from(
            "__VERSION__ = \"b\"\nversion = \"v\"\ndownload_folder = \"d\"\n\
             default_mods_folder = \"m\"\nbuilds = [\"B\"]\n[files]\nB = []\n[urls]\n",
        );
        for (u, c) in urls {
            toml.push_str(&format!("{:?} = {:?}\n", u, c));
        }
        Config::from_toml_str(&toml).unwrap()
    }

    fn strategies(body: &'static [u8]) -> (Strategies, std::rc::Rc<Cell<u32>>) {
        let calls = std::rc::Rc::new(Cell::new(0));
        let s = Strategies::new(&Default::default()).with_http(Box::new(FakeHttp {
            body,
            calls: calls.clone(),
        }));
        (s, calls)
    }

    #[test]
    fn downloads_and_matches() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&[("https://example.com/a.zip", HELLO_SHA256)]);
        let (s, calls) = strategies(b"hello\n");
        let report = fetch_all(&cfg, dir.path(), &s).unwrap();
        assert!(report.is_ok());
        assert_eq!(calls.get(), 1);
        let path = dir.path().join("a.zip");
        assert_eq!(report.ready, vec![path.clone()]);
        assert_eq!(checksum::sha256_path(&path).unwrap(), HELLO_SHA256);
    }

    #[test]
    fn cached_match_skips_download() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.zip"), b"hello\n").unwrap();
        let cfg = config(&[("https://example.com/a.zip", HELLO_SHA256)]);
        let (s, calls) = strategies(b"other");
        let report = fetch_all(&cfg, dir.path(), &s).unwrap();
        assert!(report.is_ok());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn stale_cache_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.zip"), b"stale").unwrap();
        let cfg = config(&[("https://example.com/a.zip", HELLO_SHA256)]);
        let (s, calls) = strategies(b"hello\n");
        let report = fetch_all(&cfg, dir.path(), &s).unwrap();
        assert!(report.is_ok());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn persistent_mismatch_fails_and_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&[
            ("https://example.com/a.zip", "00ff"),
            ("https://example.com/b.zip", ""),
        ]);
        let (s, calls) = strategies(b"hello\n");
        let report = fetch_all(&cfg, dir.path(), &s).unwrap();
        assert!(!report.is_ok());
        assert_eq!(calls.get(), 2, "all URLs are processed");
        assert_eq!(report.failed_names(), vec!["a.zip"]);
        assert_eq!(report.failed[0].actual.as_deref(), Some(HELLO_SHA256));
        assert!(!dir.path().join("a.zip").exists());
        assert_eq!(
            report.unpinned,
            vec![("b.zip".to_string(), HELLO_SHA256.to_string())]
        );
    }

    #[test]
    fn manual_host_is_reported_and_counted_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&[("https://www.nexusmods.com/sims4/mods/1#/x.zip", "")]);
        let (s, calls) = strategies(b"hello\n");
        let report = fetch_all(&cfg, dir.path(), &s).unwrap();
        assert_eq!(calls.get(), 0);
        assert_eq!(report.manual.len(), 1);
        assert_eq!(report.manual[0].file_name, "x.zip");
        assert_eq!(report.failed_names(), vec!["x.zip"]);
        assert!(report.failed[0].actual.is_none());
    }

    #[test]
    fn cloud_client_failure_becomes_manual_prompt_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&[("https://mega.nz/file/AbC#key/pack.zip", "")]);
        let (s, calls) = strategies(b"hello\n");
        let s = s.with_cloud(Box::new(CloudDownload::new("modbuild-test-no-such-client")));
        let report = fetch_all(&cfg, dir.path(), &s).unwrap();
        assert_eq!(calls.get(), 0);
        assert_eq!(
            report.manual,
            vec![ManualDownloadNeeded {
                file_name: "pack.zip".into(),
                source: "https://mega.nz/file/AbC#key".into(),
            }]
        );
        assert_eq!(report.failed_names(), vec!["pack.zip"]);
        assert!(!dir.path().join("pack.zip").exists());
    }
}

//! Download strategies selected by URL prefix.

use std::path::Path;

use crate::config::HostRules;
use crate::url_model;

use super::cloud::CloudDownload;
use super::http::HttpDownload;

/// Uniform result of a download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file now exists at the target path (not yet verified).
    Downloaded,
    /// The operator has to fetch `file_name` from `source` by hand.
    ManualActionRequired { file_name: String, source: String },
    /// The attempt failed; the target path was not written.
    Failed(String),
}

/// One way of getting a URL onto disk.
pub trait DownloadStrategy {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Fetch `url` into `target`. Must not leave a partial file at `target`.
    fn fetch(&self, url: &str, target: &Path) -> FetchOutcome;
}

/// Which strategy a URL falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Manual,
    Cloud,
    Http,
}

impl HostRules {
    /// Manual prefixes win over cloud prefixes; everything else is plain HTTP.
    pub fn classify(&self, url: &str) -> HostKind {
        if self.manual.iter().any(|p| url.starts_with(p.as_str())) {
            HostKind::Manual
        } else if self.cloud.iter().any(|p| url.starts_with(p.as_str())) {
            HostKind::Cloud
        } else {
            HostKind::Http
        }
    }
}

fn manual_outcome(url: &str) -> FetchOutcome {
    let (source, raw_name) = url_model::split_url(url);
    FetchOutcome::ManualActionRequired {
        file_name: url_model::sanitize_file_name(raw_name),
        source: source.to_string(),
    }
}

/// Restricted hosts: never downloads, always asks for a manual download.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualDownload;

impl DownloadStrategy for ManualDownload {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn fetch(&self, url: &str, _target: &Path) -> FetchOutcome {
        manual_outcome(url)
    }
}

/// The strategy set for one run.
pub struct Strategies {
    rules: HostRules,
    manual: Box<dyn DownloadStrategy>,
    cloud: Box<dyn DownloadStrategy>,
    http: Box<dyn DownloadStrategy>,
}

impl Strategies {
    /// Default strategies for the given host rules.
    pub fn new(rules: &HostRules) -> Self {
        Self {
            rules: rules.clone(),
            manual: Box::new(ManualDownload),
            cloud: Box::new(CloudDownload::new(&rules.cloud_command)),
            http: Box::new(HttpDownload::default()),
        }
    }

    /// Replaces the plain-HTTP strategy.
    pub fn with_http(mut self, http: Box<dyn DownloadStrategy>) -> Self {
        self.http = http;
        self
    }

    /// Replaces the cloud-storage strategy.
    pub fn with_cloud(mut self, cloud: Box<dyn DownloadStrategy>) -> Self {
        self.cloud = cloud;
        self
    }

    pub fn select(&self, url: &str) -> &dyn DownloadStrategy {
        match self.rules.classify(url) {
            HostKind::Manual => self.manual.as_ref(),
            HostKind::Cloud => self.cloud.as_ref(),
            HostKind::Http => self.http.as_ref(),
        }
    }
}

/// Downgrades any cloud failure to a manual prompt.
pub(super) fn manual_after_failure(url: &str, reason: &str) -> FetchOutcome {
    tracing::warn!(url = %url, reason = %reason, "cloud download failed");
    manual_outcome(url)
}

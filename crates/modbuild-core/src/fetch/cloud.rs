//! Cloud-storage downloads delegated to an external authenticated client.
//!
//! The client is run as `<command> --path <target file> <link>`, where `<link>`
//! is the configured URL up to its last `/`. The file is saved under the
//! configured name, not the remote one. Anything short of the target file
//! appearing on disk becomes a manual-download prompt.

use std::path::Path;
use std::process::Command;

use crate::url_model;

use super::strategy::{manual_after_failure, DownloadStrategy, FetchOutcome};

#[derive(Debug, Clone)]
pub struct CloudDownload {
    command: String,
}

impl CloudDownload {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

impl DownloadStrategy for CloudDownload {
    fn name(&self) -> &'static str {
        "cloud"
    }

    fn fetch(&self, url: &str, target: &Path) -> FetchOutcome {
        let (link, _) = url_model::split_url(url);
        tracing::info!(url = %url, command = %self.command, "downloading from cloud storage");

        let output = match Command::new(&self.command)
            .arg("--path")
            .arg(target)
            .arg(link)
            .output()
        {
            Ok(o) => o,
            Err(e) => return manual_after_failure(url, &format!("{}: {}", self.command, e)),
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return manual_after_failure(
                url,
                &format!("{} exited with {}: {}", self.command, output.status, stderr.trim()),
            );
        }
        if !target.is_file() {
            return manual_after_failure(
                url,
                &format!("{} did not produce {}", self.command, target.display()),
            );
        }
        FetchOutcome::Downloaded
    }
}

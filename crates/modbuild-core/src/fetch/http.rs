//! Plain HTTP GET via libcurl.
//!
//! The body goes to a temp file next to the target and is moved into place
//! only on a 2xx status, so a failed request never leaves a file behind.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use super::strategy::{DownloadStrategy, FetchOutcome};

const USER_AGENT: &str = concat!("modbuild/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDownload;

impl HttpDownload {
    /// GETs `url` into `target`; returns the HTTP status.
    fn get_to_file(&self, url: &str, target: &Path) -> Result<u32> {
        let dir = target
            .parent()
            .with_context(|| format!("no parent directory for {}", target.display()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("create temp file in {}", dir.display()))?;
        let mut write_err: Option<std::io::Error> = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(url).context("invalid URL")?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(USER_AGENT)?;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match tmp.write_all(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };
        if let Some(e) = write_err {
            return Err(e).with_context(|| format!("write body of {}", url));
        }
        performed.context("GET request failed")?;

        let code = easy.response_code().context("no response code")?;
        if (200..300).contains(&code) {
            tmp.flush()?;
            tmp.persist(target)
                .with_context(|| format!("persist {}", target.display()))?;
        }
        Ok(code)
    }
}

impl DownloadStrategy for HttpDownload {
    fn name(&self) -> &'static str {
        "http"
    }

    fn fetch(&self, url: &str, target: &Path) -> FetchOutcome {
        tracing::info!(url = %url, "downloading");
        match self.get_to_file(url, target) {
            Ok(code) if (200..300).contains(&code) => FetchOutcome::Downloaded,
            Ok(code) => FetchOutcome::Failed(format!("GET {} returned HTTP {}", url, code)),
            Err(e) => FetchOutcome::Failed(format!("{:#}", e)),
        }
    }
}

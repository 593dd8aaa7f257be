//! Zipping an assembled build directory into its release artifact.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// Artifact file name: `<build>_<version><suffix>.zip`.
pub fn artifact_name(build: &str, version: &str, suffix: &str) -> String {
    format!("{}_{}{}.zip", build, version, suffix)
}

/// Compresses everything below `src` into the zip file `dest`.
///
/// Entry names are relative to `src` with `/` separators, directories included,
/// in sorted order. Returns the number of files written.
pub fn zip_dir(src: &Path, dest: &Path) -> Result<usize> {
    let out = File::create(dest).with_context(|| format!("create {}", dest.display()))?;
    let mut zip = zip::ZipWriter::new(BufWriter::new(out));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = 0;
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("{} outside {}", entry.path().display(), src.display()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            let mut f = File::open(entry.path())
                .with_context(|| format!("open {}", entry.path().display()))?;
            io::copy(&mut f, &mut zip)
                .with_context(|| format!("compress {}", entry.path().display()))?;
            files += 1;
        }
    }
    zip.finish()
        .with_context(|| format!("finish {}", dest.display()))?;
    tracing::info!(artifact = %dest.display(), files, "wrote release archive");
    Ok(files)
}

//! Unpacking one source file into the scratch directory.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

/// How a downloaded source file is unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A single package or script, copied as-is.
    Plain,
    /// A zip archive, expanded.
    Zip,
    Unsupported,
}

const PLAIN_EXTENSIONS: [&str; 2] = ["package", "ts4script"];

pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Self {
        if PLAIN_EXTENSIONS.iter().any(|ext| has_extension(path, ext)) {
            SourceKind::Plain
        } else if has_extension(path, "zip") {
            SourceKind::Zip
        } else {
            SourceKind::Unsupported
        }
    }
}

/// Result of [`extract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extracted {
    /// Number of files placed in scratch.
    Files(usize),
    /// Unknown file type; nothing was placed in scratch.
    Unsupported,
}

/// Unpacks `source` into `scratch` according to its extension.
pub fn extract(source: &Path, scratch: &Path) -> Result<Extracted> {
    match SourceKind::from_path(source) {
        SourceKind::Plain => {
            let name = source
                .file_name()
                .with_context(|| format!("no file name in {}", source.display()))?;
            fs::copy(source, scratch.join(name))
                .with_context(|| format!("copy {} to scratch", source.display()))?;
            Ok(Extracted::Files(1))
        }
        SourceKind::Zip => unzip(source, scratch).map(Extracted::Files),
        SourceKind::Unsupported => Ok(Extracted::Unsupported),
    }
}

/// Expands a zip archive below `dest`. Entries whose path would leave `dest`
/// (absolute, `..`) are skipped with a warning.
fn unzip(archive_path: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive_path)
        .with_context(|| format!("open {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .with_context(|| format!("read zip {}", archive_path.display()))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("read entry {} of {}", i, archive_path.display()))?;
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(archive = %archive_path.display(), entry = %entry.name(), "skipping unsafe zip entry");
            continue;
        };
        let out = dest.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out_file =
            File::create(&out).with_context(|| format!("create {}", out.display()))?;
        io::copy(&mut entry, &mut out_file)
            .with_context(|| format!("extract {}", out.display()))?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn source_kind_by_extension() {
        assert_eq!(SourceKind::from_path(Path::new("a.package")), SourceKind::Plain);
        assert_eq!(SourceKind::from_path(Path::new("a.TS4SCRIPT")), SourceKind::Plain);
        assert_eq!(SourceKind::from_path(Path::new("a.v1.2.zip")), SourceKind::Zip);
        assert_eq!(SourceKind::from_path(Path::new("a.rar")), SourceKind::Unsupported);
    }

    #[test]
    fn plain_file_is_copied() {
        let src = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let pkg = src.path().join("cn_mod.package");
        fs::write(&pkg, b"pkg").unwrap();
        assert_eq!(extract(&pkg, scratch.path()).unwrap(), Extracted::Files(1));
        assert_eq!(fs::read(scratch.path().join("cn_mod.package")).unwrap(), b"pkg");
        assert!(pkg.exists(), "source stays in the download cache");
    }

    #[test]
    fn zip_is_expanded_with_subdirectories() {
        let src = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let archive = src.path().join("mod.zip");
        write_zip(
            &archive,
            &[("Mods/mod.ts4script", b"s"), ("readme.txt", b"r")],
        );
        assert_eq!(extract(&archive, scratch.path()).unwrap(), Extracted::Files(2));
        assert!(scratch.path().join("Mods/mod.ts4script").is_file());
        assert!(scratch.path().join("readme.txt").is_file());
    }

    #[test]
    fn traversal_entries_are_skipped() {
        let src = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let archive = src.path().join("evil.zip");
        write_zip(&archive, &[("../escape.txt", b"x"), ("ok.txt", b"y")]);
        assert_eq!(extract(&archive, scratch.path()).unwrap(), Extracted::Files(1));
        assert!(!scratch.path().parent().unwrap().join("escape.txt").exists());
    }

    #[test]
    fn unknown_type_is_reported() {
        let src = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let rar = src.path().join("mod.rar");
        fs::write(&rar, b"rar").unwrap();
        assert_eq!(extract(&rar, scratch.path()).unwrap(), Extracted::Unsupported);
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
    }
}

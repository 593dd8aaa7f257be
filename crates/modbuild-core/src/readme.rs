//! README for a build: template with version banner, file list, build notes.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Token in the template replaced by the configured banner.
pub const VERSION_TOKEN: &str = "__VERSION__";

/// Renders the README text.
///
/// The included-files list and `notes` follow the substituted template
/// verbatim, with CRLF line breaks.
pub fn render(template: &str, banner: &str, files: &[String], notes: Option<&str>) -> String {
    let mut out = template.replace(VERSION_TOKEN, banner);
    out.push_str("\r\n\r\nIncluded mods:");
    for file in files {
        out.push_str(&format!(" '{}',", file));
    }
    out.push_str("\r\n");
    if let Some(notes) = notes {
        out.push_str(notes);
    }
    out
}

/// Writes `out` from the template file and optional build notes file.
///
/// A missing template is an error; missing notes are skipped with a warning.
pub fn write_readme(
    template: &Path,
    banner: &str,
    files: &[String],
    notes: &Path,
    out: &Path,
) -> Result<()> {
    let template_text = fs::read_to_string(template)
        .with_context(|| format!("read README template {}", template.display()))?;
    let notes_text = match fs::read_to_string(notes) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %notes.display(), "no build notes, README has only the template");
            None
        }
        Err(e) => {
            return Err(e).with_context(|| format!("read build notes {}", notes.display()));
        }
    };
    let text = render(&template_text, banner, files, notes_text.as_deref());
    fs::write(out, text).with_context(|| format!("write {}", out.display()))
}

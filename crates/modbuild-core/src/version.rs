//! Version numbers embedded in mod file names.
//!
//! Mod authors publish files like `sims4communitylib.v1.69.zip`,
//! `mc_cmd_center_2021_6_1.zip` or `tool.v1.70-beta1.zip`. The number is
//! found in the file stem and rendered dotted, e.g. `1.69`, `2021.6.1`,
//! `1.70-beta1`.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Multi-part versions: `1.69`, `v2.7.1`, `2021_6_1`, optionally followed by a
/// pre-release tag.
fn dotted() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:^|[^0-9A-Za-z])v?(\d+(?:[._]\d+)+)(?:[-_.]?((?:alpha|beta|rc|pre|dev)\d*))?",
        )
        .expect("static regex")
    })
}

/// Single-number versions need an explicit `v`: `mod_v3.zip`.
fn single() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:^|[^0-9A-Za-z])v(\d+)(?:[-_.]?((?:alpha|beta|rc|pre|dev)\d*))?")
            .expect("static regex")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModVersion {
    /// Numeric components, digits kept verbatim (`07` stays `07`).
    pub parts: Vec<String>,
    /// Pre-release tag, lowercased, e.g. `beta1`.
    pub pre: Option<String>,
}

/// Drops a trailing extension such as `.zip` or `.ts4script`. A purely numeric
/// tail (`mod.v1.69`) is part of the version, not an extension.
fn stem(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((s, ext))
            if ext.chars().all(|c| c.is_ascii_alphanumeric())
                && ext.chars().any(|c| c.is_ascii_alphabetic()) =>
        {
            s
        }
        _ => file_name,
    }
}

impl ModVersion {
    /// Extracts the last version found in `file_name`'s stem.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = stem(file_name);
        let caps = dotted()
            .captures_iter(stem)
            .last()
            .or_else(|| single().captures_iter(stem).last())?;
        let parts = caps
            .get(1)?
            .as_str()
            .split(['.', '_'])
            .map(str::to_string)
            .collect();
        let pre = caps.get(2).map(|m| m.as_str().to_ascii_lowercase());
        Some(Self { parts, pre })
    }
}

impl fmt::Display for ModVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("."))?;
        if let Some(pre) = &self.pre {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

//! Version suffix accumulated into a build's artifact name.

use indexmap::IndexMap;
use std::fmt;

use crate::version::ModVersion;

/// Concatenation of `_<tag>-v<version>` parts, in source-file order.
///
/// Repeated tags are kept: a mod listed twice in one build contributes twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSuffix(String);

impl VersionSuffix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: &str, version: &ModVersion) {
        self.0.push('_');
        self.0.push_str(tag);
        self.0.push_str("-v");
        self.0.push_str(&version.to_string());
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VersionSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tag for `file_name`: the last `version_info` prefix that starts it.
pub fn tag_for<'a>(file_name: &str, version_info: &'a IndexMap<String, String>) -> Option<&'a str> {
    version_info
        .iter()
        .filter(|(prefix, _)| file_name.starts_with(prefix.as_str()))
        .map(|(_, tag)| tag.as_str())
        .last()
        .filter(|tag| !tag.is_empty())
}

/// Outcome of [`accumulate`] for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuffixUpdate {
    /// No `version_info` prefix matched.
    NotTracked,
    Appended { tag: String, version: ModVersion },
    /// A prefix matched but no version could be read from the file name.
    NoVersion { tag: String },
}

/// Appends the part for `file_name` to `suffix`, if any.
pub fn accumulate(
    suffix: &mut VersionSuffix,
    file_name: &str,
    version_info: &IndexMap<String, String>,
) -> SuffixUpdate {
    let Some(tag) = tag_for(file_name, version_info) else {
        return SuffixUpdate::NotTracked;
    };
    match ModVersion::parse(file_name) {
        Some(version) => {
            suffix.push(tag, &version);
            SuffixUpdate::Appended {
                tag: tag.to_string(),
                version,
            }
        }
        None => SuffixUpdate::NoVersion {
            tag: tag.to_string(),
        },
    }
}

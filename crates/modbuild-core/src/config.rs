//! Build specification loaded from a TOML file.
//!
//! ```toml
//! __VERSION__ = "2021-06-29 (PC: 1.76.81.1020 / Mac: 1.76.81.1220) The Sims 4"
//! version = "2021-06-29"
//! download_folder = "TS4.ModUpdater"
//! default_mods_folder = "_cn_"
//! builds = ["ColonolNutty-Patreon"]
//!
//! [version_info]
//! sims4communitylib = "S4CL"
//!
//! [urls]
//! "https://github.com/.../sims4communitylib.v1.69.zip" = "<sha256>"
//!
//! [files]
//! ColonolNutty-Patreon = ["sims4communitylib.v1.69.zip"]
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::url_model;

/// Default literal prefix stripped from script/config file names.
pub const DEFAULT_STRIP_PREFIX: &str = "cn_";

/// Default base README template, relative to the config file.
pub const DEFAULT_README_TEMPLATE: &str = "README.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// URL prefixes that decide how a file is downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostRules {
    /// Hosts that require a manual download (no download attempted).
    pub manual: Vec<String>,
    /// Cloud-storage hosts handed to `cloud_command`.
    pub cloud: Vec<String>,
    /// External client for cloud-storage downloads, invoked as `<cmd> --path <dir> <url>`.
    pub cloud_command: String,
}

impl Default for HostRules {
    fn default() -> Self {
        Self {
            manual: vec!["https://www.nexusmods.com/".to_string()],
            cloud: vec!["https://mega.nz/".to_string()],
            cloud_command: "megadl".to_string(),
        }
    }
}

/// The whole build specification. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Banner substituted for `__VERSION__` in the README template.
    #[serde(rename = "__VERSION__")]
    pub banner: String,
    /// Release version, part of every artifact name.
    pub version: String,
    /// Folder (under the work root) holding raw downloads and the release tree.
    pub download_folder: String,
    /// Scripts/config folder inside `Mods/`.
    #[serde(alias = "default_mods_dir")]
    pub default_mods_folder: String,
    /// File-name prefix -> short version tag, in declaration order.
    #[serde(default)]
    pub version_info: IndexMap<String, String>,
    /// URL -> expected SHA-256 (empty until first download).
    pub urls: IndexMap<String, String>,
    /// Build names, in processing order.
    pub builds: Vec<String>,
    /// Build name -> source file names.
    pub files: IndexMap<String, Vec<String>>,
    #[serde(default = "default_strip_prefix")]
    pub strip_prefix: String,
    #[serde(default = "default_readme_template")]
    pub readme_template: PathBuf,
    /// Directory with `README.<build>.txt`; defaults to the config file's directory.
    #[serde(default)]
    pub readme_dir: Option<PathBuf>,
    #[serde(default)]
    pub hosts: HostRules,
    /// Directory the config was loaded from; relative paths resolve against it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_strip_prefix() -> String {
    DEFAULT_STRIP_PREFIX.to_string()
}

fn default_readme_template() -> PathBuf {
    PathBuf::from(DEFAULT_README_TEMPLATE)
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg = Self::from_toml_str(&data)?;
        cfg.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        tracing::debug!(path = %path.display(), builds = cfg.builds.len(), urls = cfg.urls.len(), "loaded config");
        Ok(cfg)
    }

    /// Parse and validate config text. `base_dir` is left empty (current directory).
    pub fn from_toml_str(data: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Structural checks serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.builds.is_empty() {
            return Err(ConfigError::Invalid("`builds` is empty".into()));
        }
        for (key, value) in [
            ("download_folder", &self.download_folder),
            ("default_mods_folder", &self.default_mods_folder),
        ] {
            if !is_single_component(value) {
                return Err(ConfigError::Invalid(format!(
                    "`{}` must be a plain folder name, got {:?}",
                    key, value
                )));
            }
        }
        for url in self.urls.keys() {
            if let Err(e) = url::Url::parse(url) {
                return Err(ConfigError::Invalid(format!("bad URL {:?}: {}", url, e)));
            }
            if url_model::file_name_for(url).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "URL {:?} does not end in a file name",
                    url
                )));
            }
        }

        let known: Vec<String> = self
            .urls
            .keys()
            .filter_map(|u| url_model::file_name_for(u))
            .collect();
        for build in &self.builds {
            if !is_single_component(build) {
                return Err(ConfigError::Invalid(format!(
                    "build name {:?} must be a plain folder name",
                    build
                )));
            }
            let files = self.files.get(build).ok_or_else(|| {
                ConfigError::Invalid(format!("build {:?} has no entry in [files]", build))
            })?;
            for file in files {
                if !is_single_component(file) {
                    return Err(ConfigError::Invalid(format!(
                        "build {:?} lists {:?}, which is not a plain file name",
                        build, file
                    )));
                }
                if !known.iter().any(|k| k == file) {
                    tracing::warn!(build = %build, file = %file, "file has no configured URL; expecting a manual copy");
                }
            }
        }
        Ok(())
    }

    /// Files of one build, in processing order.
    pub fn build_files(&self, build: &str) -> &[String] {
        self.files.get(build).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolves a config-relative path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn readme_template_path(&self) -> PathBuf {
        self.resolve(&self.readme_template)
    }

    /// `README.<build>.txt` in `readme_dir` (or next to the config).
    pub fn build_notes_path(&self, build: &str) -> PathBuf {
        let dir = match &self.readme_dir {
            Some(d) => self.resolve(d),
            None => self.base_dir.clone(),
        };
        dir.join(format!("README.{}.txt", build))
    }
}

/// Root for downloads and scratch space: `$TMP`, `$tmp`, then the OS temp dir.
pub fn work_root() -> PathBuf {
    ["TMP", "tmp"]
        .iter()
        .filter_map(std::env::var_os)
        .find(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

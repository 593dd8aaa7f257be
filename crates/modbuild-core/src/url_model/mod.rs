//! URL modeling and local file naming.
//!
//! A download's local name is everything after the last `/` of the configured
//! URL, query and fragment included. Hosts without a usable path segment are
//! configured with a trailing `?dl/<name>` or `#/<name>`.

mod sanitize;

pub use sanitize::sanitize_file_name;

/// Splits `url` at its last `/` into `(source, raw_file_name)`.
///
/// `source` is what an operator should open for a manual download.
pub fn split_url(url: &str) -> (&str, &str) {
    match url.rfind('/') {
        Some(idx) => (&url[..idx], &url[idx + 1..]),
        None => ("", url),
    }
}

/// Local file name for a configured URL, or `None` if nothing usable follows the last `/`.
///
/// # Examples
///
/// - `"https://github.com/o/r/releases/download/v1/mod.zip"` → `"mod.zip"`
/// - `"https://www.simfileshare.net/download/1/?dl/mod.zip"` → `"mod.zip"`
/// - `"https://www.nexusmods.com/sims4/mods/1#/mod.zip"` → `"mod.zip"`
pub fn file_name_for(url: &str) -> Option<String> {
    let (_, raw) = split_url(url);
    let name = sanitize_file_name(raw);
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

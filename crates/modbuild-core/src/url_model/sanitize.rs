//! File name sanitization for download targets.

/// Makes a URL-derived name safe to join onto the download folder.
///
/// - Trims surrounding whitespace
/// - Replaces NUL, `/`, `\` and control characters with `_`
/// - Limits length to 255 bytes (Linux NAME_MAX)
///
/// Dots are kept: mod file names carry versions like `mod.v1.2.zip`.
pub fn sanitize_file_name(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let replaced: String = name
        .trim()
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = replaced.as_str();

    if cleaned.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !cleaned.is_char_boundary(take) {
            take -= 1;
        }
        cleaned[..take].to_string()
    } else {
        cleaned.to_string()
    }
}

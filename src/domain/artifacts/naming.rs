use crate::domain::foundation::Timestamp;

pub const ARTIFACT_EXTENSION: &str = "json";

/// Replaces characters that are unsafe in a filename with `_`.
///
/// An empty prefix becomes `artifact`.
pub fn sanitize_prefix(prefix: &str) -> String {
    let cleaned: String = prefix
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "artifact".to_string()
    } else {
        cleaned
    }
}

/// Builds `<prefix>_<YYYYMMDD_HHMMSS>_<8-hex>.json`.
pub fn artifact_filename(prefix: &str, at: &Timestamp, suffix: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        sanitize_prefix(prefix),
        at.filename_stamp(),
        suffix,
        ARTIFACT_EXTENSION
    )
}

/// Returns true for finished artifact files (temp files are excluded).
pub fn is_artifact_filename(name: &str) -> bool {
    !name.starts_with('.') && name.ends_with(".json")
}

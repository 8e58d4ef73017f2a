use regex::Regex;
use std::sync::OnceLock;

/// Characters that Windows, macOS or common Linux filesystems reject in a path segment.
const FORBIDDEN: &str = r#"[\\/:*?"<>|]"#;

fn forbidden_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FORBIDDEN).expect("forbidden character class is a valid regex"))
}

/// Turns an artist or album name into a folder name that is safe on common filesystems.
///
/// Every character from the set `\ / : * ? " < > |` is replaced by `_`. A name
/// that would resolve to the parent or current folder (`""`, `.` or `..`)
/// becomes `_`. The placeholder is not itself forbidden, so the function is
/// idempotent.
///
/// # Examples
///
/// ```
/// use albumfetch::foundation::utils::sanitize_folder_name;
///
/// assert_eq!(sanitize_folder_name("AC/DC: Live?"), "AC_DC_ Live_");
/// ```
pub fn sanitize_folder_name(name: &str) -> String {
    let sanitized = forbidden_chars().replace_all(name, "_");
    match sanitized.as_ref() {
        "" | "." | ".." => "_".to_string(),
        _ => sanitized.into_owned(),
    }
}

//! Container formats accepted for conversion.

use std::path::Path;

/// Suffixes the engine is trusted to demux, matched case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".avi", ".mkv", ".webm"];

/// Whether `file_name` ends in one of [`SUPPORTED_EXTENSIONS`].
#[must_use]
pub fn is_supported(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Reduce a client-supplied filename to its last path component.
///
/// Returns `None` when nothing usable is left (empty, `..`, a bare root).
#[must_use]
pub fn local_file_name(suggested: &str) -> Option<String> {
    // Clients on Windows send backslash-separated names.
    let last = suggested.rsplit(['/', '\\']).next()?;
    let name = Path::new(last).file_name()?.to_str()?;
    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

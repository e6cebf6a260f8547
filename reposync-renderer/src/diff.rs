//! Whole-file unified diffs.

use similar::TextDiff;

/// Lines of context around each hunk.
const CONTEXT_RADIUS: usize = 3;

/// Unified diff from the remote copy (`old`) to the tracked copy (`new`).
///
/// Both sides are read as UTF-8 (lossily). Headers are `a/<path>` and
/// `b/<path>`. Content that differs only in bytes the text view cannot show
/// is reported as a binary difference. The result always ends with `\n`.
pub fn unified_diff(path: &str, old: &[u8], new: &[u8]) -> String {
    let relative = path.trim_start_matches('/');
    let old_text = String::from_utf8_lossy(old);
    let new_text = String::from_utf8_lossy(new);

    let old_header = format!("a/{relative}");
    let new_header = format!("b/{relative}");
    let mut unified = TextDiff::from_lines(old_text.as_ref(), new_text.as_ref())
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(CONTEXT_RADIUS)
        .to_string();

    if !unified.contains("@@") {
        return format!("Binary files {old_header} and {new_header} differ\n");
    }
    if !unified.ends_with('\n') {
        unified.push('\n');
    }
    unified
}

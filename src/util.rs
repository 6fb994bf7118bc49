//! Batch-separator helpers shared by the script writer and its tests.

/// The batch separator written between script fragments.
pub const BATCH_SEPARATOR: &str = "GO";

/// True for a line holding only `GO` (any case, optional trailing `;`, surrounding whitespace).
#[inline]
pub fn is_batch_separator_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.eq_ignore_ascii_case("go") || trimmed.eq_ignore_ascii_case("go;")
}

/// True when the last non-blank line of `script` is a batch separator.
pub fn ends_with_batch_separator(script: &str) -> bool {
    script
        .trim_end()
        .lines()
        .last()
        .is_some_and(is_batch_separator_line)
}

/// Join script fragments into one file body.
///
/// Fragments are copied verbatim. Consecutive fragments are separated by a `GO`
/// line unless the preceding fragment already ends with one, and a line break is
/// added after a fragment only when it lacks one. Blank fragments are dropped.
pub fn join_batches<S: AsRef<str>>(fragments: &[S]) -> String {
    let mut script = String::new();
    let mut separated = true;
    for fragment in fragments {
        let fragment = fragment.as_ref();
        if fragment.trim().is_empty() {
            continue;
        }
        if !separated {
            script.push_str(BATCH_SEPARATOR);
            script.push('\n');
        }
        script.push_str(fragment);
        if !fragment.ends_with('\n') {
            script.push('\n');
        }
        separated = ends_with_batch_separator(fragment);
    }
    script
}

//! Line splitting for diff segments
//!
//! Segments produced by the line-granularity differ carry their `\n`
//! terminators, so a naive `split('\n')` invents a phantom empty line at the
//! end of every terminated segment. The boundary handling lives here, in one
//! place, instead of inside the alignment loop.

/// Split a segment's text into its display lines.
///
/// A single bare separator (`"\n"`) yields no lines at all, so an
/// empty-line-only segment does not add a blank row to the view. A segment
/// terminated by `\n` drops exactly one trailing empty element. Blank lines
/// anywhere else, including a leading one, are genuine content and are kept.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.iter().all(|line| line.is_empty()) {
        // "\n" is a bare separator; longer all-blank segments lose only the
        // phantom element after the final terminator
        if lines.len() == 2 {
            return Vec::new();
        }
        lines.pop();
    } else if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines.into_iter().map(str::to_owned).collect()
}

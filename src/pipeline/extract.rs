//! Figure extraction: find every `\includegraphics` argument in the merged text.
//!
//! This is pattern matching over raw lines, not a TeX parser. A line is
//! skipped only when its very first character is `%`; an escaped `\%` or a
//! comment starting mid-line is not understood.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_INCLUDEGRAPHICS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\includegraphics(?:\[.*?\])?\{(.*?)\}").unwrap());

/// Return the figure references in document order, duplicates included.
///
/// Each reference is the raw braced argument, e.g. `plots/demo` or
/// `fig.pdf`. An empty vector is a valid result.
pub fn extract_figure_references(content: &str) -> Vec<String> {
    content
        .split('\n')
        .filter(|line| !line.starts_with('%'))
        .flat_map(|line| {
            RE_INCLUDEGRAPHICS
                .captures_iter(line)
                .map(|caps| caps[1].to_string())
        })
        .collect()
}

//! Rewriting: point the flattened document at its new, co-located assets.
//!
//! ## Rule Order
//!
//! 1. Rename figures: every literal occurrence of each reference's file name
//!    becomes `Fig<N>`. This is a plain global replace over the whole text,
//!    so ordinary prose containing the same token is renamed too.
//! 2. Strip `\graphicspath{...}`: figures now sit next to the document.
//! 3. Replace `\bibliography{...}` with `\bibliography{References}`.
//!
//! The brace matching in rules 2 and 3 is shallow: the argument ends at the
//! first `}`, newlines included.

use crate::error::FlattenError;
use crate::pipeline::copy::figure_name;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::path::Path;
use tracing::debug;

/// The canonical bibliography directive written into the output.
pub const BIBLIOGRAPHY_DIRECTIVE: &str = r"\bibliography{References}";

/// Apply all three rules to `content`, using `figures` in extraction order.
pub fn rewrite_document(content: &str, figures: &[String]) -> String {
    let s = rename_figures(content, figures);
    let s = strip_graphicspath(&s);
    retarget_bibliography(&s)
}

/// Read `path`, rewrite it, and write the result back to the same file.
pub async fn rewrite_file(path: &Path, figures: &[String]) -> Result<(), FlattenError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FlattenError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    let rewritten = rewrite_document(&content, figures);

    tokio::fs::write(path, rewritten)
        .await
        .map_err(|e| FlattenError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    debug!(path = %path.display(), figures = figures.len(), "Rewrote document");
    Ok(())
}

// ── Rule 1: Rename figures ───────────────────────────────────────────────────

fn rename_figures(input: &str, figures: &[String]) -> String {
    let mut s = input.to_string();
    for (i, reference) in figures.iter().enumerate() {
        let Some(name) = Path::new(reference).file_name() else {
            continue;
        };
        let name = name.to_string_lossy();
        // An empty pattern would match between every character.
        if name.is_empty() {
            continue;
        }
        s = s.replace(&*name, &figure_name(i + 1));
    }
    s
}

// ── Rule 2: Strip the figure search path ─────────────────────────────────────

static RE_GRAPHICSPATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\graphicspath\s*\{[^}]*\}").unwrap());

fn strip_graphicspath(input: &str) -> String {
    RE_GRAPHICSPATH.replace_all(input, "").into_owned()
}

// ── Rule 3: Retarget the bibliography ────────────────────────────────────────

static RE_BIBLIOGRAPHY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\bibliography\s*\{[^}]*\}").unwrap());

fn retarget_bibliography(input: &str) -> String {
    RE_BIBLIOGRAPHY
        .replace_all(input, NoExpand(BIBLIOGRAPHY_DIRECTIVE))
        .into_owned()
}

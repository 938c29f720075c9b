//! Copy referenced figures under sequential names, plus TeX support files.
//!
//! Figure `N` of the extracted list (1-based) becomes `Fig<N>.<ext>`. The
//! rewriter uses the same list in the same order, so file names and in-text
//! names always agree.

use crate::error::FlattenError;
use crate::output::{CopiedFigure, CopySummary, SupportKind};
use crate::progress::FlattenProgressCallback;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Probe order for figure files. The first existing candidate wins.
pub const FIGURE_EXTENSIONS: [&str; 4] = ["pdf", "png", "jpg", "jpeg"];

/// Sequential name for the figure at `ordinal` (1-based), without extension.
pub fn figure_name(ordinal: usize) -> String {
    format!("Fig{ordinal}")
}

/// Copy each referenced figure from `figure_dir` into `target_dir`.
///
/// A figure with no candidate file is reported and skipped. A copy that
/// fails once a candidate was found aborts the whole stage.
pub async fn copy_figures(
    figures: &[String],
    figure_dir: &Path,
    target_dir: &Path,
    progress: &dyn FlattenProgressCallback,
) -> Result<CopySummary, FlattenError> {
    let mut summary = CopySummary {
        total: figures.len(),
        ..CopySummary::default()
    };

    for (i, reference) in figures.iter().enumerate() {
        let ordinal = i + 1;
        let stem = Path::new(reference)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let found = if stem.is_empty() {
            None
        } else {
            find_candidate(figure_dir, &stem).await
        };

        let Some((source, ext)) = found else {
            warn!(ordinal, reference = %reference, "No matching file found for figure");
            progress.on_figure_missing(ordinal, &stem);
            summary.missing.push((ordinal, stem));
            continue;
        };

        let target = target_dir.join(format!("{}.{}", figure_name(ordinal), ext));
        tokio::fs::copy(&source, &target)
            .await
            .map_err(|e| FlattenError::CopyFailed {
                from: source.clone(),
                to: target.clone(),
                source: e,
            })?;

        debug!(ordinal, from = %source.display(), to = %target.display(), "Copied figure");
        progress.on_figure_copied(ordinal, &source, &target);
        summary.copied.push(CopiedFigure {
            ordinal,
            source,
            target,
        });
    }

    info!(
        "Copied {} out of {} figures",
        summary.copied_count(),
        summary.total
    );
    progress.on_figures_copied(summary.copied_count(), summary.total);
    Ok(summary)
}

/// `<figure_dir>/<stem>.<ext>` for the first extension that exists.
async fn find_candidate(figure_dir: &Path, stem: &str) -> Option<(PathBuf, &'static str)> {
    for ext in FIGURE_EXTENSIONS {
        let candidate = figure_dir.join(format!("{stem}.{ext}"));
        if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return Some((candidate, ext));
        }
    }
    None
}

/// Copy every `*.cls`, `*.sty` and `*.bst` in `source_dir` into `target_dir`.
///
/// Only the top level of `source_dir` is scanned. Files are copied in name
/// order within each kind. Copying a directory onto itself would truncate
/// every file, so that is rejected before anything is touched.
pub async fn copy_support_files(
    source_dir: &Path,
    target_dir: &Path,
    progress: &dyn FlattenProgressCallback,
) -> Result<Vec<PathBuf>, FlattenError> {
    if same_directory(source_dir, target_dir).await {
        return Err(FlattenError::OutputIsSource {
            path: target_dir.to_path_buf(),
            source_dir: source_dir.to_path_buf(),
        });
    }

    let mut entries = tokio::fs::read_dir(source_dir)
        .await
        .map_err(|e| FlattenError::ScanFailed {
            path: source_dir.to_path_buf(),
            source: e,
        })?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FlattenError::ScanFailed {
            path: source_dir.to_path_buf(),
            source: e,
        })?
    {
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut copied = Vec::new();
    for kind in SupportKind::ALL {
        let mut count = 0;
        for file in files
            .iter()
            .filter(|p| p.extension().is_some_and(|e| e == kind.extension()))
        {
            let Some(name) = file.file_name() else {
                continue;
            };
            let target = target_dir.join(name);
            tokio::fs::copy(file, &target)
                .await
                .map_err(|e| FlattenError::CopyFailed {
                    from: file.clone(),
                    to: target.clone(),
                    source: e,
                })?;
            copied.push(target);
            count += 1;
        }

        if count > 0 {
            debug!(kind = %kind, count, "Copied support files");
            progress.on_support_files_copied(kind, count);
        }
    }

    Ok(copied)
}

/// True when both paths exist and name the same directory.
async fn same_directory(a: &Path, b: &Path) -> bool {
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

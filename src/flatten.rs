//! Pipeline driver: run every stage in order against one manuscript.
//!
//! Stages run strictly one after another. The first fatal error stops the
//! run and is returned; nothing is rolled back, so a failed run can leave a
//! partially populated output directory.

use crate::config::{FlattenConfig, MAIN_OUTPUT_NAME};
use crate::error::FlattenError;
use crate::output::{CopySummary, FlattenReport};
use crate::pipeline::tools::{ProcessRunner, ToolRunner};
use crate::pipeline::{copy, extract, rewrite, tools, validate};
use crate::progress::{NoopProgressCallback, ProgressCallback};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Flatten the manuscript described by `config`.
///
/// # Stages
/// 1. Validate inputs; all problems are returned together as
///    [`FlattenError::InvalidInputs`] before anything is created. An output
///    directory that is the source directory is refused.
/// 2. Create the output directory if needed.
/// 3. Export the bibliography. Failure here is only a warning.
/// 4. Expand the main document into a temporary file. Failure is fatal.
/// 5. Extract figure references and copy the figures.
/// 6. Move the merged document to `<output>/Main.tex`; copy support files.
/// 7. Rewrite figure names, search path and bibliography in place.
///
/// # Errors
/// Any fatal stage failure; see [`FlattenError`].
pub async fn flatten(config: &FlattenConfig) -> Result<FlattenReport, FlattenError> {
    let callback: ProgressCallback = config
        .progress_callback
        .clone()
        .unwrap_or_else(|| Arc::new(NoopProgressCallback));
    let progress = callback.as_ref();

    // ── Step 1: Validate ─────────────────────────────────────────────────
    let problems = validate::validate_inputs(config);
    if !problems.is_empty() {
        return Err(FlattenError::InvalidInputs { problems });
    }
    validate::check_output_dir(config)?;
    info!(main = %config.main_path().display(), "Inputs validated");

    let runner: Arc<dyn ToolRunner> = match config.runner {
        Some(ref runner) => Arc::clone(runner),
        None => Arc::new(ProcessRunner),
    };

    // ── Step 2: Output directory ─────────────────────────────────────────
    let target_dir = config.target_dir();
    if !target_dir.exists() {
        tokio::fs::create_dir_all(&target_dir)
            .await
            .map_err(|e| FlattenError::CreateDirFailed {
                path: target_dir.clone(),
                source: e,
            })?;
        debug!(path = %target_dir.display(), "Created output directory");
        progress.on_output_dir_created(&target_dir);
    }

    // ── Step 3: Bibliography (non-fatal) ─────────────────────────────────
    let exported = tools::export_bibliography(runner.as_ref(), config, progress).await;
    let bibliography = match exported {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(error = %e, "Bibliography export failed; continuing without it");
            progress.on_bibliography_skipped(&e.to_string());
            None
        }
    };

    // ── Step 4: Expand ───────────────────────────────────────────────────
    let merged = tools::expand_document(runner.as_ref(), config, &target_dir, progress).await?;
    let content = tokio::fs::read_to_string(merged.path())
        .await
        .map_err(|e| FlattenError::MergedFileFailed {
            path: merged.path().to_path_buf(),
            source: e,
        })?;
    progress.on_document_expanded(content.len());

    // ── Step 5: Figures ──────────────────────────────────────────────────
    let figures = extract::extract_figure_references(&content);
    info!("Found {} figure references", figures.len());
    progress.on_figures_found(figures.len());
    let copy_summary = if figures.is_empty() {
        CopySummary::default()
    } else {
        copy::copy_figures(&figures, &config.figure_path(), &target_dir, progress).await?
    };

    // ── Step 6: Relocate document, copy support files ────────────────────
    let main_document = target_dir.join(MAIN_OUTPUT_NAME);
    merged
        .persist(&main_document)
        .map_err(|e| FlattenError::WriteFailed {
            path: main_document.clone(),
            source: e.error,
        })?;
    progress.on_document_relocated(&main_document);
    let support_files =
        copy::copy_support_files(&config.source_dir(), &target_dir, progress).await?;

    // ── Step 7: Rewrite ──────────────────────────────────────────────────
    rewrite::rewrite_file(&main_document, &figures).await?;
    progress.on_document_rewritten(&main_document);

    info!(
        "Flattening complete: {}/{} figures copied into {}",
        copy_summary.copied_count(),
        figures.len(),
        target_dir.display()
    );

    Ok(FlattenReport {
        target_dir,
        main_document,
        bibliography,
        figures,
        copy: copy_summary,
        support_files,
    })
}

/// Synchronous wrapper around [`flatten`].
///
/// Creates a temporary tokio runtime internally.
pub fn flatten_sync(config: &FlattenConfig) -> Result<FlattenReport, FlattenError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FlattenError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(flatten(config))
}

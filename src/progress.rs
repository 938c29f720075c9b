//! Progress-callback trait for user-visible pipeline events.
//!
//! Inject an [`Arc<dyn FlattenProgressCallback>`] via
//! [`crate::config::FlattenConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves through its stages. The library never prints;
//! the `texflat` binary implements this trait to write its line-oriented
//! report to stdout.
//!
//! # Example
//!
//! ```rust
//! use texflat::{FlattenConfig, FlattenProgressCallback};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct MissingFigures(Mutex<Vec<String>>);
//!
//! impl FlattenProgressCallback for MissingFigures {
//!     fn on_figure_missing(&self, _ordinal: usize, name: &str) {
//!         self.0.lock().unwrap().push(name.to_string());
//!     }
//! }
//!
//! let config = FlattenConfig::builder()
//!     .progress_callback(Arc::new(MissingFigures::default()))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::SupportKind;
use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it runs.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in stage order from a single task.
pub trait FlattenProgressCallback: Send + Sync {
    /// The output directory did not exist and was created.
    fn on_output_dir_created(&self, path: &Path) {
        let _ = path;
    }

    /// An external tool is about to run.
    fn on_tool_start(&self, description: &str) {
        let _ = description;
    }

    /// Bibliography export failed; the run continues without `References.bib`.
    fn on_bibliography_skipped(&self, reason: &str) {
        let _ = reason;
    }

    /// The merged document was read back successfully.
    fn on_document_expanded(&self, bytes: usize) {
        let _ = bytes;
    }

    /// Figure extraction finished.
    fn on_figures_found(&self, count: usize) {
        let _ = count;
    }

    /// One figure was copied to its numbered name.
    ///
    /// # Arguments
    /// * `ordinal`: 1-based position in the extracted list
    /// * `source` : resolved source file
    /// * `target` : `Fig<ordinal>.<ext>` in the output directory
    fn on_figure_copied(&self, ordinal: usize, source: &Path, target: &Path) {
        let _ = (ordinal, source, target);
    }

    /// No candidate file exists for a figure under any probe extension.
    fn on_figure_missing(&self, ordinal: usize, name: &str) {
        let _ = (ordinal, name);
    }

    /// Figure copying finished.
    fn on_figures_copied(&self, copied: usize, total: usize) {
        let _ = (copied, total);
    }

    /// The merged document now lives in the output directory.
    fn on_document_relocated(&self, path: &Path) {
        let _ = path;
    }

    /// Support files of one kind were copied (only called when `count > 0`).
    fn on_support_files_copied(&self, kind: SupportKind, count: usize) {
        let _ = (kind, count);
    }

    /// Figure names, search path and bibliography were rewritten in place.
    fn on_document_rewritten(&self, path: &Path) {
        let _ = path;
    }
}

/// Shared handle stored in [`crate::config::FlattenConfig`].
pub type ProgressCallback = Arc<dyn FlattenProgressCallback>;

/// A callback that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressCallback;

impl FlattenProgressCallback for NoopProgressCallback {}

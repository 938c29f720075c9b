//! Error types for the texflat library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`FlattenError`]: **Fatal**: the flattening cannot proceed (the
//!   expander failed, a file could not be read, copied or written).
//!   Returned as `Err(FlattenError)` from [`crate::flatten()`].
//!
//! * [`InputProblem`]: **Precondition**: one thing that is wrong with the
//!   inputs before anything is touched. All problems are collected and
//!   reported together, wrapped in [`FlattenError::InvalidInputs`].
//!
//! Recoverable conditions (a figure not found under any extension, a failed
//! bibliography export) are not errors at all; they are reported through
//! [`crate::progress::FlattenProgressCallback`] and recorded in
//! [`crate::output::FlattenReport`].

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the texflat library.
#[derive(Debug, Error)]
pub enum FlattenError {
    // ── Precondition errors ──────────────────────────────────────────────
    /// One or more inputs are missing or unusable. Nothing was modified.
    #[error("{} input problem(s) found:\n{}", .problems.len(), ProblemList(.problems))]
    InvalidInputs { problems: Vec<InputProblem> },

    // ── External tool errors ─────────────────────────────────────────────
    /// The external program could not be started at all.
    #[error("Error running {description}: {source}")]
    ToolLaunchFailed {
        description: String,
        #[source]
        source: std::io::Error,
    },

    /// The external program ran but exited unsuccessfully.
    #[error("{description} failed with exit code {}", .code.map_or_else(|| "<signal>".to_string(), |c| c.to_string()))]
    ToolFailed {
        description: String,
        code: Option<i32>,
    },

    /// The temporary merged document could not be created or read back.
    #[error("Failed to access merged document '{path}': {source}")]
    MergedFileFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The expander reported success but produced nothing.
    #[error("Expanded LaTeX file '{path}' was not created or is empty")]
    EmptyExpansion { path: PathBuf },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory is where the sources live; writing there would
    /// overwrite them.
    #[error("Output directory '{path}' is the source directory '{source_dir}'; refusing to overwrite the original files")]
    OutputIsSource { path: PathBuf, source_dir: PathBuf },

    /// Could not list a directory.
    #[error("Failed to list '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read a document.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write or move a document.
    #[error("Failed to write '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file copy failed part-way; the copy stage is aborted.
    #[error("Error copying '{from}' to '{to}': {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A single unmet precondition, detected before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputProblem {
    #[error("Main LaTeX file '{}' does not exist", .path.display())]
    MainFileMissing { path: PathBuf },

    /// The `.aux` file is produced by compiling the document.
    #[error("Auxiliary file '{}' does not exist. Please compile your LaTeX document first.", .path.display())]
    AuxFileMissing { path: PathBuf },

    #[error("Figure path '{}' does not exist", .path.display())]
    FigureDirMissing { path: PathBuf },

    #[error("Latexpand executable '{}' does not exist", .path.display())]
    ExpanderMissing { path: PathBuf },

    #[error("Latexpand path '{}' is a directory, not an executable file", .path.display())]
    ExpanderIsDirectory { path: PathBuf },
}

struct ProblemList<'a>(&'a [InputProblem]);

impl fmt::Display for ProblemList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, problem) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {problem}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aux_missing_mentions_compilation() {
        let p = InputProblem::AuxFileMissing {
            path: PathBuf::from("Main.aux"),
        };
        let msg = p.to_string();
        assert!(msg.contains("Main.aux"), "got: {msg}");
        assert!(msg.contains("compile"), "got: {msg}");
    }

    #[test]
    fn expander_problems_are_distinct() {
        let missing = InputProblem::ExpanderMissing {
            path: PathBuf::from("../latexpand"),
        };
        let dir = InputProblem::ExpanderIsDirectory {
            path: PathBuf::from("../latexpand"),
        };
        assert_ne!(missing.to_string(), dir.to_string());
        assert!(dir.to_string().contains("is a directory"));
    }

    #[test]
    fn invalid_inputs_lists_every_problem() {
        let e = FlattenError::InvalidInputs {
            problems: vec![
                InputProblem::MainFileMissing {
                    path: PathBuf::from("Main.tex"),
                },
                InputProblem::FigureDirMissing {
                    path: PathBuf::from("../Figures"),
                },
            ],
        };
        let msg = e.to_string();
        assert!(msg.starts_with("2 input problem(s)"), "got: {msg}");
        assert!(msg.contains("  - Main LaTeX file 'Main.tex'"));
        assert!(msg.contains("  - Figure path '../Figures'"));
    }

    #[test]
    fn tool_failed_display() {
        let e = FlattenError::ToolFailed {
            description: "LaTeX expansion".into(),
            code: Some(2),
        };
        assert_eq!(e.to_string(), "LaTeX expansion failed with exit code 2");

        let killed = FlattenError::ToolFailed {
            description: "bibliography export".into(),
            code: None,
        };
        assert!(killed.to_string().contains("<signal>"));
    }

    #[test]
    fn output_is_source_names_both_paths() {
        let e = FlattenError::OutputIsSource {
            path: PathBuf::from("paper/."),
            source_dir: PathBuf::from("paper"),
        };
        let msg = e.to_string();
        assert!(msg.contains("'paper/.'"), "got: {msg}");
        assert!(msg.contains("refusing to overwrite"), "got: {msg}");
    }
}

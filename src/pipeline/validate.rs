//! Input validation: confirm every required path exists before any mutation.
//!
//! Checks are independent and all of them run, so the user sees every
//! problem at once instead of fixing them one re-run at a time.

use crate::config::FlattenConfig;
use crate::error::{FlattenError, InputProblem};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Collect every unmet precondition for `config`.
///
/// An empty vector means the pipeline may proceed. The checks, in order:
/// 1. the main document exists
/// 2. its `.aux` companion exists (i.e. the document has been compiled)
/// 3. the figure directory exists
/// 4. the expander exists and is not a directory
pub fn validate_inputs(config: &FlattenConfig) -> Vec<InputProblem> {
    let mut problems = Vec::new();

    let main = config.main_path();
    if !main.exists() {
        problems.push(InputProblem::MainFileMissing { path: main });
    }

    let aux = config.aux_path();
    if !aux.exists() {
        problems.push(InputProblem::AuxFileMissing { path: aux });
    }

    let figures = config.figure_path();
    if !figures.exists() {
        problems.push(InputProblem::FigureDirMissing { path: figures });
    }

    let expander = config.expander_path();
    if !expander.exists() {
        problems.push(InputProblem::ExpanderMissing { path: expander });
    } else if expander.is_dir() {
        problems.push(InputProblem::ExpanderIsDirectory { path: expander });
    }

    debug!(problems = problems.len(), "Validated inputs");
    problems
}

/// Refuse an output directory that already is the source directory or the
/// main document's directory.
///
/// Writing there would overwrite the main document with the flattened text
/// and truncate every support file copied onto itself. A target that does
/// not exist yet cannot collide.
pub fn check_output_dir(config: &FlattenConfig) -> Result<(), FlattenError> {
    let Ok(target) = fs::canonicalize(config.target_dir()) else {
        return Ok(());
    };

    let main = config.main_path();
    let document_dir = match main.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => config.source_dir(),
    };

    for source_dir in [config.source_dir(), document_dir] {
        if is_same_dir(&target, &source_dir) {
            return Err(FlattenError::OutputIsSource {
                path: config.target_dir(),
                source_dir,
            });
        }
    }
    Ok(())
}

fn is_same_dir(canonical: &Path, other: &Path) -> bool {
    fs::canonicalize(other).is_ok_and(|p| p == canonical)
}

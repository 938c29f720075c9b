//! # texflat
//!
//! Prepare a multi-file LaTeX manuscript for journal submission.
//!
//! Publishers usually want one `.tex` file, figures named `Fig1`, `Fig2`, …
//! in the same folder, and a bibliography that does not point into a shared
//! library somewhere else on disk. texflat produces exactly that, in a fresh
//! `transformed/` directory, without touching the original sources.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Main.tex (+ Main.aux)
//!  │
//!  ├─ 1. Validate  main file, .aux, figure dir, latexpand
//!  ├─ 2. Tools     bibexport → References.bib, latexpand → merged .tex
//!  ├─ 3. Extract   \includegraphics arguments, in order
//!  ├─ 4. Copy      figures as Fig<N>.<ext>; *.cls, *.sty, *.bst
//!  └─ 5. Rewrite   figure names, \graphicspath, \bibliography
//! ```
//!
//! Matching is regex-based over raw lines, not a TeX parser. See
//! [`pipeline::rewrite`] for the known imprecision of figure renaming.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use texflat::{flatten, FlattenConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FlattenConfig::builder()
//!         .main_file("Main.tex")
//!         .figure_dir("../Figures")
//!         .expander("../latexpand")
//!         .build()?;
//!     let report = flatten(&config).await?;
//!     println!("{} figures copied", report.copy.copied_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `texflat` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod flatten;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{FlattenConfig, FlattenConfigBuilder, BIBLIOGRAPHY_NAME, MAIN_OUTPUT_NAME};
pub use error::{FlattenError, InputProblem};
pub use flatten::{flatten, flatten_sync};
pub use output::{CopiedFigure, CopySummary, FlattenReport, SupportKind};
pub use pipeline::tools::{ProcessRunner, ToolInvocation, ToolOutcome, ToolRunner};
pub use pipeline::validate::validate_inputs;
pub use progress::{FlattenProgressCallback, NoopProgressCallback, ProgressCallback};

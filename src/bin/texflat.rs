//! CLI binary for texflat.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `FlattenConfig` and prints a line-oriented report on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use texflat::{
    flatten, validate_inputs, FlattenConfig, FlattenError, FlattenProgressCallback,
    FlattenReport, SupportKind,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn paint(code: &str, s: &str) -> String {
    if io::stdout().is_terminal() {
        format!("\x1b[{code}m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}
fn green(s: &str) -> String {
    paint("32", s)
}
fn red(s: &str) -> String {
    paint("31", s)
}
fn yellow(s: &str) -> String {
    paint("33", s)
}
fn dim(s: &str) -> String {
    paint("2", s)
}

// ── Console progress callback ────────────────────────────────────────────────

/// Prints one line per pipeline event to stdout.
struct ConsoleReporter;

impl FlattenProgressCallback for ConsoleReporter {
    fn on_output_dir_created(&self, path: &Path) {
        println!("Created target directory: {}", path.display());
    }

    fn on_tool_start(&self, description: &str) {
        println!("Running: {description}");
    }

    fn on_bibliography_skipped(&self, reason: &str) {
        println!("{} {reason}", red("Error:"));
        println!(
            "{} Bibliography export failed. You may need to create References.bib manually.",
            yellow("Warning:")
        );
    }

    fn on_document_expanded(&self, _bytes: usize) {
        println!("Successfully read expanded LaTeX file");
    }

    fn on_figures_found(&self, count: usize) {
        println!("Found {count} figures to copy");
        if count == 0 {
            println!("No figures found in the document");
        }
    }

    fn on_figure_copied(&self, _ordinal: usize, source: &Path, target: &Path) {
        println!(
            "  {}",
            dim(&format!("{} -> {}", source.display(), target.display()))
        );
    }

    fn on_figure_missing(&self, _ordinal: usize, name: &str) {
        println!("{} No matching file found for {name}", yellow("Warning:"));
    }

    fn on_figures_copied(&self, copied: usize, total: usize) {
        println!("Successfully copied {copied} out of {total} figures");
    }

    fn on_document_relocated(&self, _path: &Path) {
        println!("Moved main LaTeX file to target directory");
    }

    fn on_support_files_copied(&self, kind: SupportKind, count: usize) {
        println!("Copied {count} {kind} file(s)");
    }

    fn on_document_rewritten(&self, _path: &Path) {
        println!("Successfully updated figure references and bibliography path");
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run from the manuscript directory with the default layout
  #   ../Figures/   ../latexpand   ./Main.tex   ./Main.aux
  texflat

  # Different main file and figure folder
  texflat --main_name paper.tex --figure_path figs

  # latexpand installed as an executable on PATH
  texflat --latexpand_path /usr/bin/latexpand --interpreter none

OUTPUT (transformed/):
  Main.tex          merged document with renamed figures
  References.bib    exported bibliography (if bibexport succeeded)
  Fig1.pdf ...      figures, numbered by first appearance
  *.cls *.sty *.bst copied from the working directory

PREREQUISITES:
  Compile the document first so Main.aux exists; bibexport reads it.
"#;

/// Flatten a multi-file LaTeX manuscript for submission.
#[derive(Parser, Debug)]
#[command(
    name = "texflat",
    version,
    about = "Flatten a multi-file LaTeX manuscript into one document with numbered figures",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Name of the main LaTeX file.
    #[arg(long = "main_name", alias = "main-name", default_value = "Main.tex")]
    main_name: PathBuf,

    /// Path to the figures directory relative to the main LaTeX file.
    #[arg(long = "figure_path", alias = "figure-path", default_value = "../Figures")]
    figure_path: PathBuf,

    /// Path to the latexpand executable.
    #[arg(long = "latexpand_path", alias = "latexpand-path", default_value = "../latexpand")]
    latexpand_path: PathBuf,

    /// Program used to run latexpand; `none` runs it directly.
    #[arg(long, env = "TEXFLAT_INTERPRETER", default_value = "perl")]
    interpreter: String,

    /// Bibliography export program.
    #[arg(long, env = "TEXFLAT_BIBEXPORT", default_value = "bibexport")]
    bibexport: String,

    /// Directory receiving the flattened manuscript.
    #[arg(long, env = "TEXFLAT_OUTPUT_DIR", default_value = "transformed")]
    output_dir: PathBuf,

    /// Enable DEBUG-level tracing logs on stderr.
    #[arg(short, long, env = "TEXFLAT_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The report on stdout is the user-facing output; tracing goes to stderr.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli).await {
        Ok(Some(report)) => {
            print_success(&report);
            ExitCode::SUCCESS
        }
        // Validation problems were already listed.
        Ok(None) => ExitCode::FAILURE,
        Err(e) => {
            println!("{} {e:#}", red("Error:"));
            print_failure();
            ExitCode::FAILURE
        }
    }
}

/// Validate, then flatten. `Ok(None)` means validation failed.
async fn run(cli: &Cli) -> Result<Option<FlattenReport>> {
    println!("texflat starting...");
    println!("Main file: {}", cli.main_name.display());
    println!("Figure path: {}", cli.figure_path.display());
    println!("Latexpand path: {}", cli.latexpand_path.display());
    println!();

    let config = build_config(cli)?;

    let problems = validate_inputs(&config);
    if !problems.is_empty() {
        println!("Validation errors found:");
        for problem in &problems {
            println!("  - {problem}");
        }
        println!("\nPlease fix these issues and try again.");
        return Ok(None);
    }

    println!("All inputs validated successfully!");
    println!("\nStart converting...");

    let report = flatten(&config).await.map_err(describe)?;
    Ok(Some(report))
}

/// Map CLI args to `FlattenConfig`.
fn build_config(cli: &Cli) -> Result<FlattenConfig> {
    let interpreter = match cli.interpreter.trim() {
        "" | "none" => None,
        program => Some(program.to_string()),
    };

    FlattenConfig::builder()
        .main_file(&cli.main_name)
        .figure_dir(&cli.figure_path)
        .expander(&cli.latexpand_path)
        .interpreter(interpreter)
        .bibexport(&cli.bibexport)
        .output_dir(&cli.output_dir)
        .progress_callback(Arc::new(ConsoleReporter))
        .build()
        .context("Invalid configuration")
}

/// Attach the stage that failed to the error.
fn describe(e: FlattenError) -> anyhow::Error {
    let stage = stage_label(&e);
    anyhow::Error::new(e).context(stage)
}

fn stage_label(e: &FlattenError) -> &'static str {
    match e {
        FlattenError::InvalidInputs { .. } => "Input validation failed",
        FlattenError::InvalidConfig(_) => "Invalid configuration",
        FlattenError::OutputIsSource { .. } => "Invalid output directory",
        FlattenError::CreateDirFailed { .. } => "Failed to create the output directory",
        FlattenError::ToolLaunchFailed { .. }
        | FlattenError::ToolFailed { .. }
        | FlattenError::MergedFileFailed { .. }
        | FlattenError::EmptyExpansion { .. } => "Failed to merge LaTeX files",
        FlattenError::ScanFailed { .. } | FlattenError::CopyFailed { .. } => {
            "Failed to copy files"
        }
        FlattenError::ReadFailed { .. } | FlattenError::WriteFailed { .. } => {
            "Failed to update the LaTeX document"
        }
        FlattenError::Internal(_) => "Unexpected error during conversion",
    }
}

fn banner() -> String {
    "=".repeat(50)
}

fn print_success(report: &FlattenReport) {
    println!("\n{}", banner());
    println!(
        "{}",
        green(&format!(
            "CONVERSION COMPLETE! All files are in the {} folder.",
            report.target_dir.display()
        ))
    );
    println!("Now, it is your responsibility to proofread :)");
}

fn print_failure() {
    println!("\n{}", banner());
    println!(
        "{}",
        red("CONVERSION FAILED! Please check the errors above and try again.")
    );
    println!("Common solutions:");
    println!("  - Ensure you have compiled your LaTeX document (to generate .aux file)");
    println!("  - Check that the figure path is correct");
    println!(
        "  - Verify the latexpand executable path (should point to the file, not directory)"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    fn io_error() -> io::Error {
        io::Error::new(ErrorKind::PermissionDenied, "denied")
    }

    #[test]
    fn merge_stage_covers_the_temporary_file() {
        let e = FlattenError::MergedFileFailed {
            path: PathBuf::from("transformed/tmp1.tex"),
            source: io_error(),
        };
        assert_eq!(stage_label(&e), "Failed to merge LaTeX files");
    }

    #[test]
    fn output_directory_errors_have_their_own_label() {
        let create = FlattenError::CreateDirFailed {
            path: PathBuf::from("transformed"),
            source: io_error(),
        };
        assert_eq!(stage_label(&create), "Failed to create the output directory");

        let overlap = FlattenError::OutputIsSource {
            path: PathBuf::from("."),
            source_dir: PathBuf::from("."),
        };
        assert_eq!(stage_label(&overlap), "Invalid output directory");
    }

    #[test]
    fn support_file_scan_is_part_of_copying() {
        let e = FlattenError::ScanFailed {
            path: PathBuf::from("."),
            source: io_error(),
        };
        assert_eq!(stage_label(&e), "Failed to copy files");
    }

    #[test]
    fn rewrite_errors_keep_the_document_label() {
        let e = FlattenError::WriteFailed {
            path: PathBuf::from("transformed/Main.tex"),
            source: io_error(),
        };
        let message = format!("{:#}", describe(e));
        assert!(message.starts_with("Failed to update the LaTeX document: "));
        assert!(message.contains("Main.tex"));
    }
}

//! External tools: latexpand for merging and bibexport for the bibliography.
//!
//! Both tools are black boxes. The only contract is the exit status and, for
//! the expander, the file its stdout was redirected into. Running them goes
//! through the [`ToolRunner`] trait so tests can substitute scripted doubles
//! for real executables.
//!
//! Invocations run one after another and are awaited to completion. There is
//! no timeout: a hung tool hangs the run.

use crate::config::{FlattenConfig, BIBLIOGRAPHY_NAME};
use crate::error::FlattenError;
use crate::progress::FlattenProgressCallback;
use async_trait::async_trait;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Human-readable name shown before the tool runs.
    pub description: String,
    pub program: OsString,
    /// Arguments, relative to `current_dir` when it is set.
    pub args: Vec<OsString>,
    /// Working directory for the child. None inherits ours.
    pub current_dir: Option<PathBuf>,
    /// File that receives the child's stdout (created or truncated).
    pub stdout: Option<PathBuf>,
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        if let Some(ref out) = self.stdout {
            write!(f, " > {}", out.display())?;
        }
        Ok(())
    }
}

/// How an external tool finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolOutcome {
    /// Exit code; None when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ToolOutcome {
    pub fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an external command to completion.
///
/// `Err` means the command could not be started; a command that started and
/// failed is `Ok` with a non-zero [`ToolOutcome`].
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, invocation: &ToolInvocation) -> io::Result<ToolOutcome>;
}

/// Spawns real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &ToolInvocation) -> io::Result<ToolOutcome> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(ref dir) = invocation.current_dir {
            cmd.current_dir(dir);
        }
        if let Some(ref out) = invocation.stdout {
            let file = std::fs::File::create(out)?;
            cmd.stdout(Stdio::from(file));
        }

        let status = cmd.status().await?;
        debug!(command = %invocation, status = ?status, "External tool exited");
        Ok(ToolOutcome {
            code: status.code(),
        })
    }
}

/// Run `invocation`, announcing it first, and turn any failure into an error.
pub async fn run_checked(
    runner: &dyn ToolRunner,
    invocation: &ToolInvocation,
    progress: &dyn FlattenProgressCallback,
) -> Result<(), FlattenError> {
    progress.on_tool_start(&invocation.description);
    info!(command = %invocation, "Running {}", invocation.description);

    match runner.run(invocation).await {
        Ok(outcome) if outcome.success() => Ok(()),
        Ok(outcome) => {
            warn!(command = %invocation, code = ?outcome.code, "External tool failed");
            Err(FlattenError::ToolFailed {
                description: invocation.description.clone(),
                code: outcome.code,
            })
        }
        Err(source) => {
            warn!(command = %invocation, error = %source, "Failed to launch external tool");
            Err(FlattenError::ToolLaunchFailed {
                description: invocation.description.clone(),
                source,
            })
        }
    }
}

/// `bibexport -o <output_dir>/References.bib <main>.aux`
pub fn bibliography_invocation(config: &FlattenConfig) -> ToolInvocation {
    ToolInvocation {
        description: "bibliography export".to_string(),
        program: OsString::from(&config.bibexport),
        args: vec![
            OsString::from("-o"),
            config.output_dir.join(BIBLIOGRAPHY_NAME).into_os_string(),
            config.main_file.with_extension("aux").into_os_string(),
        ],
        current_dir: tool_dir(config),
        stdout: None,
    }
}

/// `[perl] <expander> <main> > <merged>`
///
/// `merged` is opened by this process, so it is given as seen from here.
pub fn expansion_invocation(config: &FlattenConfig, merged: &Path) -> ToolInvocation {
    let (program, mut args) = match config.interpreter {
        Some(ref interpreter) => (
            OsString::from(interpreter),
            vec![config.expander.clone().into_os_string()],
        ),
        None => (config.expander.clone().into_os_string(), Vec::new()),
    };
    args.push(config.main_file.clone().into_os_string());

    ToolInvocation {
        description: "LaTeX expansion".to_string(),
        program,
        args,
        current_dir: tool_dir(config),
        stdout: Some(merged.to_path_buf()),
    }
}

/// Export the bibliography into the output directory.
///
/// Returns the path of the written `.bib` file as seen from this process.
pub async fn export_bibliography(
    runner: &dyn ToolRunner,
    config: &FlattenConfig,
    progress: &dyn FlattenProgressCallback,
) -> Result<PathBuf, FlattenError> {
    let invocation = bibliography_invocation(config);
    run_checked(runner, &invocation, progress).await?;
    Ok(config.target_dir().join(BIBLIOGRAPHY_NAME))
}

/// Merge the main document and its inclusions into a temporary file inside
/// `target_dir`.
///
/// A zero exit status is not enough: the merged file must also exist and be
/// non-empty. The temporary file is deleted when dropped unless persisted.
pub async fn expand_document(
    runner: &dyn ToolRunner,
    config: &FlattenConfig,
    target_dir: &Path,
    progress: &dyn FlattenProgressCallback,
) -> Result<NamedTempFile, FlattenError> {
    let merged = tempfile::Builder::new()
        .prefix("tmp")
        .suffix(".tex")
        .tempfile_in(target_dir)
        .map_err(|e| FlattenError::MergedFileFailed {
            path: target_dir.to_path_buf(),
            source: e,
        })?;

    let invocation = expansion_invocation(config, merged.path());
    run_checked(runner, &invocation, progress).await?;

    match tokio::fs::metadata(merged.path()).await {
        Ok(meta) if meta.len() > 0 => {
            debug!(path = %merged.path().display(), bytes = meta.len(), "Expanded document");
            Ok(merged)
        }
        _ => Err(FlattenError::EmptyExpansion {
            path: merged.path().to_path_buf(),
        }),
    }
}

fn tool_dir(config: &FlattenConfig) -> Option<PathBuf> {
    if config.work_dir.as_os_str().is_empty() {
        None
    } else {
        Some(config.work_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopProgressCallback;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Writes `output` to the redirected stdout and exits with `code`.
    struct ScriptedRunner {
        code: i32,
        output: &'static str,
        seen: Mutex<Vec<ToolInvocation>>,
    }

    impl ScriptedRunner {
        fn new(code: i32, output: &'static str) -> Self {
            Self {
                code,
                output,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ToolRunner for ScriptedRunner {
        async fn run(&self, invocation: &ToolInvocation) -> io::Result<ToolOutcome> {
            self.seen.lock().unwrap().push(invocation.clone());
            if let Some(ref out) = invocation.stdout {
                std::fs::write(out, self.output)?;
            }
            Ok(ToolOutcome::exited(self.code))
        }
    }

    struct UnlaunchableRunner;

    #[async_trait]
    impl ToolRunner for UnlaunchableRunner {
        async fn run(&self, _invocation: &ToolInvocation) -> io::Result<ToolOutcome> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such program"))
        }
    }

    fn invocation() -> ToolInvocation {
        ToolInvocation {
            description: "demo".into(),
            program: "demo".into(),
            args: vec![],
            current_dir: None,
            stdout: None,
        }
    }

    #[test]
    fn expansion_runs_through_perl_by_default() {
        let config = FlattenConfig::default();
        let inv = expansion_invocation(&config, Path::new("transformed/tmp1.tex"));
        assert_eq!(
            inv.to_string(),
            "perl ../latexpand Main.tex > transformed/tmp1.tex"
        );
        assert_eq!(inv.current_dir, None);
    }

    #[test]
    fn expansion_without_interpreter_runs_expander() {
        let config = FlattenConfig::builder()
            .interpreter(None)
            .work_dir("/paper")
            .build()
            .unwrap();
        let inv = expansion_invocation(&config, Path::new("/paper/transformed/t.tex"));
        assert_eq!(inv.to_string(), "../latexpand Main.tex > /paper/transformed/t.tex");
        assert_eq!(inv.current_dir, Some(PathBuf::from("/paper")));
    }

    #[test]
    fn bibliography_invocation_targets_output_dir() {
        let config = FlattenConfig::default();
        let inv = bibliography_invocation(&config);
        assert_eq!(
            inv.to_string(),
            "bibexport -o transformed/References.bib Main.aux"
        );
        assert!(inv.stdout.is_none());
    }

    #[tokio::test]
    async fn run_checked_maps_exit_codes() {
        let ok = ScriptedRunner::new(0, "");
        assert!(run_checked(&ok, &invocation(), &NoopProgressCallback)
            .await
            .is_ok());

        let failing = ScriptedRunner::new(3, "");
        let err = run_checked(&failing, &invocation(), &NoopProgressCallback)
            .await
            .unwrap_err();
        assert!(matches!(err, FlattenError::ToolFailed { code: Some(3), .. }));
    }

    #[tokio::test]
    async fn run_checked_reports_launch_errors() {
        let err = run_checked(&UnlaunchableRunner, &invocation(), &NoopProgressCallback)
            .await
            .unwrap_err();
        assert!(matches!(err, FlattenError::ToolLaunchFailed { .. }));
        assert!(err.to_string().contains("demo"));
    }

    #[tokio::test]
    async fn empty_expansion_is_a_failure() {
        let dir = TempDir::new().unwrap();
        let config = FlattenConfig::builder().work_dir(dir.path()).build().unwrap();
        let runner = ScriptedRunner::new(0, "");

        let err = expand_document(&runner, &config, dir.path(), &NoopProgressCallback)
            .await
            .unwrap_err();
        assert!(matches!(err, FlattenError::EmptyExpansion { .. }));
    }

    #[tokio::test]
    async fn expansion_output_lands_in_temp_file() {
        let dir = TempDir::new().unwrap();
        let config = FlattenConfig::builder().work_dir(dir.path()).build().unwrap();
        let runner = ScriptedRunner::new(0, "\\begin{document}\\end{document}\n");

        let merged = expand_document(&runner, &config, dir.path(), &NoopProgressCallback)
            .await
            .unwrap();
        assert!(merged.path().starts_with(dir.path()));
        let text = std::fs::read_to_string(merged.path()).unwrap();
        assert!(text.contains("\\begin{document}"));

        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].description, "LaTeX expansion");
    }

    #[tokio::test]
    async fn failed_expansion_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let config = FlattenConfig::builder().work_dir(dir.path()).build().unwrap();
        let runner = ScriptedRunner::new(1, "partial");

        let result = expand_document(&runner, &config, dir.path(), &NoopProgressCallback).await;
        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_redirects_stdout_and_reports_code() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.txt");
        let inv = ToolInvocation {
            description: "echo".into(),
            program: "sh".into(),
            args: vec!["-c".into(), "echo merged; exit 4".into()],
            current_dir: Some(dir.path().to_path_buf()),
            stdout: Some(out.clone()),
        };

        let outcome = ProcessRunner.run(&inv).await.unwrap();
        assert_eq!(outcome, ToolOutcome::exited(4));
        assert_eq!(std::fs::read_to_string(out).unwrap(), "merged\n");
    }
}

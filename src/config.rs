//! Configuration types for manuscript flattening.
//!
//! All flattening behaviour is controlled through [`FlattenConfig`], built
//! via its [`FlattenConfigBuilder`]. Every path the pipeline touches is
//! derived here from `work_dir`, so no stage depends on the process's current
//! directory.

use crate::error::FlattenError;
use crate::pipeline::tools::ToolRunner;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Name of the flattened document inside the output directory.
pub const MAIN_OUTPUT_NAME: &str = "Main.tex";

/// Name of the exported bibliography inside the output directory.
pub const BIBLIOGRAPHY_NAME: &str = "References.bib";

/// Configuration for a flattening run.
///
/// # Example
/// ```rust
/// use texflat::FlattenConfig;
///
/// let config = FlattenConfig::builder()
///     .main_file("paper.tex")
///     .figure_dir("figs")
///     .build()
///     .unwrap();
/// assert_eq!(config.aux_path().to_str(), Some("paper.aux"));
/// ```
#[derive(Clone)]
pub struct FlattenConfig {
    /// Top-level document, relative to `work_dir`. Default: `Main.tex`.
    pub main_file: PathBuf,

    /// Directory holding the source figures. Default: `../Figures`.
    ///
    /// A relative value is resolved against the main document's directory.
    pub figure_dir: PathBuf,

    /// Path to the latexpand script, relative to `work_dir`. Default: `../latexpand`.
    pub expander: PathBuf,

    /// Program used to run the expander. Default: `perl`.
    ///
    /// latexpand ships as a Perl script that is rarely marked executable.
    /// `None` runs the expander directly.
    pub interpreter: Option<String>,

    /// Bibliography export program. Default: `bibexport`.
    pub bibexport: String,

    /// Directory all relative paths are resolved against. Default: empty,
    /// meaning the current directory.
    pub work_dir: PathBuf,

    /// Output directory, relative to `work_dir`. Default: `transformed`.
    pub output_dir: PathBuf,

    /// Runner for the external tools. If None, real processes are spawned.
    pub runner: Option<Arc<dyn ToolRunner>>,

    /// Receiver for user-visible progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            main_file: PathBuf::from(MAIN_OUTPUT_NAME),
            figure_dir: PathBuf::from("../Figures"),
            expander: PathBuf::from("../latexpand"),
            interpreter: Some("perl".to_string()),
            bibexport: "bibexport".to_string(),
            work_dir: PathBuf::new(),
            output_dir: PathBuf::from("transformed"),
            runner: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for FlattenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlattenConfig")
            .field("main_file", &self.main_file)
            .field("figure_dir", &self.figure_dir)
            .field("expander", &self.expander)
            .field("interpreter", &self.interpreter)
            .field("bibexport", &self.bibexport)
            .field("work_dir", &self.work_dir)
            .field("output_dir", &self.output_dir)
            .field("runner", &self.runner.as_ref().map(|_| "<dyn ToolRunner>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn FlattenProgressCallback>"),
            )
            .finish()
    }
}

impl FlattenConfig {
    /// Create a new builder for `FlattenConfig`.
    pub fn builder() -> FlattenConfigBuilder {
        FlattenConfigBuilder {
            config: Self::default(),
        }
    }

    /// The main document as seen from the caller.
    pub fn main_path(&self) -> PathBuf {
        self.resolve(&self.main_file)
    }

    /// The auxiliary file produced by compiling the main document.
    pub fn aux_path(&self) -> PathBuf {
        self.main_path().with_extension("aux")
    }

    /// The figure directory, resolved against the main document's directory.
    pub fn figure_path(&self) -> PathBuf {
        match self.main_path().parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(&self.figure_dir),
            _ => self.figure_dir.clone(),
        }
    }

    pub fn expander_path(&self) -> PathBuf {
        self.resolve(&self.expander)
    }

    pub fn target_dir(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    /// Directory scanned for class, style and bibliography-style files.
    pub fn source_dir(&self) -> PathBuf {
        if self.work_dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            self.work_dir.clone()
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if self.work_dir.as_os_str().is_empty() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }
}

/// Builder for [`FlattenConfig`].
#[derive(Debug)]
pub struct FlattenConfigBuilder {
    config: FlattenConfig,
}

impl FlattenConfigBuilder {
    pub fn main_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.main_file = path.into();
        self
    }

    pub fn figure_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.figure_dir = path.into();
        self
    }

    pub fn expander(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.expander = path.into();
        self
    }

    pub fn interpreter(mut self, program: Option<String>) -> Self {
        self.config.interpreter = program;
        self
    }

    pub fn bibexport(mut self, program: impl Into<String>) -> Self {
        self.config.bibexport = program.into();
        self
    }

    pub fn work_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.work_dir = path.into();
        self
    }

    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_dir = path.into();
        self
    }

    pub fn runner(mut self, runner: Arc<dyn ToolRunner>) -> Self {
        self.config.runner = Some(runner);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<FlattenConfig, FlattenError> {
        let c = &self.config;
        if c.main_file.file_name().is_none() {
            return Err(FlattenError::InvalidConfig(format!(
                "main file '{}' has no file name",
                c.main_file.display()
            )));
        }
        if c.output_dir.components().all(|p| p == Component::CurDir) {
            return Err(FlattenError::InvalidConfig(format!(
                "output directory '{}' must not be the working directory",
                c.output_dir.display()
            )));
        }
        if c.bibexport.trim().is_empty() {
            return Err(FlattenError::InvalidConfig(
                "bibliography export program must not be empty".into(),
            ));
        }
        if matches!(c.interpreter.as_deref(), Some(p) if p.trim().is_empty()) {
            return Err(FlattenError::InvalidConfig(
                "interpreter must not be empty; use None to run the expander directly".into(),
            ));
        }
        Ok(self.config)
    }
}

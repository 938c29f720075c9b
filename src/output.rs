//! Result types produced by a flattening run.

use std::fmt;
use std::path::PathBuf;

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct FlattenReport {
    /// The output directory.
    pub target_dir: PathBuf,
    /// The flattened, rewritten document (`<target>/Main.tex`).
    pub main_document: PathBuf,
    /// `<target>/References.bib`, or None when the export failed.
    pub bibliography: Option<PathBuf>,
    /// Figure references in document order, duplicates included.
    pub figures: Vec<String>,
    pub copy: CopySummary,
    /// Class, style and bibliography-style files copied alongside.
    pub support_files: Vec<PathBuf>,
}

/// Outcome of the figure-copy stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopySummary {
    /// Number of references the stage was given.
    pub total: usize,
    pub copied: Vec<CopiedFigure>,
    /// Base names (with their ordinal) that matched no candidate file.
    pub missing: Vec<(usize, String)>,
}

impl CopySummary {
    pub fn copied_count(&self) -> usize {
        self.copied.len()
    }
}

/// One figure placed in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedFigure {
    /// 1-based position in the extracted list.
    pub ordinal: usize,
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Kinds of auxiliary TeX files copied next to the flattened document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportKind {
    Class,
    Style,
    BibliographyStyle,
}

impl SupportKind {
    pub const ALL: [SupportKind; 3] = [
        SupportKind::Class,
        SupportKind::Style,
        SupportKind::BibliographyStyle,
    ];

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            SupportKind::Class => "cls",
            SupportKind::Style => "sty",
            SupportKind::BibliographyStyle => "bst",
        }
    }
}

impl fmt::Display for SupportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SupportKind::Class => "class",
            SupportKind::Style => "style",
            SupportKind::BibliographyStyle => "bibliography style",
        })
    }
}

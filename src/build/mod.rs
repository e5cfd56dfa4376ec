//! Batch building of note directories.
//!
//! Every `*.txt` note in a directory is parsed and rendered independently
//! (in parallel with rayon) into an output directory. One failing note
//! never stops the others; the [`BuildReport`] lists every outcome.
//!
//! # Example
//!
//! ```no_run
//! use handout::build::{build_dir, BuildOptions, OutputFormat};
//!
//! let options = BuildOptions::new("out").with_format(OutputFormat::Markdown);
//! let report = build_dir("notes", &options)?;
//! println!("{}/{} built", report.succeeded().count(), report.len());
//! # Ok::<(), handout::Error>(())
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::{Document, DocumentStats};
use crate::parser::{HeaderMode, NoteParser, PageRasterizer, ParseOptions, SearchPathResolver};
use crate::render::{self, JsonFormat, RenderOptions};

/// Extension of note files.
pub const NOTE_EXTENSION: &str = "txt";

/// Name of the figure cache directory inside the output directory.
pub const CACHE_DIR_NAME: &str = "_cache";

/// Output format of a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown format
    #[default]
    Markdown,

    /// Plain text
    Text,

    /// JSON structure
    Json,
}

impl OutputFormat {
    /// File extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }

    /// Render a document in this format.
    pub fn render(&self, doc: &Document, options: &RenderOptions) -> Result<String> {
        match self {
            OutputFormat::Markdown => render::to_markdown(doc, options),
            OutputFormat::Text => render::to_text(doc, options),
            OutputFormat::Json => render::to_json(doc, JsonFormat::Pretty),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::InvalidOption(format!("unknown output format: {}", other))),
        }
    }
}

/// Options for building a set of notes.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Where rendered files are written
    pub output_dir: PathBuf,

    /// Output format
    pub format: OutputFormat,

    /// Base parse options; resolver and cache dir are set per note
    pub parse: ParseOptions,

    /// Render options; the image base is set to the output directory
    pub render: RenderOptions,

    /// Extra directories searched for figure sources, after the note's own
    pub search_dirs: Vec<PathBuf>,

    /// Root of the figure cache (default `<output_dir>/_cache`)
    pub cache_root: Option<PathBuf>,

    /// Remove previous outputs of this format before building
    pub clean: bool,
}

impl BuildOptions {
    /// Create build options writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: OutputFormat::default(),
            parse: ParseOptions::default(),
            render: RenderOptions::default(),
            search_dirs: Vec::new(),
            cache_root: None,
            clean: false,
        }
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Fail notes with unknown `[DOC]` keys.
    pub fn strict(mut self) -> Self {
        self.parse.header_mode = HeaderMode::Strict;
        self
    }

    /// Set the base parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set the render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Search `dir` for figure sources.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    /// Set the figure cache root.
    pub fn with_cache_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(dir.into());
        self
    }

    /// Rasterize figures with `rasterizer`.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.parse = self.parse.with_rasterizer(rasterizer);
        self
    }

    /// Remove previous outputs before building.
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Parse options for one note: its own directory is searched first and
    /// its figures are cached under `<cache_root>/<stem>`.
    pub fn parse_options_for(&self, note: &Path) -> ParseOptions {
        let note_dir = note
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let resolver = self
            .search_dirs
            .iter()
            .fold(SearchPathResolver::new([note_dir]), |resolver, dir| {
                resolver.with_dir(dir)
            });

        let cache_root = self
            .cache_root
            .clone()
            .unwrap_or_else(|| self.output_dir.join(CACHE_DIR_NAME));

        self.parse
            .clone()
            .with_resolver(Arc::new(resolver))
            .with_cache_dir(cache_root.join(note_stem(note)))
    }

    /// Output path of a note: the header's `out` (file name only) or the
    /// note's stem, with the format's extension.
    pub fn output_path_for(&self, note: &Path, doc: &Document) -> PathBuf {
        let stem = doc
            .metadata
            .output
            .as_deref()
            .map(|out| Path::new(out.trim()))
            .filter(|out| out.file_name().is_some())
            .map(output_stem)
            .unwrap_or_else(|| note_stem(note));
        self.output_dir
            .join(format!("{}.{}", stem, self.format.extension()))
    }
}

/// File name of `out` without its last extension (`Summary.pdf` gives
/// `Summary`, `a.b.pdf` gives `a.b`).
fn output_stem(out: &Path) -> String {
    out.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn note_stem(note: &Path) -> String {
    note.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "note".to_string())
}

/// A successfully built note.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Written file
    pub output: PathBuf,

    /// Document title
    pub title: String,

    /// Block counts
    pub stats: DocumentStats,
}

/// Result of building one note.
#[derive(Debug)]
pub struct BuildOutcome {
    /// The note
    pub input: PathBuf,

    /// What was written, or why not
    pub result: Result<BuildOutput>,
}

impl BuildOutcome {
    /// Check if the note was built.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of a batch build, in input order.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// One entry per note
    pub outcomes: Vec<BuildOutcome>,
}

impl BuildReport {
    /// Number of notes attempted.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Check if no notes were found.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Notes that were built.
    pub fn succeeded(&self) -> impl Iterator<Item = &BuildOutcome> {
        self.outcomes.iter().filter(|o| o.is_ok())
    }

    /// Notes that failed.
    pub fn failed(&self) -> impl Iterator<Item = &BuildOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    /// Check if every note was built.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(BuildOutcome::is_ok)
    }
}

/// Parse and render one note into the output directory.
pub fn build_one(note: &Path, options: &BuildOptions) -> Result<BuildOutput> {
    let parser = NoteParser::open_with_options(note, options.parse_options_for(note))?;
    let mut doc = parser.parse()?;
    doc.metadata.generated = Some(Utc::now());

    let render_options = options.render.clone().with_image_base(&options.output_dir);
    let content = options.format.render(&doc, &render_options)?;

    let output = options.output_path_for(note, &doc);
    if same_file(&output, note) {
        return Err(Error::InvalidOption(format!(
            "output {} would overwrite its source",
            output.display()
        )));
    }
    fs::create_dir_all(&options.output_dir)?;
    fs::write(&output, content)?;
    log::debug!("{} -> {}", note.display(), output.display());

    Ok(BuildOutput {
        output,
        title: doc.metadata.display_title().to_string(),
        stats: doc.stats(),
    })
}

/// Check if two paths name the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Note files (`*.txt`) directly inside `dir`, sorted by name.
pub fn collect_notes(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut notes: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTE_EXTENSION))
        })
        .collect();
    notes.sort();
    Ok(notes)
}

/// Create the output directory; with `clean`, delete earlier outputs of the
/// selected format. Files listed in `notes` are never removed.
pub fn prepare_output_dir(options: &BuildOptions, notes: &[PathBuf]) -> Result<()> {
    fs::create_dir_all(&options.output_dir)?;
    if !options.clean {
        return Ok(());
    }

    let ext = options.format.extension();
    for entry in fs::read_dir(&options.output_dir)? {
        let path = entry?.path();
        if !path.is_file() || !path.extension().is_some_and(|e| e == ext) {
            continue;
        }
        if notes.iter().any(|note| same_file(note, &path)) {
            log::debug!("keeping source note {}", path.display());
            continue;
        }
        if let Err(e) = fs::remove_file(&path) {
            log::warn!("could not remove {}: {}", path.display(), e);
        }
    }
    Ok(())
}

/// Build `notes` in parallel, calling `on_done` as each one finishes.
pub fn build_files<F>(notes: &[PathBuf], options: &BuildOptions, on_done: F) -> BuildReport
where
    F: Fn(&BuildOutcome) + Sync,
{
    let outcomes = notes
        .par_iter()
        .map(|note| {
            let outcome = BuildOutcome {
                input: note.clone(),
                result: build_one(note, options),
            };
            if let Err(ref e) = outcome.result {
                log::warn!("{}: {}", note.display(), e);
            }
            on_done(&outcome);
            outcome
        })
        .collect();

    BuildReport { outcomes }
}

/// Build every note in `input_dir`.
///
/// Fails only when the directories cannot be read or created; per-note
/// failures are reported in the [`BuildReport`].
pub fn build_dir(input_dir: impl AsRef<Path>, options: &BuildOptions) -> Result<BuildReport> {
    let notes = collect_notes(input_dir.as_ref())?;
    prepare_output_dir(options, &notes)?;
    Ok(build_files(&notes, options, |_| {}))
}

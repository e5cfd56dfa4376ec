//! # handout
//!
//! Turn plain-text course notes into structured, paginated handouts.
//!
//! Notes are written in a small line-oriented markup (numbered headings,
//! callouts, code fences, pipe tables, figures taken from pages of other
//! PDFs). This library scans them into a [`Document`] of content blocks,
//! with unique anchors, a table of contents and pagination hints, and
//! renders that to Markdown, plain text or JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use handout::{parse_file, render};
//!
//! fn main() -> handout::Result<()> {
//!     // Parse a note file
//!     let doc = parse_file("week1.txt")?;
//!
//!     // Convert to Markdown
//!     let options = render::RenderOptions::default();
//!     let markdown = render::to_markdown(&doc, &options)?;
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Rich notes**: numbered headings, callouts, code, tables, lists, figures
//! - **Navigation**: globally unique anchors, TOC and outline
//! - **Pagination hints**: page breaks and space reservations
//! - **Pluggable**: custom block factories, figure resolvers, rasterizers
//! - **Batch builds**: whole directories in parallel with Rayon

pub mod build;
pub mod error;
pub mod inline;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use build::{BuildOptions, BuildReport, OutputFormat};
pub use error::{Error, Result};
pub use model::{
    Alignment, Anchor, Block, Callout, CalloutKind, CodeBlock, Document, Figure, Heading, List,
    Metadata, Outline, Paragraph, Table, TableCell, TableOfContents, TableRow, TextRun, TextStyle,
};
pub use parser::{
    BlockFactory, HeaderMode, Labels, NoteParser, PaginationPolicy, ParseOptions, SourceResolver,
};
pub use render::{JsonFormat, PageBreakStyle, RenderOptions};

use std::io::Read;
use std::path::Path;

/// Parse a note file and return a structured document.
///
/// The file stem becomes the title unless the `[DOC]` header sets one.
///
/// # Example
///
/// ```no_run
/// use handout::parse_file;
///
/// let doc = parse_file("week1.txt").unwrap();
/// println!("Headings: {}", doc.headings().len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let parser = NoteParser::open(path)?;
    parser.parse()
}

/// Parse a note file with custom options.
///
/// # Example
///
/// ```no_run
/// use handout::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new()
///     .strict()
///     .with_search_dir("slides");
/// let doc = parse_file_with_options("week1.txt", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let parser = NoteParser::open_with_options(path, options)?;
    parser.parse()
}

/// Parse note text.
///
/// # Example
///
/// ```
/// use handout::parse_str;
///
/// let doc = parse_str("1. Intro\nHello.").unwrap();
/// assert_eq!(doc.headings()[0].anchor.key, "1-intro");
/// ```
pub fn parse_str(text: &str) -> Result<Document> {
    NoteParser::from_text(text).parse()
}

/// Parse note text with custom options.
pub fn parse_str_with_options(text: &str, options: ParseOptions) -> Result<Document> {
    NoteParser::from_text_with_options(text, options).parse()
}

/// Parse a note from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let parser = NoteParser::from_reader(reader)?;
    parser.parse()
}

/// Parse a note from a reader with custom options.
pub fn parse_reader_with_options<R: Read>(reader: R, options: ParseOptions) -> Result<Document> {
    let parser = NoteParser::from_reader_with_options(reader, options)?;
    parser.parse()
}

/// Extract plain text from a note file.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(doc.plain_text())
}

/// Convert a note file to Markdown.
///
/// # Example
///
/// ```no_run
/// use handout::to_markdown;
///
/// let markdown = to_markdown("week1.txt").unwrap();
/// std::fs::write("week1.md", markdown).unwrap();
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_markdown(&doc, &RenderOptions::default())
}

/// Convert a note file to Markdown with custom options.
pub fn to_markdown_with_options<P: AsRef<Path>>(
    path: P,
    options: &RenderOptions,
) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_markdown(&doc, options)
}

/// Convert a note file to plain text.
pub fn to_text<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_text(&doc, options)
}

/// Convert a note file to JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_json(&doc, format)
}

/// Builder for parsing and rendering handouts.
///
/// # Example
///
/// ```no_run
/// use handout::Handout;
///
/// let markdown = Handout::new()
///     .strict()
///     .with_search_dir("slides")
///     .with_frontmatter()
///     .parse("week1.txt")?
///     .to_markdown()?;
/// # Ok::<(), handout::Error>(())
/// ```
pub struct Handout {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Handout {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Fail on unknown `[DOC]` keys.
    pub fn strict(mut self) -> Self {
        self.parse_options = self.parse_options.strict();
        self
    }

    /// Never force page breaks or reserve space.
    pub fn continuous(mut self) -> Self {
        self.parse_options = self
            .parse_options
            .with_pagination(PaginationPolicy::continuous());
        self
    }

    /// Look for figure sources in `dir`.
    pub fn with_search_dir(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.parse_options = self.parse_options.with_search_dir(dir);
        self
    }

    /// Cache rasterized figure pages in `dir`.
    pub fn with_cache_dir(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.parse_options = self.parse_options.with_cache_dir(dir);
        self
    }

    /// Set the default labels.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.parse_options = self.parse_options.with_labels(labels);
        self
    }

    /// Enable frontmatter in output.
    pub fn with_frontmatter(mut self) -> Self {
        self.render_options = self.render_options.with_frontmatter(true);
        self
    }

    /// Force the table of contents on or off.
    pub fn with_toc(mut self, include: bool) -> Self {
        self.render_options = self.render_options.with_toc(include);
        self
    }

    /// Write running footers.
    pub fn with_footers(mut self) -> Self {
        self.render_options = self.render_options.with_footers(true);
        self
    }

    /// Parse a note file.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<HandoutResult> {
        let parser = NoteParser::open_with_options(path, self.parse_options)?;
        let document = parser.parse()?;
        Ok(HandoutResult {
            document,
            render_options: self.render_options,
        })
    }

    /// Parse note text.
    pub fn parse_str(self, text: &str) -> Result<HandoutResult> {
        let document = NoteParser::from_text_with_options(text, self.parse_options).parse()?;
        Ok(HandoutResult {
            document,
            render_options: self.render_options,
        })
    }
}

impl Default for Handout {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed handout ready to render.
pub struct HandoutResult {
    /// The parsed document
    pub document: Document,
    /// Render options to use
    render_options: RenderOptions,
}

impl HandoutResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.document, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Table of contents, using the header's depth.
    pub fn toc(&self) -> TableOfContents {
        TableOfContents::from_document(&self.document, self.document.metadata.toc_max_level)
    }

    /// Get plain text of the body.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

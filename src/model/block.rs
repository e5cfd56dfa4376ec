//! Content block types.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A structural unit of a document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// A section heading
    Heading(Heading),

    /// An ordered or unordered list
    List(List),

    /// A table
    Table(Table),

    /// A monospaced code block
    CodeBlock(CodeBlock),

    /// A boxed aside with nested content
    Callout(Callout),

    /// A page of an external PDF shown as an image
    Figure(Figure),

    /// A forced page break
    PageBreak,

    /// Start a new page unless at least `points` of vertical space remain
    ReserveSpace {
        /// Minimum remaining space in points
        points: f32,
    },

    /// A horizontal rule / separator
    HorizontalRule,
}

impl Block {
    /// Check if this block is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading(_))
    }

    /// Check if this block is a page break.
    pub fn is_page_break(&self) -> bool {
        matches!(self, Block::PageBreak)
    }

    /// The anchor carried by this block, if any.
    pub fn anchor(&self) -> Option<&Anchor> {
        match self {
            Block::Heading(h) => Some(&h.anchor),
            Block::Callout(c) => c.anchor.as_ref(),
            _ => None,
        }
    }

    /// Nested blocks (callout bodies).
    pub fn children(&self) -> &[Block] {
        match self {
            Block::Callout(c) => &c.body,
            _ => &[],
        }
    }

    /// Get plain text content of the block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.plain_text(),
            Block::Heading(h) => h.text.clone(),
            Block::List(l) => l
                .items
                .iter()
                .map(|item| item.plain_text())
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Table(t) => t.plain_text(),
            Block::CodeBlock(c) => c.plain_lines().join("\n"),
            Block::Callout(c) => {
                let mut parts = Vec::new();
                if let Some(ref title) = c.title {
                    parts.push(title.plain_text());
                }
                parts.extend(c.body.iter().map(Block::plain_text).filter(|t| !t.is_empty()));
                parts.join("\n\n")
            }
            Block::Figure(f) => f.caption.plain_text(),
            Block::PageBreak | Block::ReserveSpace { .. } | Block::HorizontalRule => String::new(),
        }
    }
}

/// Navigation anchor attached to headings and titled callouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Key unique within one document build
    pub key: String,

    /// Leave out of the table of contents
    pub skip_toc: bool,

    /// Leave out of the document outline
    pub skip_outline: bool,
}

impl Anchor {
    /// Anchor that shows up in all navigation.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            skip_toc: false,
            skip_outline: false,
        }
    }

    /// Anchor that can be linked to but is not listed anywhere.
    pub fn hidden(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            skip_toc: true,
            skip_outline: true,
        }
    }

    /// Check if the anchor is listed in neither TOC nor outline.
    pub fn is_hidden(&self) -> bool {
        self.skip_toc && self.skip_outline
    }
}

/// A section heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Display text, e.g. `1.2. Scope`
    pub text: String,

    /// Rich content of the display text
    pub content: Paragraph,

    /// Nesting level, 1 = top section
    pub level: u8,

    /// Navigation anchor
    pub anchor: Anchor,
}

/// A list of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    /// Numbered list
    pub ordered: bool,

    /// One paragraph per item
    pub items: Vec<Paragraph>,
}

/// A code block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Title shown above the code, e.g. `Code (rust)`
    pub title: String,

    /// Language tag of a fenced block
    pub language: Option<String>,

    /// Sanitized lines (escaped, spaces as `&nbsp;`)
    pub lines: Vec<String>,
}

impl CodeBlock {
    /// Lines with entities decoded and non-breaking spaces turned back into
    /// regular ones.
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| crate::inline::code_line_to_plain(line))
            .collect()
    }
}

/// Visual style of a callout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutKind {
    /// Neutral note
    Note,
    /// Informational aside
    #[default]
    Info,
    /// Something to watch out for
    Warning,
    /// A mistake or hazard
    Danger,
}

impl CalloutKind {
    /// Lowercase name of the style.
    pub fn as_str(&self) -> &'static str {
        match self {
            CalloutKind::Note => "note",
            CalloutKind::Info => "info",
            CalloutKind::Warning => "warning",
            CalloutKind::Danger => "danger",
        }
    }
}

/// A boxed aside with nested content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Callout {
    /// Visual style
    pub kind: CalloutKind,

    /// Optional title line
    pub title: Option<Paragraph>,

    /// Nested blocks, never empty
    pub body: Vec<Block>,

    /// Anchor for titled callouts
    pub anchor: Option<Anchor>,
}

/// A page of an external PDF shown as an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// Source name as written in the marker
    pub source: String,

    /// Resolved path of the source document
    pub path: PathBuf,

    /// 1-based page number
    pub page: u32,

    /// Caption below the image
    pub caption: Paragraph,

    /// Rasterization zoom factor
    pub zoom: f32,

    /// Rasterized page image, when available
    pub image: Option<PathBuf>,
}

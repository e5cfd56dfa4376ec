//! Document-level types.

use super::{Anchor, Block, Heading};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed handout: header metadata plus the body blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, footers, TOC settings...)
    pub metadata: Metadata,

    /// Body blocks in reading order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from metadata and blocks.
    pub fn with_blocks(metadata: Metadata, blocks: Vec<Block>) -> Self {
        Self { metadata, blocks }
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of top-level blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Depth-first iterator over all blocks, callout bodies included.
    pub fn iter_blocks(&self) -> BlockIter<'_> {
        BlockIter {
            stack: vec![self.blocks.iter()],
        }
    }

    /// All headings in reading order, including those inside callouts.
    pub fn headings(&self) -> Vec<&Heading> {
        self.iter_blocks()
            .filter_map(|block| match block {
                Block::Heading(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    /// All anchors in reading order (headings and titled callouts).
    pub fn anchors(&self) -> Vec<&Anchor> {
        self.iter_blocks().filter_map(Block::anchor).collect()
    }

    /// Count blocks by kind.
    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats::default();
        for block in self.iter_blocks() {
            match block {
                Block::Paragraph(_) => stats.paragraphs += 1,
                Block::Heading(_) => stats.headings += 1,
                Block::List(_) => stats.lists += 1,
                Block::Table(_) => stats.tables += 1,
                Block::CodeBlock(_) => stats.code_blocks += 1,
                Block::Callout(_) => stats.callouts += 1,
                Block::Figure(_) => stats.figures += 1,
                Block::PageBreak => stats.page_breaks += 1,
                Block::ReserveSpace { .. } | Block::HorizontalRule => {}
            }
        }
        stats
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Depth-first block iterator returned by [`Document::iter_blocks`].
pub struct BlockIter<'a> {
    stack: Vec<std::slice::Iter<'a, Block>>,
}

impl<'a> Iterator for BlockIter<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(block) => {
                    let children = block.children();
                    if !children.is_empty() {
                        self.stack.push(children.iter());
                    }
                    return Some(block);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Block counts of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Paragraph blocks
    pub paragraphs: usize,
    /// Heading blocks
    pub headings: usize,
    /// List blocks
    pub lists: usize,
    /// Table blocks
    pub tables: usize,
    /// Code blocks
    pub code_blocks: usize,
    /// Callouts
    pub callouts: usize,
    /// Figures
    pub figures: usize,
    /// Explicit and policy page breaks
    pub page_breaks: usize,
}

/// Document metadata, filled from the `[DOC ...]` header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Subtitle under the title
    pub subtitle: Option<String>,

    /// Small line under the title (course, date...)
    pub meta_line: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Requested output file name
    pub output: Option<String>,

    /// Emit the title block at the start
    pub include_title_block: bool,

    /// Emit a table of contents after the title block
    pub include_toc: bool,

    /// Heading of the table of contents
    pub toc_title: String,

    /// Deepest heading level listed in the table of contents
    pub toc_max_level: u8,

    /// Left footer text
    pub footer_left: Option<String>,

    /// Center footer text
    pub footer_center: Option<String>,

    /// Right footer text, before the page number
    pub footer_right: Option<String>,

    /// Show `Page N` in the right footer
    pub footer_show_page: bool,

    /// Footers link back to the table of contents
    pub footer_link_to_toc: bool,

    /// When the handout was built
    pub generated: Option<DateTime<Utc>>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: None,
            subtitle: None,
            meta_line: None,
            author: None,
            subject: None,
            keywords: None,
            output: None,
            include_title_block: true,
            include_toc: true,
            toc_title: "Contents".to_string(),
            toc_max_level: 3,
            footer_left: None,
            footer_center: None,
            footer_right: None,
            footer_show_page: true,
            footer_link_to_toc: true,
            generated: None,
        }
    }
}

impl Metadata {
    /// Create metadata with a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Title to display, falling back to `Untitled`.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    /// Convert metadata to YAML frontmatter format.
    pub fn to_yaml_frontmatter(&self) -> String {
        let mut lines = vec!["---".to_string()];

        if let Some(ref title) = self.title {
            lines.push(format!("title: \"{}\"", escape_yaml(title)));
        }
        if let Some(ref subtitle) = self.subtitle {
            lines.push(format!("subtitle: \"{}\"", escape_yaml(subtitle)));
        }
        if let Some(ref author) = self.author {
            lines.push(format!("author: \"{}\"", escape_yaml(author)));
        }
        if let Some(ref subject) = self.subject {
            lines.push(format!("subject: \"{}\"", escape_yaml(subject)));
        }
        if let Some(ref keywords) = self.keywords {
            lines.push(format!("keywords: \"{}\"", escape_yaml(keywords)));
        }
        if let Some(ref generated) = self.generated {
            lines.push(format!("generated: {}", generated.to_rfc3339()));
        }

        lines.push("---".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

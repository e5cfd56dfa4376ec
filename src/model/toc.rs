//! Table of contents and document outline.

use super::Document;
use serde::{Deserialize, Serialize};

/// Anchor key of the table of contents itself.
pub const TOC_KEY: &str = "toc";

/// Map a heading level (1 = top) to a navigation level (0 = top), clamped
/// into `0..max_level`.
pub fn nav_level(level: u8, max_level: u8) -> u8 {
    level.saturating_sub(1).min(max_level.max(1) - 1)
}

/// Flat table of contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOfContents {
    /// Heading of the TOC page
    pub title: String,

    /// Entries in reading order
    pub entries: Vec<TocEntry>,
}

impl TableOfContents {
    /// Collect every heading not flagged `skip_toc`, callout bodies included.
    pub fn from_document(doc: &Document, max_level: u8) -> Self {
        let entries = doc
            .headings()
            .into_iter()
            .filter(|h| !h.anchor.skip_toc)
            .map(|h| TocEntry {
                level: nav_level(h.level, max_level),
                text: h.text.clone(),
                key: h.anchor.key.clone(),
            })
            .collect();

        Self {
            title: doc.metadata.toc_title.clone(),
            entries,
        }
    }

    /// Check if the TOC has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single TOC line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Indentation level (0 = top)
    pub level: u8,

    /// Heading display text
    pub text: String,

    /// Anchor key to link to
    pub key: String,
}

/// Document outline (bookmarks).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Top-level outline items
    pub items: Vec<OutlineItem>,
}

impl Outline {
    /// Create a new empty outline.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build the bookmark tree from headings not flagged `skip_outline`.
    pub fn from_document(doc: &Document, max_level: u8) -> Self {
        let mut outline = Self::new();
        let mut stack: Vec<OutlineItem> = Vec::new();

        for heading in doc.headings() {
            if heading.anchor.skip_outline {
                continue;
            }
            let item = OutlineItem::new(
                heading.text.clone(),
                heading.anchor.key.clone(),
                nav_level(heading.level, max_level),
            );
            while stack.last().is_some_and(|top| top.level >= item.level) {
                if let Some(done) = stack.pop() {
                    outline.attach(&mut stack, done);
                }
            }
            stack.push(item);
        }
        while let Some(done) = stack.pop() {
            outline.attach(&mut stack, done);
        }

        outline
    }

    fn attach(&mut self, stack: &mut [OutlineItem], item: OutlineItem) {
        match stack.last_mut() {
            Some(parent) => parent.add_child(item),
            None => self.add_item(item),
        }
    }

    /// Add an item to the outline.
    pub fn add_item(&mut self, item: OutlineItem) {
        self.items.push(item);
    }

    /// Check if the outline is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the total number of items (including nested).
    pub fn total_items(&self) -> usize {
        fn count_items(items: &[OutlineItem]) -> usize {
            items
                .iter()
                .map(|item| 1 + count_items(&item.children))
                .sum()
        }
        count_items(&self.items)
    }
}

/// A single outline item (bookmark).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineItem {
    /// Item title
    pub title: String,

    /// Target anchor key
    pub key: String,

    /// Nesting level (0 = top level)
    pub level: u8,

    /// Child items
    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    /// Create a new outline item.
    pub fn new(title: impl Into<String>, key: impl Into<String>, level: u8) -> Self {
        Self {
            title: title.into(),
            key: key.into(),
            level,
            children: Vec::new(),
        }
    }

    /// Add a child item.
    pub fn add_child(&mut self, child: OutlineItem) {
        self.children.push(child);
    }
}

//! Document assembly: title block, table of contents, body.

use crate::inline::sanitize_para;
use crate::model::{Block, Document, Paragraph, ParagraphRole, TableOfContents};

use super::decorations::PageDecorations;
use super::RenderOptions;

/// A document laid out for rendering.
///
/// The front matter (title block, then the TOC followed by a page break)
/// comes before the body. The title is a plain paragraph, so it never
/// shows up in the TOC or outline.
#[derive(Debug, Clone)]
pub struct Assembly<'a> {
    /// Title block: title, meta line, subtitle, rule
    pub title_block: Vec<Block>,

    /// Table of contents, when enabled
    pub toc: Option<TableOfContents>,

    /// Body blocks
    pub body: &'a [Block],

    /// Running footers
    pub decorations: PageDecorations,
}

impl Assembly<'_> {
    /// Check if a page break follows the TOC.
    ///
    /// Skipped when the body is empty or starts with its own break.
    pub fn breaks_after_toc(&self) -> bool {
        self.toc.is_some() && self.body.first().is_some_and(|b| !b.is_page_break())
    }
}

/// Assemble a document according to its header and the render options.
pub fn assemble<'a>(doc: &'a Document, options: &RenderOptions) -> Assembly<'a> {
    let meta = &doc.metadata;

    let mut title_block = Vec::new();
    if options.title_block.unwrap_or(meta.include_title_block) {
        let line = |text: &str, role| {
            Block::Paragraph(Paragraph::from_markup(&sanitize_para(text)).with_role(role))
        };
        title_block.push(line(meta.display_title(), ParagraphRole::Title));
        if let Some(ref meta_line) = meta.meta_line {
            title_block.push(line(meta_line, ParagraphRole::Meta));
        }
        if let Some(ref subtitle) = meta.subtitle {
            title_block.push(line(subtitle, ParagraphRole::Subtitle));
        }
        title_block.push(Block::HorizontalRule);
    }

    let toc = options
        .toc
        .unwrap_or(meta.include_toc)
        .then(|| {
            let max_level = options.toc_max_level.unwrap_or(meta.toc_max_level);
            TableOfContents::from_document(doc, max_level)
        });

    Assembly {
        title_block,
        toc,
        body: &doc.blocks,
        decorations: PageDecorations::from_metadata(meta),
    }
}

//! Content-block factory.
//!
//! The scanner never builds blocks itself; it hands sanitized markup to a
//! [`BlockFactory`]. Override individual methods to restyle or drop
//! blocks without touching the scanner.
//!
//! # Example
//!
//! ```
//! use handout::model::{Block, Paragraph, ParagraphRole};
//! use handout::parser::BlockFactory;
//!
//! struct CaptionParagraphs;
//!
//! impl BlockFactory for CaptionParagraphs {
//!     fn paragraph(&self, markup: &str) -> Block {
//!         Block::Paragraph(Paragraph::from_markup(markup).with_role(ParagraphRole::Caption))
//!     }
//! }
//! ```

use crate::model::{
    Anchor, Block, Callout, CalloutKind, CodeBlock, Figure, Heading, List, Paragraph, Table,
};

use super::table::PipeTable;

/// Builds content blocks from sanitized markup.
///
/// All methods have default implementations producing the standard model
/// blocks.
pub trait BlockFactory: Send + Sync {
    /// Build a paragraph from rich-text markup.
    fn paragraph(&self, markup: &str) -> Block {
        Block::Paragraph(Paragraph::from_markup(markup))
    }

    /// Build a heading.
    ///
    /// # Arguments
    /// * `markup` - Display text markup, e.g. `1.2. Scope`
    /// * `level` - Nesting level, 1 = top section
    /// * `anchor` - Unique anchor with navigation flags already set
    fn heading(&self, markup: &str, level: u8, anchor: Anchor) -> Heading {
        let content = Paragraph::from_markup(markup);
        Heading {
            text: content.plain_text(),
            content,
            level,
            anchor,
        }
    }

    /// Build a list from item markup.
    fn list(&self, ordered: bool, items: &[String]) -> Block {
        Block::List(List {
            ordered,
            items: items.iter().map(|item| Paragraph::from_markup(item)).collect(),
        })
    }

    /// Build a table. The first row is the header.
    fn table(&self, table: PipeTable) -> Block {
        Block::Table(Table::from_rows(table.rows, 1).with_alignments(table.alignments))
    }

    /// Build a code block from sanitized lines.
    fn code_block(&self, title: &str, language: Option<&str>, lines: Vec<String>) -> Block {
        Block::CodeBlock(CodeBlock {
            title: title.to_string(),
            language: language.map(str::to_string),
            lines,
        })
    }

    /// Build a callout around already-scanned body blocks.
    fn callout(
        &self,
        kind: CalloutKind,
        title: Option<&str>,
        body: Vec<Block>,
        anchor: Option<Anchor>,
    ) -> Block {
        Block::Callout(Callout {
            kind,
            title: title.map(Paragraph::from_markup),
            body,
            anchor,
        })
    }

    /// Build a figure. Return `None` to drop it.
    fn figure(&self, figure: Figure) -> Option<Block> {
        Some(Block::Figure(figure))
    }

    /// Build a horizontal rule.
    fn horizontal_rule(&self) -> Block {
        Block::HorizontalRule
    }
}

/// Factory producing the standard model blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFactory;

impl BlockFactory for DefaultFactory {}

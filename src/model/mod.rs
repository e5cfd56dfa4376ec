//! Document model types for handout content.
//!
//! This module defines the block tree the scanner produces and the
//! renderers consume. Callouts are the only blocks that nest.

mod block;
mod document;
mod paragraph;
mod table;
mod toc;

pub use block::{Anchor, Block, Callout, CalloutKind, CodeBlock, Figure, Heading, List};
pub use document::{BlockIter, Document, DocumentStats, Metadata};
pub use paragraph::{Paragraph, ParagraphRole, TextRun, TextStyle};
pub use table::{Alignment, Table, TableCell, TableRow};
pub use toc::{nav_level, Outline, OutlineItem, TableOfContents, TocEntry, TOC_KEY};

//! JSON rendering for handouts.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Document, Outline, TableOfContents};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    serialize(doc, format)
}

/// Navigation data of a document: TOC entries and outline tree.
#[derive(Debug, Serialize)]
struct Navigation {
    toc: TableOfContents,
    outline: Outline,
}

/// Convert the table of contents and outline of a document to JSON.
pub fn navigation_to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let max_level = doc.metadata.toc_max_level;
    let navigation = Navigation {
        toc: TableOfContents::from_document(doc, max_level),
        outline: Outline::from_document(doc, max_level),
    };
    serialize(&navigation, format)
}

fn serialize<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

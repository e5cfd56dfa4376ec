//! Note document parser.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Document, Metadata, TOC_KEY};

use super::anchors::AnchorRegistry;
use super::header::{split_header, DocHeader};
use super::options::{HeaderMode, ParseOptions};
use super::scanner::Scanner;

/// Handout note parser.
///
/// Holds the source text; [`parse`](Self::parse) can be called any number
/// of times and starts from a fresh anchor registry each time.
pub struct NoteParser {
    source: String,
    title: Option<String>,
    options: ParseOptions,
}

impl NoteParser {
    /// Open a note file. Its stem is the default document title.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a note file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let source = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("{} is not valid UTF-8, replacing bad bytes", path.display());
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());

        Ok(Self {
            source,
            title,
            options,
        })
    }

    /// Parse note text held in memory.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_text_with_options(text, ParseOptions::default())
    }

    /// Parse note text held in memory with custom options.
    pub fn from_text_with_options(text: impl Into<String>, options: ParseOptions) -> Self {
        Self {
            source: text.into(),
            title: None,
            options,
        }
    }

    /// Read a note from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Read a note from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::from_text_with_options(text, options))
    }

    /// Set the title used when the header does not set one.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The raw note text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parse the note into a document.
    pub fn parse(&self) -> Result<Document> {
        let (header, body) = self.header()?;

        let unknown = header.unknown_keys();
        if !unknown.is_empty() {
            match self.options.header_mode {
                HeaderMode::Strict => return Err(Error::UnknownHeaderKeys(unknown)),
                HeaderMode::Lenient => {
                    log::warn!("ignoring unknown [DOC] keys: {}", unknown.join(", "))
                }
            }
        }

        let mut metadata = Metadata {
            title: self.title.clone(),
            ..Metadata::default()
        };
        header.apply(&mut metadata);

        let mut anchors = AnchorRegistry::new();
        anchors.reserve(TOC_KEY);
        let blocks = Scanner::new(&self.options).scan(&body, &mut anchors);
        log::debug!("parsed {} blocks, {} anchors", blocks.len(), anchors.len());

        Ok(Document::with_blocks(metadata, blocks))
    }

    /// Split off the header. In lenient mode a malformed header line is
    /// dropped with a warning.
    fn header(&self) -> Result<(DocHeader, String)> {
        match split_header(&self.source) {
            Ok(split) => Ok(split),
            Err(e) if self.options.header_mode == HeaderMode::Lenient => {
                log::warn!("ignoring malformed [DOC] header: {}", e);
                Ok((DocHeader::default(), strip_first_content_line(&self.source)))
            }
            Err(e) => Err(e),
        }
    }
}

fn strip_first_content_line(text: &str) -> String {
    let mut dropped = false;
    text.lines()
        .filter(|line| {
            if !dropped && !line.trim().is_empty() {
                dropped = true;
                return false;
            }
            true
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Block;

    #[test]
    fn test_parse_with_header() {
        let doc = NoteParser::from_text("[DOC title=\"Sets\" include_toc=false]\n1. Intro\ntext")
            .parse()
            .unwrap();
        assert_eq!(doc.metadata.title.as_deref(), Some("Sets"));
        assert!(!doc.metadata.include_toc);
        assert_eq!(doc.blocks.len(), 2);
        assert!(doc.blocks[0].is_heading());
    }

    #[test]
    fn test_title_falls_back_to_given_title() {
        let doc = NoteParser::from_text("text").with_title("week1").parse().unwrap();
        assert_eq!(doc.metadata.display_title(), "week1");

        let doc = NoteParser::from_text("text").parse().unwrap();
        assert_eq!(doc.metadata.display_title(), "Untitled");
    }

    #[test]
    fn test_unknown_keys_strict_and_lenient() {
        let text = "[DOC colour=red]\nbody";
        let err = NoteParser::from_text_with_options(text, ParseOptions::new().strict())
            .parse()
            .unwrap_err();
        assert!(matches!(err, Error::UnknownHeaderKeys(keys) if keys == vec!["colour"]));

        let doc = NoteParser::from_text(text).parse().unwrap();
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn test_malformed_header() {
        let text = "[DOC title=\"open]\nbody";
        assert!(NoteParser::from_text_with_options(text, ParseOptions::new().strict())
            .parse()
            .is_err());

        let doc = NoteParser::from_text(text).parse().unwrap();
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].plain_text(), "body");
    }

    #[test]
    fn test_toc_key_is_reserved() {
        let doc = NoteParser::from_text(":::note TOC\nx\n:::").parse().unwrap();
        let anchor = doc.blocks.iter().find_map(Block::anchor).unwrap();
        assert_eq!(anchor.key, "toc-2");
    }

    #[test]
    fn test_open_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("algebra.txt");
        fs::write(&path, "1. Intro\n").unwrap();

        let doc = NoteParser::open(&path).unwrap().parse().unwrap();
        assert_eq!(doc.metadata.title.as_deref(), Some("algebra"));
        assert_eq!(doc.headings()[0].anchor.key, "1-intro");
    }
}

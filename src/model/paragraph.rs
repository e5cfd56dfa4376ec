//! Paragraph and text-level types.

use serde::{Deserialize, Serialize};

use crate::inline;

/// A paragraph of rich text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in the paragraph
    pub content: Vec<TextRun>,

    /// What the paragraph is used for
    pub role: ParagraphRole,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self {
            content: Vec::new(),
            role: ParagraphRole::Body,
        }
    }

    /// Create a paragraph with a single unstyled run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Create a paragraph from rich-text markup (`<b>`, `<i>`, entities...).
    ///
    /// Inline markdown markers are understood too, so this accepts both raw
    /// source text and the output of [`inline::sanitize_para`].
    pub fn from_markup(markup: &str) -> Self {
        Self {
            content: inline::parse_inline(markup),
            role: ParagraphRole::Body,
        }
    }

    /// Set the role and return self.
    pub fn with_role(mut self, role: ParagraphRole) -> Self {
        self.role = role;
        self
    }

    /// Add plain text to the paragraph.
    pub fn add_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.content.push(TextRun::new(text));
        }
    }

    /// Add a styled text run.
    pub fn add_run(&mut self, run: TextRun) {
        if !run.is_empty() {
            self.content.push(run);
        }
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        self.content.iter().map(|run| run.text.as_str()).collect()
    }

    /// Render the paragraph back to escaped rich-text markup.
    pub fn markup(&self) -> String {
        inline::render_markup(&self.content)
    }

    /// Check if the paragraph is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() || self.plain_text().trim().is_empty()
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Role of a paragraph, used by renderers to pick a style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphRole {
    /// Regular body text
    #[default]
    Body,
    /// Document title in the title block
    Title,
    /// Subtitle under the title
    Subtitle,
    /// Small meta line under the title
    Meta,
    /// Figure or table caption
    Caption,
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content (unescaped)
    pub text: String,

    /// Text styling
    pub style: TextStyle,
}

impl TextRun {
    /// Create a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Create a text run with the given style.
    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Create a bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::styled(
            text,
            TextStyle {
                bold: true,
                ..Default::default()
            },
        )
    }

    /// Create an italic text run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self::styled(
            text,
            TextStyle {
                italic: true,
                ..Default::default()
            },
        )
    }

    /// Create a monospaced text run.
    pub fn code(text: impl Into<String>) -> Self {
        Self::styled(
            text,
            TextStyle {
                code: true,
                ..Default::default()
            },
        )
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Text styling properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Monospaced inline code
    pub code: bool,
}

impl TextStyle {
    /// Check if any styling is applied.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.code
    }
}

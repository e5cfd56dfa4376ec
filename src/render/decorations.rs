//! Running page decorations (footers).

use serde::{Deserialize, Serialize};

use crate::inline::sanitize_plain;
use crate::model::Metadata;

/// Separator between the right footer text and the page number.
pub const FOOTER_SEPARATOR: &str = " · ";

/// Footer settings of a document, sanitized for plain-text output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDecorations {
    /// Left footer text
    pub left: Option<String>,
    /// Center footer text
    pub center: Option<String>,
    /// Right footer text, before the page number
    pub right: Option<String>,
    /// Append `Page N` on the right
    pub show_page: bool,
    /// Footers link back to the table of contents
    pub link_to_toc: bool,
}

/// The footer of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    /// Left part
    pub left: String,
    /// Center part
    pub center: String,
    /// Right part, page number included
    pub right: String,
}

impl Footer {
    /// Check if all three parts are empty.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.center.is_empty() && self.right.is_empty()
    }

    /// Non-empty parts joined into one line.
    pub fn to_line(&self, separator: &str) -> String {
        [&self.left, &self.center, &self.right]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl PageDecorations {
    /// Footer settings from document metadata.
    pub fn from_metadata(meta: &Metadata) -> Self {
        let clean = |value: &Option<String>| {
            value
                .as_deref()
                .map(sanitize_plain)
                .filter(|s| !s.is_empty())
        };
        Self {
            left: clean(&meta.footer_left),
            center: clean(&meta.footer_center),
            right: clean(&meta.footer_right),
            show_page: meta.footer_show_page,
            link_to_toc: meta.footer_link_to_toc,
        }
    }

    /// Check if no footer would ever be drawn.
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.center.is_none() && self.right.is_none() && !self.show_page
    }

    /// Footer of page `page` (1-based).
    pub fn footer(&self, page: u32) -> Footer {
        let mut right: Vec<String> = self.right.iter().cloned().collect();
        if self.show_page {
            right.push(format!("Page {}", page));
        }
        Footer {
            left: self.left.clone().unwrap_or_default(),
            center: self.center.clone().unwrap_or_default(),
            right: right.join(FOOTER_SEPARATOR),
        }
    }
}

//! Rendering options and configuration.

use std::path::PathBuf;

/// Options for rendering documents.
///
/// Title block and TOC settings default to what the document header asks
/// for; the `Option` fields here override it.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Include YAML frontmatter with metadata
    pub include_frontmatter: bool,

    /// Override the header's `include_title_block`
    pub title_block: Option<bool>,

    /// Override the header's `include_toc`
    pub toc: Option<bool>,

    /// Override the header's `toc_max_level` (1-6)
    pub toc_max_level: Option<u8>,

    /// Character to use for unordered list markers
    pub list_marker: char,

    /// Escape special Markdown characters
    pub escape_special_chars: bool,

    /// Emit `<a id="...">` anchors before headings and titled callouts
    pub emit_anchors: bool,

    /// How page breaks are written
    pub page_break: PageBreakStyle,

    /// Write running footers at the end of every page
    pub footers: bool,

    /// Figure image paths are written relative to this directory
    pub image_base: Option<PathBuf>,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Force the title block on or off.
    pub fn with_title_block(mut self, include: bool) -> Self {
        self.title_block = Some(include);
        self
    }

    /// Force the table of contents on or off.
    pub fn with_toc(mut self, include: bool) -> Self {
        self.toc = Some(include);
        self
    }

    /// Set the deepest heading level listed in the TOC.
    pub fn with_toc_max_level(mut self, level: u8) -> Self {
        self.toc_max_level = Some(level.clamp(1, 6));
        self
    }

    /// Set the list marker character.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Enable or disable anchor tags.
    pub fn with_anchors(mut self, emit: bool) -> Self {
        self.emit_anchors = emit;
        self
    }

    /// Set the page break style.
    pub fn with_page_break(mut self, style: PageBreakStyle) -> Self {
        self.page_break = style;
        self
    }

    /// Enable or disable running footers.
    pub fn with_footers(mut self, footers: bool) -> Self {
        self.footers = footers;
        self
    }

    /// Write figure image paths relative to `dir`.
    pub fn with_image_base(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_base = Some(dir.into());
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_frontmatter: false,
            title_block: None,
            toc: None,
            toc_max_level: None,
            list_marker: '-',
            escape_special_chars: true,
            emit_anchors: true,
            page_break: PageBreakStyle::Html,
            footers: false,
            image_base: None,
        }
    }
}

/// How page breaks appear in Markdown output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageBreakStyle {
    /// `<div style="page-break-after: always"></div>`
    #[default]
    Html,
    /// A `---` rule
    Rule,
    /// Nothing
    Omit,
}

impl PageBreakStyle {
    /// Parse a style name (`html`, `rule`, `omit`/`none`).
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "html" => Ok(PageBreakStyle::Html),
            "rule" => Ok(PageBreakStyle::Rule),
            "omit" | "none" => Ok(PageBreakStyle::Omit),
            other => Err(format!("Unknown page break style: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_frontmatter(true)
            .with_toc(false)
            .with_toc_max_level(9)
            .with_page_break(PageBreakStyle::Rule);

        assert!(options.include_frontmatter);
        assert_eq!(options.toc, Some(false));
        assert_eq!(options.toc_max_level, Some(6));
        assert_eq!(options.page_break, PageBreakStyle::Rule);
        assert!(options.title_block.is_none());
    }

    #[test]
    fn test_page_break_style_parse() {
        assert_eq!(PageBreakStyle::parse("HTML").unwrap(), PageBreakStyle::Html);
        assert_eq!(PageBreakStyle::parse("none").unwrap(), PageBreakStyle::Omit);
        assert!(PageBreakStyle::parse("fancy").is_err());
    }
}

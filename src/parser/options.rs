//! Parsing options and configuration.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::model::CalloutKind;

use super::factory::{BlockFactory, DefaultFactory};
use super::figure::{PageRasterizer, SearchPathResolver, SourceResolver};
use super::pagination::PaginationPolicy;

/// Options for parsing handout notes.
#[derive(Clone)]
pub struct ParseOptions {
    /// How to treat unknown `[DOC]` header keys
    pub header_mode: HeaderMode,

    /// Zoom used by figures that do not set one
    pub default_zoom: f32,

    /// Where rasterized figure pages are cached
    pub cache_dir: Option<PathBuf>,

    /// Page break and space reservation rules
    pub pagination: PaginationPolicy,

    /// Default titles and captions
    pub labels: Labels,

    /// Locates figure sources
    pub resolver: Arc<dyn SourceResolver>,

    /// Renders figure pages, if available
    pub rasterizer: Option<Arc<dyn PageRasterizer>>,

    /// Builds the content blocks
    pub factory: Arc<dyn BlockFactory>,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set header mode.
    pub fn with_header_mode(mut self, mode: HeaderMode) -> Self {
        self.header_mode = mode;
        self
    }

    /// Fail on unknown `[DOC]` keys.
    pub fn strict(mut self) -> Self {
        self.header_mode = HeaderMode::Strict;
        self
    }

    /// Set the default figure zoom.
    pub fn with_default_zoom(mut self, zoom: f32) -> Self {
        self.default_zoom = zoom;
        self
    }

    /// Set the figure cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set the pagination policy.
    pub fn with_pagination(mut self, policy: PaginationPolicy) -> Self {
        self.pagination = policy;
        self
    }

    /// Set the default labels.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Set the figure source resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn SourceResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Resolve figure sources in a single directory.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resolver = Arc::new(SearchPathResolver::new([dir.into()]));
        self
    }

    /// Set the page rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// Set the block factory.
    pub fn with_factory(mut self, factory: Arc<dyn BlockFactory>) -> Self {
        self.factory = factory;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            header_mode: HeaderMode::Lenient,
            default_zoom: 2.0,
            cache_dir: None,
            pagination: PaginationPolicy::default(),
            labels: Labels::default(),
            resolver: Arc::new(SearchPathResolver::new([PathBuf::from(".")])),
            rasterizer: None,
            factory: Arc::new(DefaultFactory),
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("header_mode", &self.header_mode)
            .field("default_zoom", &self.default_zoom)
            .field("cache_dir", &self.cache_dir)
            .field("pagination", &self.pagination)
            .field("labels", &self.labels)
            .field("rasterizer", &self.rasterizer.is_some())
            .finish_non_exhaustive()
    }
}

/// Handling of unknown `[DOC]` header keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Fail the document
    Strict,
    /// Log a warning and continue
    #[default]
    Lenient,
}

/// Default titles and captions, so they can be localized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    /// `:::def`
    pub definition: String,
    /// `:::ej`
    pub example: String,
    /// `:::error`
    pub typical_error: String,
    /// `:::tip`
    pub tip: String,
    /// `:::warn`
    pub attention: String,
    /// `:::info`
    pub info: String,
    /// `:::check`
    pub checklist: String,
    /// Title of fenced code blocks
    pub code: String,
    /// Title of indented code blocks
    pub procedure: String,
    /// Caption of figures without one; `{file}` and `{page}` are replaced
    pub figure_caption: String,
}

impl Labels {
    /// Style and default title of a `:::kind` callout.
    ///
    /// Unknown kinds become info callouts titled with the kind uppercased.
    pub fn fenced_callout(&self, kind: &str) -> (CalloutKind, String) {
        match kind {
            "def" => (CalloutKind::Note, self.definition.clone()),
            "ej" => (CalloutKind::Info, self.example.clone()),
            "error" => (CalloutKind::Danger, self.typical_error.clone()),
            "tip" => (CalloutKind::Note, self.tip.clone()),
            "warn" => (CalloutKind::Warning, self.attention.clone()),
            "info" => (CalloutKind::Info, self.info.clone()),
            "check" => (CalloutKind::Info, self.checklist.clone()),
            "" => (CalloutKind::Info, self.info.clone()),
            other => (CalloutKind::Info, other.to_uppercase()),
        }
    }

    /// Title of a fenced code block with an optional language tag.
    pub fn code_title(&self, language: Option<&str>) -> String {
        match language {
            Some(lang) if !lang.is_empty() => format!("{} ({})", self.code, lang),
            _ => self.code.clone(),
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            definition: "Definition".to_string(),
            example: "Example".to_string(),
            typical_error: "Typical error".to_string(),
            tip: "Tip".to_string(),
            attention: "Attention".to_string(),
            info: "Info".to_string(),
            checklist: "Checklist".to_string(),
            code: "Code".to_string(),
            procedure: "Procedure".to_string(),
            figure_caption: "Source: {file}, p. {page}".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new()
            .strict()
            .with_default_zoom(1.5)
            .with_cache_dir("/tmp/cache")
            .with_pagination(PaginationPolicy::continuous());

        assert_eq!(options.header_mode, HeaderMode::Strict);
        assert_eq!(options.default_zoom, 1.5);
        assert_eq!(options.cache_dir, Some(PathBuf::from("/tmp/cache")));
        assert!(!options.pagination.top_level_starts_new_page);
    }

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert_eq!(options.header_mode, HeaderMode::Lenient);
        assert_eq!(options.default_zoom, 2.0);
        assert!(options.rasterizer.is_none());
        assert!(format!("{:?}", options).contains("ParseOptions"));
    }

    #[test]
    fn test_fenced_callout_kinds() {
        let labels = Labels::default();
        assert_eq!(
            labels.fenced_callout("def"),
            (CalloutKind::Note, "Definition".to_string())
        );
        assert_eq!(
            labels.fenced_callout("error"),
            (CalloutKind::Danger, "Typical error".to_string())
        );
        assert_eq!(
            labels.fenced_callout("warn"),
            (CalloutKind::Warning, "Attention".to_string())
        );
        assert_eq!(
            labels.fenced_callout("lemma"),
            (CalloutKind::Info, "LEMMA".to_string())
        );
    }

    #[test]
    fn test_code_title() {
        let labels = Labels::default();
        assert_eq!(labels.code_title(None), "Code");
        assert_eq!(labels.code_title(Some("")), "Code");
        assert_eq!(labels.code_title(Some("sql")), "Code (sql)");
    }
}

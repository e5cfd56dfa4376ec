//! Line classification.
//!
//! Block openers are tried in a fixed order and the first match wins.
//! Later entries are shadowed by earlier ones: `1. Title` is a heading,
//! never an ordered list item, and `- - - - -`-style lines are checked as
//! rules before bullets.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::CalloutKind;

static PAGE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(?:PAGEBREAK|PB)\]\s*$").unwrap());

static FIGURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\[FIG\s+file="(?P<file>[^"]+)"\s+page=(?P<page>\d+)(?:\s+caption="(?P<caption>[^"]*)")?(?:\s+zoom=(?P<zoom>[\d.]+))?\s*\]\s*$"#,
    )
    .unwrap()
});

static BLOCK_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:::(?P<kind>[A-Za-z0-9_-]+)(?:\s+(?P<title>.+))?\s*$").unwrap()
});

static BLOCK_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:::\s*$").unwrap());

static CALLOUT_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[(?P<kind>NOTE|WARN|DANGER|INFO|TIP|CHECK)(?:\s+title="(?P<title>[^"]*)")?\]\s*$"#)
        .unwrap()
});

static CALLOUT_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[/(?P<kind>NOTE|WARN|DANGER|INFO|TIP|CHECK)\]\s*$").unwrap()
});

static FENCE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```(?P<lang>[A-Za-z0-9_+-]+)?\s*$").unwrap());

static FENCE_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*```\s*$").unwrap());

/// `1. Title`, `1.2. Title`
static HEADING_DOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<num>\d+(?:\.\d+)*)\.\s+(?P<title>.+)$").unwrap());

/// `1.2 Title` (at least two number parts, no trailing dot)
static HEADING_MULTI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<num>\d+(?:\.\d+)+)\s+(?P<title>.+)$").unwrap());

/// Title line inside a `=====` block: `1. Title`, `1.2) Title`
static HEADING_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<num>\d+(?:\.\d+)*)(?P<delim>[.)])\s+(?P<title>.+)$").unwrap()
});

static ORDERED_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s+(?P<text>.*)$").unwrap());

const BULLETS: [&str; 3] = ["- ", "* ", "• "];

/// Minimum length of a `=` rule.
pub const EQUALS_RULE_MIN: usize = 10;

/// Minimum length of a `-` rule.
pub const DASH_RULE_MIN: usize = 5;

/// One input line, as written and trimmed.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    /// The line without its terminator
    pub raw: &'a str,
    /// The line with surrounding whitespace removed
    pub trimmed: &'a str,
}

impl<'a> Line<'a> {
    /// Wrap a raw line.
    pub fn new(raw: &'a str) -> Self {
        let raw = raw.trim_end_matches(['\n', '\r']);
        Self {
            raw,
            trimmed: raw.trim(),
        }
    }

    /// Check if the line has no content.
    pub fn is_blank(&self) -> bool {
        self.trimmed.is_empty()
    }
}

/// Kind of block a line opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opener {
    /// `[PAGEBREAK]` / `[PB]`
    PageBreak,
    /// `[FIG file="..." page=N ...]`
    Figure,
    /// `:::kind [title]`
    FencedBlock,
    /// `[KIND title="..."]`
    LegacyCallout,
    /// A line of `=` (heading block or rule)
    EqualsRule,
    /// A line of `-`
    DashRule,
    /// `N. Title` / `N.N Title`
    NumberedHeading,
    /// Triple backtick fence
    CodeFence,
    /// `- `, `* `, `• `
    UnorderedList,
    /// `N. ` / `N) `
    OrderedList,
    /// Four spaces or a tab
    Indented,
}

type Predicate = fn(&Line<'_>) -> bool;

/// Openers in priority order.
const OPENERS: [(Opener, Predicate); 11] = [
    (Opener::PageBreak, |l| is_page_break(l.trimmed)),
    (Opener::Figure, |l| parse_figure_marker(l.trimmed).is_some()),
    (Opener::FencedBlock, |l| BLOCK_OPEN_RE.is_match(l.trimmed)),
    (Opener::LegacyCallout, |l| CALLOUT_OPEN_RE.is_match(l.trimmed)),
    (Opener::EqualsRule, |l| is_equals_rule(l.trimmed)),
    (Opener::DashRule, |l| is_dash_rule(l.trimmed)),
    (Opener::NumberedHeading, |l| parse_numbered_heading(l.trimmed).is_some()),
    (Opener::CodeFence, |l| FENCE_OPEN_RE.is_match(l.raw)),
    (Opener::UnorderedList, |l| bullet_text(l.raw).is_some()),
    (Opener::OrderedList, |l| ORDERED_ITEM_RE.is_match(l.trimmed)),
    (Opener::Indented, |l| is_indented(l.raw)),
];

/// Classify a non-blank line. `None` means paragraph text.
pub fn classify(line: &Line<'_>) -> Option<Opener> {
    OPENERS
        .iter()
        .find(|(_, matches)| matches(line))
        .map(|(opener, _)| *opener)
}

fn is_rule(text: &str, ch: char, min_len: usize) -> bool {
    text.chars().count() >= min_len && text.chars().all(|c| c == ch)
}

/// A line made only of `=`, at least [`EQUALS_RULE_MIN`] long.
pub fn is_equals_rule(text: &str) -> bool {
    is_rule(text.trim(), '=', EQUALS_RULE_MIN)
}

/// A line made only of `-`, at least [`DASH_RULE_MIN`] long.
pub fn is_dash_rule(text: &str) -> bool {
    is_rule(text.trim(), '-', DASH_RULE_MIN)
}

/// Four-space or tab indentation.
pub fn is_indented(raw: &str) -> bool {
    raw.starts_with("    ") || raw.starts_with('\t')
}

/// Remove one level of indentation.
pub fn strip_indent(raw: &str) -> &str {
    raw.strip_prefix("    ")
        .or_else(|| raw.strip_prefix('\t'))
        .unwrap_or(raw)
}

/// Text of a bullet item, if the line is one.
pub fn bullet_text(raw: &str) -> Option<&str> {
    let text = raw.trim_start();
    BULLETS.iter().find_map(|bullet| text.strip_prefix(bullet))
}

/// Text of an ordered item (`1. x`, `2) y`), if the line is one.
pub fn ordered_item_text(trimmed: &str) -> Option<&str> {
    ORDERED_ITEM_RE
        .captures(trimmed)
        .and_then(|caps| caps.name("text"))
        .map(|m| m.as_str())
}

/// Check if a line is an explicit page break.
pub fn is_page_break(trimmed: &str) -> bool {
    PAGE_BREAK_RE.is_match(trimmed)
}

/// A parsed numbered heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedHeading {
    /// Display text, e.g. `1.2. Scope`
    pub display: String,
    /// Base text for the anchor key, e.g. `1.2-Scope`
    pub key_base: String,
    /// 1 + number of dots in the numeral
    pub level: u8,
}

impl NumberedHeading {
    fn new(num: &str, delim: &str, title: &str) -> Self {
        let dots = num.matches('.').count();
        Self {
            display: format!("{num}{delim} {title}"),
            key_base: format!("{num}-{title}"),
            level: u8::try_from(dots + 1).unwrap_or(u8::MAX),
        }
    }
}

/// Parse a heading line: `N. Title`, `N.N. Title` or `N.N Title`.
pub fn parse_numbered_heading(trimmed: &str) -> Option<NumberedHeading> {
    if let Some(caps) = HEADING_DOT_RE.captures(trimmed) {
        return Some(NumberedHeading::new(&caps["num"], ".", &caps["title"]));
    }
    HEADING_MULTI_RE
        .captures(trimmed)
        .map(|caps| NumberedHeading::new(&caps["num"], "", &caps["title"]))
}

/// Parse the title line of a `=====` heading block (`N.` or `N)` numerals).
pub fn parse_block_heading(trimmed: &str) -> Option<NumberedHeading> {
    HEADING_BLOCK_RE
        .captures(trimmed)
        .map(|caps| NumberedHeading::new(&caps["num"], &caps["delim"], &caps["title"]))
}

/// A parsed `[FIG ...]` marker.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureMarker {
    /// Source document name
    pub file: String,
    /// 1-based page number
    pub page: u32,
    /// Caption, when given
    pub caption: Option<String>,
    /// Zoom factor, when given
    pub zoom: Option<f32>,
}

/// Parse a `[FIG file="..." page=N caption="..." zoom=Z]` marker.
pub fn parse_figure_marker(trimmed: &str) -> Option<FigureMarker> {
    let caps = FIGURE_RE.captures(trimmed)?;
    let page = caps["page"].parse().ok()?;
    Some(FigureMarker {
        file: caps["file"].to_string(),
        page,
        caption: caps.name("caption").map(|m| m.as_str().to_string()),
        zoom: caps
            .name("zoom")
            .and_then(|m| m.as_str().parse::<f32>().ok())
            .filter(|z| *z > 0.0),
    })
}

/// Parse a `:::kind [title]` opener into lowercase kind and title.
pub fn parse_block_open(trimmed: &str) -> Option<(String, Option<String>)> {
    let caps = BLOCK_OPEN_RE.captures(trimmed)?;
    let kind = caps["kind"].trim().to_lowercase();
    let title = caps
        .name("title")
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty());
    Some((kind, title))
}

/// Check if a line closes a `:::` block.
pub fn is_block_close(trimmed: &str) -> bool {
    BLOCK_CLOSE_RE.is_match(trimmed)
}

/// Parse a `[KIND title="..."]` opener into lowercase kind and title.
pub fn parse_callout_open(trimmed: &str) -> Option<(String, Option<String>)> {
    let caps = CALLOUT_OPEN_RE.captures(trimmed)?;
    let kind = caps["kind"].to_lowercase();
    let title = caps
        .name("title")
        .map(|m| m.as_str().to_string())
        .filter(|t| !t.is_empty());
    Some((kind, title))
}

/// Lowercase kind of a `[/KIND]` closer.
pub fn parse_callout_close(trimmed: &str) -> Option<String> {
    CALLOUT_CLOSE_RE
        .captures(trimmed)
        .map(|caps| caps["kind"].to_lowercase())
}

/// Visual style of a legacy `[KIND]` callout.
pub fn legacy_callout_kind(kind: &str) -> CalloutKind {
    match kind {
        "note" | "tip" => CalloutKind::Note,
        "warn" => CalloutKind::Warning,
        "danger" => CalloutKind::Danger,
        _ => CalloutKind::Info,
    }
}

/// Language tag of a code fence opener (`Some("")` for a bare fence).
pub fn parse_fence_open(raw: &str) -> Option<&str> {
    FENCE_OPEN_RE
        .captures(raw)
        .map(|caps| caps.name("lang").map_or("", |m| m.as_str()))
}

/// Check if a line closes a code fence.
pub fn is_fence_close(raw: &str) -> bool {
    FENCE_CLOSE_RE.is_match(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(raw: &str) -> Option<Opener> {
        classify(&Line::new(raw))
    }

    #[test]
    fn test_classify_each_opener() {
        assert_eq!(kind("[PB]"), Some(Opener::PageBreak));
        assert_eq!(kind("  [PAGEBREAK]  "), Some(Opener::PageBreak));
        assert_eq!(kind(r#"[FIG file="a.pdf" page=3]"#), Some(Opener::Figure));
        assert_eq!(kind(":::def Ordered Pair"), Some(Opener::FencedBlock));
        assert_eq!(kind(r#"[NOTE title="x"]"#), Some(Opener::LegacyCallout));
        assert_eq!(kind("=========="), Some(Opener::EqualsRule));
        assert_eq!(kind("-----"), Some(Opener::DashRule));
        assert_eq!(kind("1. Intro"), Some(Opener::NumberedHeading));
        assert_eq!(kind("```rust"), Some(Opener::CodeFence));
        assert_eq!(kind("- item"), Some(Opener::UnorderedList));
        assert_eq!(kind("• item"), Some(Opener::UnorderedList));
        assert_eq!(kind("1) item"), Some(Opener::OrderedList));
        assert_eq!(kind("    step"), Some(Opener::Indented));
        assert_eq!(kind("\tstep"), Some(Opener::Indented));
        assert_eq!(kind("Just text."), None);
    }

    #[test]
    fn test_priority_order() {
        // A numbered line is a heading before it can be a list item.
        assert_eq!(kind("2. Second"), Some(Opener::NumberedHeading));
        // Indented bullets are bullets, not code.
        assert_eq!(kind("    - nested"), Some(Opener::UnorderedList));
        // Rules win over bullets.
        assert_eq!(kind("----------"), Some(Opener::DashRule));
        // Short runs are not rules.
        assert_eq!(kind("====="), None);
        assert_eq!(kind("----"), None);
    }

    #[test]
    fn test_numbered_heading() {
        let h = parse_numbered_heading("1. Intro").unwrap();
        assert_eq!(h.display, "1. Intro");
        assert_eq!(h.key_base, "1-Intro");
        assert_eq!(h.level, 1);

        let h = parse_numbered_heading("2.3.1. Deep dive").unwrap();
        assert_eq!(h.level, 3);
        assert_eq!(h.display, "2.3.1. Deep dive");

        let h = parse_numbered_heading("1.2 Scope").unwrap();
        assert_eq!(h.level, 2);
        assert_eq!(h.display, "1.2 Scope");

        assert!(parse_numbered_heading("12 monkeys").is_none());
        assert!(parse_numbered_heading("1.").is_none());
    }

    #[test]
    fn test_block_heading() {
        let h = parse_block_heading("1.2) Scope").unwrap();
        assert_eq!(h.display, "1.2) Scope");
        assert_eq!(h.level, 2);
        assert!(parse_block_heading("Introduction").is_none());
    }

    #[test]
    fn test_figure_marker() {
        let fig = parse_figure_marker(r#"[FIG file="slides.pdf" page=12 caption="Diagram" zoom=1.5]"#)
            .unwrap();
        assert_eq!(fig.file, "slides.pdf");
        assert_eq!(fig.page, 12);
        assert_eq!(fig.caption.as_deref(), Some("Diagram"));
        assert_eq!(fig.zoom, Some(1.5));

        let fig = parse_figure_marker(r#"[FIG file="a.pdf" page=1]"#).unwrap();
        assert_eq!(fig.caption, None);
        assert_eq!(fig.zoom, None);

        assert!(parse_figure_marker(r#"[FIG file="a.pdf"]"#).is_none());
        assert!(parse_figure_marker(r#"[FIG file="a.pdf" page=1] trailing"#).is_none());
    }

    #[test]
    fn test_fenced_and_legacy_openers() {
        assert_eq!(
            parse_block_open(":::DEF  Ordered Pair "),
            Some(("def".to_string(), Some("Ordered Pair".to_string())))
        );
        assert_eq!(parse_block_open(":::table"), Some(("table".to_string(), None)));
        assert!(is_block_close(":::"));
        assert!(!is_block_close(":::def"));

        assert_eq!(
            parse_callout_open(r#"[WARN title="Careful"]"#),
            Some(("warn".to_string(), Some("Careful".to_string())))
        );
        assert_eq!(parse_callout_open("[TIP]"), Some(("tip".to_string(), None)));
        assert_eq!(parse_callout_close("[/TIP]").as_deref(), Some("tip"));
        assert_eq!(legacy_callout_kind("tip"), CalloutKind::Note);
        assert_eq!(legacy_callout_kind("check"), CalloutKind::Info);
        assert_eq!(legacy_callout_kind("warn"), CalloutKind::Warning);
    }

    #[test]
    fn test_fences_and_items() {
        assert_eq!(parse_fence_open("```"), Some(""));
        assert_eq!(parse_fence_open("  ```c++"), Some("c++"));
        assert_eq!(parse_fence_open("```not closed here"), None);
        assert!(is_fence_close("```  "));
        assert_eq!(bullet_text("  * starred"), Some("starred"));
        assert_eq!(bullet_text("-no space"), None);
        assert_eq!(ordered_item_text("3) third"), Some("third"));
        assert_eq!(strip_indent("        deeper"), "    deeper");
        assert_eq!(strip_indent("\tx"), "x");
    }
}

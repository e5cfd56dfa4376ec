//! Block scanner.
//!
//! Walks the lines of a note body and turns them into content blocks.
//! Callout bodies are scanned recursively with the same anchor registry,
//! flagged as being inside a callout so their headings stay out of the
//! table of contents and outline.

use crate::inline::{sanitize_code_line, sanitize_para};
use crate::model::{Anchor, Block, CalloutKind};

use super::anchors::AnchorRegistry;
use super::figure::resolve_figure;
use super::markers::{
    bullet_text, classify, is_block_close, is_equals_rule, is_fence_close, is_indented,
    legacy_callout_kind, ordered_item_text, parse_block_heading, parse_block_open,
    parse_callout_close, parse_callout_open, parse_fence_open, parse_figure_marker,
    parse_numbered_heading, strip_indent, Line, Opener,
};
use super::options::ParseOptions;
use super::pagination::Story;
use super::table::parse_pipe_table;

/// State shared by one scan and every nested scan it starts.
pub struct ScanContext<'a> {
    /// Anchor keys issued so far in this document build
    pub anchors: &'a mut AnchorRegistry,

    /// Scanning a callout body
    pub in_callout: bool,
}

impl<'a> ScanContext<'a> {
    /// Context for a top-level scan.
    pub fn new(anchors: &'a mut AnchorRegistry) -> Self {
        Self {
            anchors,
            in_callout: false,
        }
    }

    /// Context for a callout body, sharing the registry.
    fn nested(&mut self) -> ScanContext<'_> {
        ScanContext {
            anchors: &mut *self.anchors,
            in_callout: true,
        }
    }
}

/// Position in the lines of one scan pass.
struct Cursor<'a> {
    lines: &'a [&'a str],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(lines: &'a [&'a str]) -> Self {
        Self { lines, pos: 0 }
    }

    fn peek(&self) -> Option<Line<'a>> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<Line<'a>> {
        self.lines.get(self.pos + offset).map(|raw| Line::new(raw))
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.lines.len());
    }

    /// Consume lines up to and including the first one matching `is_close`.
    ///
    /// Returns the lines before the closer and whether a closer was found.
    /// Without a closer the rest of the input is the body.
    fn take_until(&mut self, is_close: impl Fn(&Line<'a>) -> bool) -> (Vec<&'a str>, bool) {
        let mut body = Vec::new();
        while let Some(line) = self.peek() {
            self.advance(1);
            if is_close(&line) {
                return (body, true);
            }
            body.push(line.raw);
        }
        (body, false)
    }

    /// Consume consecutive lines for which `item` returns a value.
    fn take_while<T>(&mut self, item: impl Fn(&Line<'a>) -> Option<T>) -> Vec<T> {
        let mut items = Vec::new();
        while let Some(value) = self.peek().and_then(|line| item(&line)) {
            items.push(value);
            self.advance(1);
        }
        items
    }
}

/// Turns note text into content blocks.
pub struct Scanner<'o> {
    options: &'o ParseOptions,
}

impl<'o> Scanner<'o> {
    /// Create a scanner with the given options.
    pub fn new(options: &'o ParseOptions) -> Self {
        Self { options }
    }

    /// Scan a note body (header already removed).
    ///
    /// Never fails: unclosed fences absorb the rest of the input and
    /// unresolvable figures are dropped with a warning.
    pub fn scan(&self, text: &str, anchors: &mut AnchorRegistry) -> Vec<Block> {
        let lines: Vec<&str> = text.lines().collect();
        log::debug!("scanning {} lines", lines.len());
        self.scan_lines(&lines, &mut ScanContext::new(anchors))
    }

    /// Scan a slice of lines within an existing context.
    pub fn scan_lines(&self, lines: &[&str], ctx: &mut ScanContext<'_>) -> Vec<Block> {
        let mut cursor = Cursor::new(lines);
        let mut story = Story::new();

        while let Some(line) = cursor.peek() {
            if line.is_blank() {
                cursor.advance(1);
                continue;
            }

            match classify(&line) {
                Some(Opener::PageBreak) => {
                    story.push(Block::PageBreak);
                    cursor.advance(1);
                }
                Some(Opener::Figure) => {
                    cursor.advance(1);
                    self.figure(&mut story, &line);
                }
                Some(Opener::FencedBlock) => self.fenced_block(&mut story, &mut cursor, ctx),
                Some(Opener::LegacyCallout) => self.legacy_callout(&mut story, &mut cursor, ctx),
                Some(Opener::EqualsRule) => self.equals_block(&mut story, &mut cursor, ctx),
                Some(Opener::DashRule) => {
                    story.push(self.options.factory.horizontal_rule());
                    cursor.advance(1);
                }
                Some(Opener::NumberedHeading) => {
                    cursor.advance(1);
                    if let Some(h) = parse_numbered_heading(line.trimmed) {
                        self.heading(&mut story, ctx, &h.display, &h.key_base, h.level);
                    }
                }
                Some(Opener::CodeFence) => self.code_fence(&mut story, &mut cursor),
                Some(Opener::UnorderedList) => {
                    let items = cursor.take_while(|l| bullet_text(l.raw).map(sanitize_para));
                    story.push(self.options.factory.list(false, &items));
                }
                Some(Opener::OrderedList) => {
                    let items =
                        cursor.take_while(|l| ordered_item_text(l.trimmed).map(sanitize_para));
                    story.push(self.options.factory.list(true, &items));
                }
                Some(Opener::Indented) => {
                    let lines = cursor.take_while(|l| {
                        is_indented(l.raw).then(|| sanitize_code_line(strip_indent(l.raw)))
                    });
                    story.reserve_space(self.options.pagination.min_space_code);
                    story.push(self.options.factory.code_block(
                        &self.options.labels.procedure,
                        None,
                        lines,
                    ));
                }
                None => self.paragraph(&mut story, &mut cursor),
            }
        }

        story.into_blocks()
    }

    fn figure(&self, story: &mut Story, line: &Line<'_>) {
        let Some(marker) = parse_figure_marker(line.trimmed) else {
            return;
        };
        let Some(block) = resolve_figure(&marker, self.options)
            .and_then(|figure| self.options.factory.figure(figure))
        else {
            return;
        };
        story.reserve_space(self.options.pagination.min_space_figure);
        story.push(block);
    }

    fn fenced_block(&self, story: &mut Story, cursor: &mut Cursor<'_>, ctx: &mut ScanContext<'_>) {
        let Some(line) = cursor.peek() else {
            return;
        };
        cursor.advance(1);
        let Some((kind, title)) = parse_block_open(line.trimmed) else {
            return;
        };

        let (body, closed) = cursor.take_until(|l| is_block_close(l.trimmed));
        if !closed {
            log::warn!(":::{} block is never closed, it runs to the end of input", kind);
        }

        if kind == "table" {
            story.push(self.options.factory.table(parse_pipe_table(&body)));
            return;
        }

        let (style, default_title) = self.options.labels.fenced_callout(&kind);
        let title = title.unwrap_or(default_title);
        self.callout(story, ctx, style, Some(&title), &body);
    }

    fn legacy_callout(
        &self,
        story: &mut Story,
        cursor: &mut Cursor<'_>,
        ctx: &mut ScanContext<'_>,
    ) {
        let Some(line) = cursor.peek() else {
            return;
        };
        cursor.advance(1);
        let Some((kind, title)) = parse_callout_open(line.trimmed) else {
            return;
        };

        let (body, closed) =
            cursor.take_until(|l| parse_callout_close(l.trimmed).as_deref() == Some(kind.as_str()));
        if !closed {
            log::warn!("[{}] callout is never closed, it runs to the end of input", kind.to_uppercase());
        }

        self.callout(story, ctx, legacy_callout_kind(&kind), title.as_deref(), &body);
    }

    fn callout(
        &self,
        story: &mut Story,
        ctx: &mut ScanContext<'_>,
        kind: CalloutKind,
        title: Option<&str>,
        body: &[&str],
    ) {
        // Registered before the body so nested headings come after it.
        let anchor = title.map(|t| Anchor::hidden(ctx.anchors.register(t)));

        let mut blocks = self.scan_lines(body, &mut ctx.nested());
        if blocks.is_empty() {
            blocks.push(self.options.factory.paragraph(""));
        }

        let title = title.map(sanitize_para);
        story.reserve_space(self.options.pagination.min_space_callout);
        story.push(
            self.options
                .factory
                .callout(kind, title.as_deref(), blocks, anchor),
        );
    }

    /// `=====` line: a heading block when a title and a closing rule follow,
    /// otherwise a rule.
    fn equals_block(&self, story: &mut Story, cursor: &mut Cursor<'_>, ctx: &mut ScanContext<'_>) {
        let title = cursor.peek_at(1).filter(|l| !l.is_blank());
        let closing = cursor.peek_at(2).filter(|l| is_equals_rule(l.trimmed));

        match (title, closing) {
            (Some(title), Some(_)) => {
                cursor.advance(3);
                match parse_block_heading(title.trimmed) {
                    Some(h) => self.heading(story, ctx, &h.display, &h.key_base, h.level),
                    None => self.heading(story, ctx, title.trimmed, title.trimmed, 1),
                }
            }
            _ => {
                cursor.advance(1);
                story.push(self.options.factory.horizontal_rule());
            }
        }
    }

    fn heading(
        &self,
        story: &mut Story,
        ctx: &mut ScanContext<'_>,
        display: &str,
        key_base: &str,
        level: u8,
    ) {
        let key = ctx.anchors.register(key_base);
        let anchor = if ctx.in_callout {
            Anchor::hidden(key)
        } else {
            Anchor::new(key)
        };
        let heading = self
            .options
            .factory
            .heading(&sanitize_para(display), level, anchor);
        story.heading(heading, &self.options.pagination, ctx.in_callout);
    }

    fn code_fence(&self, story: &mut Story, cursor: &mut Cursor<'_>) {
        let Some(line) = cursor.peek() else {
            return;
        };
        cursor.advance(1);
        let language = parse_fence_open(line.raw).filter(|lang| !lang.is_empty());

        let (body, closed) = cursor.take_until(|l| is_fence_close(l.raw));
        if !closed {
            log::warn!("code fence is never closed, it runs to the end of input");
        }

        let lines = body.iter().map(|raw| sanitize_code_line(raw)).collect();
        let title = self.options.labels.code_title(language);
        story.reserve_space(self.options.pagination.min_space_code);
        story.push(self.options.factory.code_block(&title, language, lines));
    }

    /// Current line plus following lines up to a blank line or an opener.
    fn paragraph(&self, story: &mut Story, cursor: &mut Cursor<'_>) {
        let mut parts = Vec::new();
        if let Some(first) = cursor.peek() {
            parts.push(sanitize_para(first.trimmed));
            cursor.advance(1);
        }
        while let Some(line) = cursor.peek() {
            if line.is_blank() || classify(&line).is_some() {
                break;
            }
            parts.push(sanitize_para(line.trimmed));
            cursor.advance(1);
        }

        parts.retain(|p| !p.is_empty());
        story.push(self.options.factory.paragraph(&parts.join(" ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Heading;
    use crate::parser::PaginationPolicy;

    fn scan(text: &str) -> Vec<Block> {
        let options = ParseOptions::new();
        Scanner::new(&options).scan(text, &mut AnchorRegistry::new())
    }

    fn scan_continuous(text: &str) -> Vec<Block> {
        let options = ParseOptions::new().with_pagination(PaginationPolicy::continuous());
        Scanner::new(&options).scan(text, &mut AnchorRegistry::new())
    }

    fn heading(block: &Block) -> &Heading {
        match block {
            Block::Heading(h) => h,
            other => panic!("expected heading, got {:?}", other),
        }
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let blocks = scan("1. Intro\nHello world.\n\n2. Next\nBye.");
        assert_eq!(blocks.len(), 5);

        let first = heading(&blocks[0]);
        assert_eq!(first.text, "1. Intro");
        assert_eq!(first.level, 1);
        assert_eq!(first.anchor.key, "1-intro");
        assert_eq!(blocks[1].plain_text(), "Hello world.");

        // Second top-level heading starts a new page.
        assert!(blocks[2].is_page_break());
        assert_eq!(heading(&blocks[3]).anchor.key, "2-next");
        assert_eq!(blocks[4].plain_text(), "Bye.");
    }

    #[test]
    fn test_paragraph_joins_lines() {
        let blocks = scan("first   line\nsecond *line*\n- item");
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            Block::Paragraph(p) => {
                assert_eq!(p.plain_text(), "first line second line");
                assert!(p.content.last().is_some_and(|r| r.style.italic));
            }
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_heading_is_hidden() {
        let blocks = scan("[NOTE title=\"Aside\"]\n1. Inner\ntext\n[/NOTE]");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], Block::ReserveSpace { points: 180.0 });
        match &blocks[1] {
            Block::Callout(c) => {
                assert_eq!(c.kind, CalloutKind::Note);
                assert_eq!(c.anchor.as_ref().map(|a| a.key.as_str()), Some("aside"));
                let inner = heading(&c.body[0]);
                assert!(inner.anchor.skip_toc && inner.anchor.skip_outline);
                assert_eq!(inner.anchor.key, "1-inner");
                // No page break inside the callout.
                assert_eq!(c.body.len(), 2);
            }
            other => panic!("expected callout, got {:?}", other),
        }
    }

    #[test]
    fn test_legacy_close_must_match_kind() {
        let blocks = scan_continuous("[WARN]\nbody\n[/NOTE]\nmore\n[/WARN]\nafter");
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            Block::Callout(c) => {
                assert_eq!(c.kind, CalloutKind::Warning);
                assert!(c.title.is_none());
                assert!(c.anchor.is_none());
                assert_eq!(c.body.len(), 1);
                assert_eq!(c.body[0].plain_text(), "body [/NOTE] more");
            }
            other => panic!("expected callout, got {:?}", other),
        }
        assert_eq!(blocks[1].plain_text(), "after");
    }

    #[test]
    fn test_equals_heading_block() {
        let blocks = scan_continuous("==========\n1.2) Scope\n==========\n==========\nplain");
        let h = heading(&blocks[0]);
        assert_eq!(h.text, "1.2) Scope");
        assert_eq!(h.level, 2);
        assert_eq!(h.anchor.key, "1-2-scope");
        assert_eq!(blocks[1], Block::HorizontalRule);
        assert_eq!(blocks[2].plain_text(), "plain");
    }

    #[test]
    fn test_equals_block_without_number() {
        let blocks = scan_continuous("============\nIntroduction\n============");
        let h = heading(&blocks[0]);
        assert_eq!(h.text, "Introduction");
        assert_eq!(h.level, 1);
        assert_eq!(h.anchor.key, "introduction");
    }

    #[test]
    fn test_lists() {
        let blocks = scan("- a\n* b\n• c\n\n1) one\n2. two");
        assert_eq!(blocks.len(), 2);
        match (&blocks[0], &blocks[1]) {
            (Block::List(ul), Block::List(ol)) => {
                assert!(!ul.ordered);
                assert_eq!(ul.items.len(), 3);
                assert!(ol.ordered);
                assert_eq!(ol.items[1].plain_text(), "two");
            }
            other => panic!("expected two lists, got {:?}", other),
        }
    }

    #[test]
    fn test_indented_block() {
        let blocks = scan("Steps:\n    open file\n\tsave it\nDone.");
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1], Block::ReserveSpace { points: 140.0 });
        match &blocks[2] {
            Block::CodeBlock(code) => {
                assert_eq!(code.title, "Procedure");
                assert_eq!(code.lines, vec!["open&nbsp;file", "save&nbsp;it"]);
            }
            other => panic!("expected code block, got {:?}", other),
        }
    }

    #[test]
    fn test_reserve_goes_before_heading() {
        let blocks = scan("1.1. Sample\n```sql\nSELECT 1;\n```");
        assert_eq!(blocks[0], Block::ReserveSpace { points: 140.0 });
        assert!(blocks[1].is_heading());
        match &blocks[2] {
            Block::CodeBlock(code) => {
                assert_eq!(code.title, "Code (sql)");
                assert_eq!(code.language.as_deref(), Some("sql"));
            }
            other => panic!("expected code block, got {:?}", other),
        }
    }

    #[test]
    fn test_exercise_keyword_breaks() {
        let blocks = scan("Intro text.\n2.1. Exercise one\nDo it.");
        assert!(blocks[1].is_page_break());
        assert_eq!(heading(&blocks[2]).level, 2);
    }

    #[test]
    fn test_explicit_page_breaks_are_kept() {
        let blocks = scan("a\n[PB]\n[PAGEBREAK]\nb");
        assert_eq!(blocks.len(), 4);
        assert!(blocks[1].is_page_break() && blocks[2].is_page_break());
    }

    #[test]
    fn test_empty_callout_gets_empty_paragraph() {
        let blocks = scan_continuous(":::tip\n\n:::");
        match &blocks[0] {
            Block::Callout(c) => {
                assert_eq!(c.body.len(), 1);
                assert!(matches!(&c.body[0], Block::Paragraph(p) if p.is_empty()));
                assert_eq!(c.title.as_ref().map(|t| t.plain_text()).as_deref(), Some("Tip"));
            }
            other => panic!("expected callout, got {:?}", other),
        }
    }

    #[test]
    fn test_dash_rule() {
        let blocks = scan("-----\n- item");
        assert_eq!(blocks[0], Block::HorizontalRule);
        assert!(matches!(blocks[1], Block::List(_)));
    }
}

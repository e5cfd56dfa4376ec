//! Integration tests for note scanning.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use handout::model::{Alignment, Block, CalloutKind, Outline, TableOfContents};
use handout::parser::{PageRasterizer, PaginationPolicy};
use handout::{parse_str, parse_str_with_options, Error, ParseOptions};

fn continuous() -> ParseOptions {
    ParseOptions::new().with_pagination(PaginationPolicy::continuous())
}

#[test]
fn test_anchor_keys_unique_across_callouts() {
    let text = "1. Intro\nx\n[NOTE title=\"Intro\"]\n1. Intro\n[/NOTE]\n2. Intro\ny";
    let doc = parse_str(text).unwrap();

    let keys: Vec<&str> = doc.anchors().iter().map(|a| a.key.as_str()).collect();
    assert_eq!(keys, vec!["1-intro", "intro", "1-intro-2", "2-intro"]);

    let toc = TableOfContents::from_document(&doc, 3);
    let toc_keys: Vec<&str> = toc.entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(toc_keys, vec!["1-intro", "2-intro"]);

    let outline = Outline::from_document(&doc, 3);
    assert_eq!(outline.total_items(), 2);
}

#[test]
fn test_heading_levels_and_outline_tree() {
    let doc = parse_str_with_options(
        "1. Sets\n1.1. Union\n1.1.1. Laws\n1.2 Intersection\n2. Relations",
        continuous(),
    )
    .unwrap();

    let levels: Vec<u8> = doc.headings().iter().map(|h| h.level).collect();
    assert_eq!(levels, vec![1, 2, 3, 2, 1]);

    let outline = Outline::from_document(&doc, 3);
    assert_eq!(outline.items.len(), 2);
    assert_eq!(outline.items[0].children.len(), 2);
    assert_eq!(outline.items[0].children[0].children[0].key, "1-1-1-laws");

    // Depth 2 folds level 3 into level 2.
    let toc = TableOfContents::from_document(&doc, 2);
    assert_eq!(toc.entries[2].level, 1);
}

#[test]
fn test_top_level_headings_break_pages() {
    let doc = parse_str("1. One\na\n2. Two\nb\n2.1. Exercise\nc").unwrap();
    assert_eq!(doc.stats().page_breaks, 2);
    assert!(!doc.blocks[0].is_page_break());

    let doc = parse_str_with_options("1. One\na\n2. Two\nb", continuous()).unwrap();
    assert_eq!(doc.stats().page_breaks, 0);
}

#[test]
fn test_custom_break_keywords() {
    let policy = PaginationPolicy::continuous().with_break_keywords(["Lab"]);
    let options = ParseOptions::new().with_pagination(policy);
    let doc = parse_str_with_options("intro\n1.1. lab work\nx", options).unwrap();
    assert!(doc.blocks[1].is_page_break());
}

#[test]
fn test_table_block() {
    let doc = parse_str(":::table\n| Name | Size |\n| :--- | ---: |\n| a | 1 |\n| b | 22 |\n:::")
        .unwrap();
    match &doc.blocks[0] {
        Block::Table(t) => {
            assert_eq!(t.row_count(), 3);
            assert_eq!(t.column_count(), 2);
            assert_eq!(t.alignment(0), Some(Alignment::Left));
            assert_eq!(t.alignment(1), Some(Alignment::Right));
            assert_eq!(t.rows[2].cells[1].plain_text(), "22");
        }
        other => panic!("expected table, got {:?}", other),
    }
}

#[test]
fn test_fenced_callout_kinds() {
    let doc = parse_str_with_options(
        ":::def\nA set.\n:::\n:::warn Careful\nx\n:::\n:::custom\ny\n:::",
        continuous(),
    )
    .unwrap();

    let callouts: Vec<_> = doc
        .blocks
        .iter()
        .filter_map(|b| match b {
            Block::Callout(c) => Some(c),
            _ => None,
        })
        .collect();
    assert_eq!(callouts.len(), 3);
    assert_eq!(
        callouts[0].title.as_ref().map(|t| t.plain_text()).as_deref(),
        Some("Definition")
    );
    assert_eq!(callouts[1].kind, CalloutKind::Warning);
    assert_eq!(
        callouts[1].title.as_ref().map(|t| t.plain_text()).as_deref(),
        Some("Careful")
    );
    assert_eq!(callouts[2].kind, CalloutKind::Info);
    assert_eq!(
        callouts[2].title.as_ref().map(|t| t.plain_text()).as_deref(),
        Some("CUSTOM")
    );
    assert_eq!(doc.stats().callouts, 3);
}

#[test]
fn test_unclosed_fence_runs_to_end() {
    let doc = parse_str("```\nline one\n\nline three").unwrap();
    match doc.blocks.last() {
        Some(Block::CodeBlock(code)) => {
            assert_eq!(code.title, "Code");
            assert_eq!(code.plain_lines(), vec!["line one", "", "line three"]);
        }
        other => panic!("expected code block, got {:?}", other),
    }
}

#[test]
fn test_strict_header_rejects_unknown_keys() {
    let result = parse_str_with_options("[DOC title=x colour=red]\nbody", ParseOptions::new().strict());
    assert!(matches!(result, Err(Error::UnknownHeaderKeys(_))));

    let doc = parse_str("[DOC title=x colour=red]\nbody").unwrap();
    assert_eq!(doc.metadata.title.as_deref(), Some("x"));
}

#[test]
fn test_figure_without_source_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let options = continuous().with_search_dir(dir.path());
    let doc = parse_str_with_options("[FIG file=\"missing.pdf\" page=1]", options).unwrap();
    assert!(doc.is_empty());
}

#[test]
fn test_figure_resolved_without_rasterizer() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("deck.pdf"), b"%PDF-1.4").unwrap();

    let options = ParseOptions::new().with_search_dir(dir.path());
    let doc = parse_str_with_options("[FIG file=\"deck.pdf\" page=3]", options).unwrap();

    assert_eq!(doc.blocks[0], Block::ReserveSpace { points: 260.0 });
    match &doc.blocks[1] {
        Block::Figure(f) => {
            assert_eq!(f.page, 3);
            assert!(f.image.is_none());
            assert_eq!(f.caption.plain_text(), "Source: deck.pdf, p. 3");
        }
        other => panic!("expected figure, got {:?}", other),
    }
}

struct CountingRasterizer {
    calls: AtomicUsize,
}

impl PageRasterizer for CountingRasterizer {
    fn rasterize(&self, _source: &Path, _page: u32, _zoom: f32, target: &Path) -> handout::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        fs::write(target, b"png")?;
        Ok(())
    }
}

#[test]
fn test_figure_cache_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("deck.pdf"), b"%PDF-1.4").unwrap();
    let cache = dir.path().join("cache");

    let rasterizer = Arc::new(CountingRasterizer {
        calls: AtomicUsize::new(0),
    });
    let options = ParseOptions::new()
        .with_search_dir(dir.path())
        .with_cache_dir(&cache)
        .with_rasterizer(rasterizer.clone());

    let text = "[FIG file=\"deck.pdf\" page=4 caption=\"Joins\"]";
    for _ in 0..2 {
        let doc = parse_str_with_options(text, options.clone()).unwrap();
        match &doc.blocks[1] {
            Block::Figure(f) => {
                assert_eq!(f.image.as_deref(), Some(cache.join("deck").join("p004_z2.png").as_path()));
                assert_eq!(f.caption.plain_text(), "Joins");
            }
            other => panic!("expected figure, got {:?}", other),
        }
    }
    assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 1);
}

//! Integration tests for rendering parsed notes.

use handout::render::{self, FORM_FEED};
use handout::{parse_str, Handout, JsonFormat, PageBreakStyle, RenderOptions};

const NOTE: &str = "[DOC title=\"Sets\" footer_center=me]
1. Intro
A *set* is a collection.
2. Laws
:::warn De Morgan
Complements swap unions and intersections.
:::";

#[test]
fn test_markdown_layout_order() {
    let doc = parse_str(NOTE).unwrap();
    let md = render::to_markdown(&doc, &RenderOptions::default()).unwrap();

    assert!(md.starts_with("# Sets\n\n---\n\n"));
    let toc = md.find("<a id=\"toc\"></a>\n## Contents").unwrap();
    let intro = md.find("<a id=\"1-intro\"></a>\n## 1. Intro").unwrap();
    let laws = md.find("## 2. Laws").unwrap();
    assert!(toc < intro && intro < laws);

    assert!(md.contains("- [1. Intro](#1-intro)\n- [2. Laws](#2-laws)"));
    // One break after the TOC, one before the second chapter.
    assert_eq!(md.matches("page-break-after").count(), 2);
}

#[test]
fn test_markdown_callout_blockquote() {
    let doc = parse_str(NOTE).unwrap();
    let md = render::to_markdown(&doc, &RenderOptions::new().with_toc(false)).unwrap();

    assert!(md.contains(
        "> <a id=\"de-morgan\"></a>\n> **De Morgan**\n>\n> Complements swap unions and intersections."
    ));
    assert!(!md.contains("Contents"));
}

#[test]
fn test_markdown_footers_link_to_toc() {
    let doc = parse_str(NOTE).unwrap();
    let md = render::to_markdown(&doc, &RenderOptions::new().with_footers(true)).unwrap();

    assert!(md.contains("<sub>[me · Page 1](#toc)</sub>"));
    assert!(md.ends_with("<sub>[me · Page 3](#toc)</sub>"));

    let md = render::to_markdown(
        &doc,
        &RenderOptions::new().with_footers(true).with_toc(false),
    )
    .unwrap();
    assert!(md.ends_with("<sub>me · Page 2</sub>"));
}

#[test]
fn test_markdown_page_break_rule() {
    let doc = parse_str("a\n[PB]\nb").unwrap();
    let options = RenderOptions::new()
        .with_toc(false)
        .with_title_block(false)
        .with_page_break(PageBreakStyle::Rule);
    let md = render::to_markdown(&doc, &options).unwrap();
    assert_eq!(md, "a\n\n---\n\nb");
}

#[test]
fn test_frontmatter() {
    let md = Handout::new()
        .with_frontmatter()
        .parse_str("[DOC title=\"Sets\" author=\"Ana\"]\nx")
        .unwrap()
        .to_markdown()
        .unwrap();
    assert!(md.starts_with("---\ntitle: \"Sets\"\nauthor: \"Ana\"\n---\n"));
}

#[test]
fn test_text_has_form_feeds() {
    let doc = parse_str(NOTE).unwrap();
    let text = render::to_text(&doc, &RenderOptions::default()).unwrap();

    assert!(text.starts_with("Sets\n"));
    assert_eq!(text.matches(FORM_FEED).count(), 2);
    assert!(text.contains("| [WARNING] De Morgan\n| Complements swap unions and intersections."));
    assert!(text.contains("A set is a collection."));
}

#[test]
fn test_json_document() {
    let doc = parse_str(NOTE).unwrap();
    let json = render::to_json(&doc, JsonFormat::Compact).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["metadata"]["title"], "Sets");
    assert_eq!(value["metadata"]["footer_center"], "me");
    let types: Vec<&str> = value["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|b| b["type"].as_str())
        .collect();
    assert_eq!(types.first(), Some(&"heading"));
    assert!(types.contains(&"callout"));
}

#[test]
fn test_toc_depth_override() {
    let doc = parse_str("1. A\n1.1. B\n1.1.1. C").unwrap();
    let options = RenderOptions::new().with_title_block(false).with_toc_max_level(1);
    let md = render::to_markdown(&doc, &options).unwrap();
    assert!(md.contains("- [1. A](#1-a)\n- [1.1. B](#1-1-b)\n- [1.1.1. C](#1-1-1-c)\n"));
}

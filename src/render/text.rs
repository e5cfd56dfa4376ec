//! Plain text rendering for handouts.
//!
//! Page breaks become form feeds, so the output can be piped to `pr` or a
//! printer as is.

use crate::error::Result;
use crate::model::{Block, Callout, Document, Paragraph, TableOfContents};

use super::assemble::assemble;
use super::decorations::PageDecorations;
use super::RenderOptions;

/// Form feed written at every page break.
pub const FORM_FEED: char = '\u{000C}';

const RULE_WIDTH: usize = 40;
const FOOTER_COLUMN_SEPARATOR: &str = "  |  ";

/// Convert a document to plain text.
pub fn to_text(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = TextRenderer::new(options.clone());
    renderer.render(doc)
}

/// Plain text renderer.
pub struct TextRenderer {
    options: RenderOptions,
    page: u32,
    footers: Option<PageDecorations>,
}

impl TextRenderer {
    /// Create a new text renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            page: 1,
            footers: None,
        }
    }

    /// Render a document to plain text.
    pub fn render(mut self, doc: &Document) -> Result<String> {
        let assembly = assemble(doc, &self.options);
        if self.options.footers && !assembly.decorations.is_empty() {
            self.footers = Some(assembly.decorations.clone());
        }

        let mut output = String::new();
        for block in &assembly.title_block {
            self.render_block(&mut output, block, "");
        }
        if let Some(ref toc) = assembly.toc {
            render_toc(&mut output, toc);
            if assembly.breaks_after_toc() {
                self.render_page_break(&mut output);
            }
        }
        for block in assembly.body {
            self.render_block(&mut output, block, "");
        }

        let mut output = output.trim_end_matches('\n').to_string();
        if let Some(footer) = self.footer_line() {
            output.push_str("\n\n");
            output.push_str(&footer);
        }
        Ok(output.trim_start_matches('\n').to_string())
    }

    fn render_block(&mut self, output: &mut String, block: &Block, indent: &str) {
        match block {
            Block::Paragraph(p) => push_paragraph(output, p, indent),
            Block::Heading(h) => {
                push_lines(output, &h.text, indent);
                output.push('\n');
            }
            Block::List(l) => {
                for (i, item) in l.items.iter().enumerate() {
                    let marker = if l.ordered {
                        format!("{}. ", i + 1)
                    } else {
                        format!("{} ", self.options.list_marker)
                    };
                    output.push_str(indent);
                    output.push_str(&marker);
                    output.push_str(&item.plain_text());
                    output.push('\n');
                }
                output.push('\n');
            }
            Block::Table(t) => {
                for row in &t.rows {
                    let cells: Vec<String> = row.cells.iter().map(|c| c.plain_text()).collect();
                    output.push_str(indent);
                    output.push_str(&cells.join(" | "));
                    output.push('\n');
                }
                output.push('\n');
            }
            Block::CodeBlock(c) => {
                push_lines(output, &format!("{}:", c.title), indent);
                for line in c.plain_lines() {
                    output.push_str(indent);
                    output.push_str("    ");
                    output.push_str(&line);
                    output.push('\n');
                }
                output.push('\n');
            }
            Block::Callout(c) => self.render_callout(output, c, indent),
            Block::Figure(f) => {
                let label = format!("[Figure: {}, p. {}]", f.source, f.page);
                push_lines(output, &label, indent);
                push_paragraph(output, &f.caption, indent);
            }
            Block::PageBreak => self.render_page_break(output),
            Block::ReserveSpace { .. } => {}
            Block::HorizontalRule => {
                output.push_str(indent);
                output.push_str(&"-".repeat(RULE_WIDTH));
                output.push_str("\n\n");
            }
        }
    }

    fn render_callout(&mut self, output: &mut String, callout: &Callout, indent: &str) {
        let inner_indent = format!("{}| ", indent);
        let kind = callout.kind.as_str().to_uppercase();
        let heading = match callout.title {
            Some(ref title) => format!("[{}] {}", kind, title.plain_text()),
            None => format!("[{}]", kind),
        };
        push_lines(output, &heading, &inner_indent);
        for block in &callout.body {
            self.render_block(output, block, &inner_indent);
        }
        // Drop the blank line left by the last body block so the box closes.
        if output.ends_with("\n\n") {
            output.pop();
        }
        output.push('\n');
    }

    fn render_page_break(&mut self, output: &mut String) {
        // Keep earlier form feeds: only blank lines are trimmed.
        let trimmed_len = output.trim_end_matches('\n').len();
        output.truncate(trimmed_len);
        if let Some(footer) = self.footer_line() {
            output.push_str("\n\n");
            output.push_str(&footer);
        }
        output.push('\n');
        output.push(FORM_FEED);
        output.push('\n');
        self.page += 1;
    }

    fn footer_line(&self) -> Option<String> {
        let footer = self.footers.as_ref()?.footer(self.page);
        (!footer.is_empty()).then(|| footer.to_line(FOOTER_COLUMN_SEPARATOR))
    }
}

fn push_paragraph(output: &mut String, para: &Paragraph, indent: &str) {
    if para.is_empty() {
        return;
    }
    push_lines(output, &para.plain_text(), indent);
    output.push('\n');
}

fn push_lines(output: &mut String, text: &str, indent: &str) {
    for line in text.lines() {
        output.push_str(indent);
        output.push_str(line);
        output.push('\n');
    }
}

fn render_toc(output: &mut String, toc: &TableOfContents) {
    output.push_str(&toc.title);
    output.push_str("\n\n");
    for entry in &toc.entries {
        output.push_str(&"  ".repeat(entry.level as usize));
        output.push_str(&entry.text);
        output.push('\n');
    }
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CalloutKind, Metadata};

    fn bare(blocks: Vec<Block>) -> Document {
        let meta = Metadata {
            include_title_block: false,
            include_toc: false,
            ..Metadata::default()
        };
        Document::with_blocks(meta, blocks)
    }

    fn para(text: &str) -> Block {
        Block::Paragraph(Paragraph::with_text(text))
    }

    #[test]
    fn test_to_text() {
        let doc = bare(vec![para("Hello, world!"), para("Second paragraph.")]);
        let result = to_text(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(result, "Hello, world!\n\nSecond paragraph.");
    }

    #[test]
    fn test_page_break_is_form_feed() {
        let doc = bare(vec![para("a"), Block::PageBreak, para("b")]);
        let result = to_text(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(result, "a\n\u{000C}\nb");
    }

    #[test]
    fn test_running_footers() {
        let mut doc = bare(vec![para("a"), Block::PageBreak, para("b")]);
        doc.metadata.footer_center = Some("me@uni".into());
        let result = to_text(&doc, &RenderOptions::new().with_footers(true)).unwrap();
        assert_eq!(
            result,
            "a\n\nme@uni  |  Page 1\n\u{000C}\nb\n\nme@uni  |  Page 2"
        );
    }

    #[test]
    fn test_consecutive_breaks_keep_empty_page() {
        let doc = bare(vec![para("a"), Block::PageBreak, Block::PageBreak, para("b")]);
        let result = to_text(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(result, "a\n\u{000C}\n\u{000C}\nb");
    }

    #[test]
    fn test_callout_box() {
        let doc = bare(vec![Block::Callout(Callout {
            kind: CalloutKind::Warning,
            title: Some(Paragraph::with_text("Careful")),
            body: vec![para("Nulls propagate.")],
            anchor: None,
        })]);
        let result = to_text(&doc, &RenderOptions::default()).unwrap();
        assert_eq!(result, "| [WARNING] Careful\n| Nulls propagate.");
    }

    #[test]
    fn test_title_block_and_toc() {
        let doc = crate::parser::NoteParser::from_text("[DOC title=\"Sets\"]\n1. Intro\nx")
            .parse()
            .unwrap();
        let result = to_text(&doc, &RenderOptions::default()).unwrap();
        assert!(result.starts_with("Sets\n\n----"));
        assert!(result.contains("Contents\n\n1. Intro\n"));
        assert!(result.contains('\u{000C}'));
    }
}

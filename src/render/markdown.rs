//! Markdown rendering for handouts.

use std::path::Path;

use crate::error::Result;
use crate::model::{
    Alignment, Block, Callout, CodeBlock, Document, Figure, Heading, List, Paragraph,
    ParagraphRole, Table, TableOfContents, TextRun, TextStyle, TOC_KEY,
};

use super::assemble::assemble;
use super::decorations::{PageDecorations, FOOTER_SEPARATOR};
use super::{PageBreakStyle, RenderOptions};

const PAGE_BREAK_DIV: &str = "<div style=\"page-break-after: always\"></div>";

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Markdown renderer.
///
/// Headings are shifted down one level so the document title is the only
/// `#` heading.
pub struct MarkdownRenderer {
    options: RenderOptions,
    page: u32,
    footers: Option<PageDecorations>,
    toc_link: bool,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            page: 1,
            footers: None,
            toc_link: false,
        }
    }

    /// Render a document to Markdown.
    pub fn render(mut self, doc: &Document) -> Result<String> {
        let assembly = assemble(doc, &self.options);
        let mut output = String::new();

        if self.options.include_frontmatter {
            output.push_str(&doc.metadata.to_yaml_frontmatter());
        }

        if self.options.footers && !assembly.decorations.is_empty() {
            self.footers = Some(assembly.decorations.clone());
        }
        self.toc_link = assembly.toc.is_some() && assembly.decorations.link_to_toc;

        for block in &assembly.title_block {
            self.render_block(&mut output, block);
        }
        if let Some(ref toc) = assembly.toc {
            self.render_toc(&mut output, toc);
            if assembly.breaks_after_toc() {
                self.render_page_break(&mut output);
            }
        }
        for block in assembly.body {
            self.render_block(&mut output, block);
        }
        self.render_footer(&mut output);

        Ok(output.trim().to_string())
    }

    fn render_block(&mut self, output: &mut String, block: &Block) {
        match block {
            Block::Paragraph(p) => self.render_paragraph(output, p),
            Block::Heading(h) => self.render_heading(output, h),
            Block::List(l) => self.render_list(output, l),
            Block::Table(t) => self.render_table(output, t),
            Block::CodeBlock(c) => self.render_code_block(output, c),
            Block::Callout(c) => self.render_callout(output, c),
            Block::Figure(f) => self.render_figure(output, f),
            Block::PageBreak => self.render_page_break(output),
            Block::ReserveSpace { .. } => {}
            Block::HorizontalRule => output.push_str("---\n\n"),
        }
    }

    fn render_anchor(&self, output: &mut String, key: &str) {
        if self.options.emit_anchors {
            output.push_str(&format!("<a id=\"{}\"></a>\n", key));
        }
    }

    fn render_heading(&self, output: &mut String, heading: &Heading) {
        self.render_anchor(output, &heading.anchor.key);
        let level = (heading.level as usize + 1).min(6);
        output.push_str(&"#".repeat(level));
        output.push(' ');
        self.render_runs(output, &heading.content.content);
        output.push_str("\n\n");
    }

    fn render_paragraph(&self, output: &mut String, para: &Paragraph) {
        if para.is_empty() {
            return;
        }
        let mut text = String::new();
        self.render_runs(&mut text, &para.content);

        match para.role {
            ParagraphRole::Title => output.push_str(&format!("# {}", text)),
            ParagraphRole::Subtitle => output.push_str(&format!("**{}**", text)),
            ParagraphRole::Meta | ParagraphRole::Caption => {
                output.push_str(&format!("*{}*", text))
            }
            ParagraphRole::Body => output.push_str(&text),
        }
        output.push_str("\n\n");
    }

    fn render_list(&self, output: &mut String, list: &List) {
        for (i, item) in list.items.iter().enumerate() {
            if list.ordered {
                output.push_str(&format!("{}. ", i + 1));
            } else {
                output.push(self.options.list_marker);
                output.push(' ');
            }
            self.render_runs(output, &item.content);
            output.push('\n');
        }
        output.push('\n');
    }

    fn render_runs(&self, output: &mut String, runs: &[TextRun]) {
        for run in runs {
            self.render_text_run(output, run);
        }
    }

    fn render_text_run(&self, output: &mut String, run: &TextRun) {
        let text = if run.style.code {
            code_span(&run.text)
        } else if self.options.escape_special_chars {
            escape_markdown(&run.text)
        } else {
            run.text.clone()
        };

        output.push_str(&apply_text_style(&text, &run.style));
    }

    fn render_table(&self, output: &mut String, table: &Table) {
        let col_count = table.column_count();
        if table.is_empty() || col_count == 0 {
            return;
        }

        for (i, row) in table.rows.iter().enumerate() {
            output.push('|');
            for cell in &row.cells {
                let mut content = String::new();
                self.render_runs(&mut content, &cell.content.content);
                output.push_str(&format!(" {} |", content.trim()));
            }
            output.push('\n');

            // Separator after the header (or after the first row if there is none)
            if i + 1 == usize::from(table.header_rows.max(1)) {
                output.push('|');
                for col in 0..col_count {
                    let marker = match table.alignment(col) {
                        Some(Alignment::Left) => " :--- |",
                        Some(Alignment::Center) => " :---: |",
                        Some(Alignment::Right) => " ---: |",
                        None => " --- |",
                    };
                    output.push_str(marker);
                }
                output.push('\n');
            }
        }

        output.push('\n');
    }

    fn render_code_block(&self, output: &mut String, code: &CodeBlock) {
        let lines = code.plain_lines();
        let fence = if lines.iter().any(|l| l.contains("```")) {
            "````"
        } else {
            "```"
        };

        output.push_str(&format!("<!-- {} -->\n", code.title));
        output.push_str(fence);
        output.push_str(code.language.as_deref().unwrap_or(""));
        output.push('\n');
        for line in &lines {
            output.push_str(line);
            output.push('\n');
        }
        output.push_str(fence);
        output.push_str("\n\n");
    }

    fn render_callout(&mut self, output: &mut String, callout: &Callout) {
        let mut inner = String::new();
        if let Some(ref anchor) = callout.anchor {
            self.render_anchor(&mut inner, &anchor.key);
        }
        if let Some(ref title) = callout.title {
            let mut text = String::new();
            self.render_runs(&mut text, &title.content);
            inner.push_str(&format!("**{}**\n\n", text));
        }
        for block in &callout.body {
            self.render_block(&mut inner, block);
        }

        for line in inner.trim_end().lines() {
            if line.is_empty() {
                output.push_str(">\n");
            } else {
                output.push_str("> ");
                output.push_str(line);
                output.push('\n');
            }
        }
        output.push('\n');
    }

    fn render_figure(&self, output: &mut String, figure: &Figure) {
        let caption = figure.caption.plain_text();
        match figure.image {
            Some(ref image) => {
                let path = relative_path(image, self.options.image_base.as_deref());
                output.push_str(&format!("![{}]({})\n\n", escape_markdown(&caption), path));
            }
            None => {
                // Not rasterized: link the source page instead.
                let path = relative_path(&figure.path, self.options.image_base.as_deref());
                output.push_str(&format!(
                    "[{}, p. {}]({}#page={})\n\n",
                    escape_markdown(&figure.source),
                    figure.page,
                    path,
                    figure.page
                ));
            }
        }
        self.render_paragraph(output, &figure.caption);
    }

    fn render_toc(&self, output: &mut String, toc: &TableOfContents) {
        self.render_anchor(output, TOC_KEY);
        output.push_str(&format!("## {}\n\n", escape_markdown(&toc.title)));
        for entry in &toc.entries {
            output.push_str(&"  ".repeat(entry.level as usize));
            output.push_str(&format!(
                "{} [{}](#{})\n",
                self.options.list_marker,
                escape_markdown(&entry.text),
                entry.key
            ));
        }
        output.push('\n');
    }

    fn render_page_break(&mut self, output: &mut String) {
        self.render_footer(output);
        self.page += 1;
        match self.options.page_break {
            PageBreakStyle::Html => {
                output.push_str(PAGE_BREAK_DIV);
                output.push_str("\n\n");
            }
            PageBreakStyle::Rule => output.push_str("---\n\n"),
            PageBreakStyle::Omit => {}
        }
    }

    fn render_footer(&self, output: &mut String) {
        let Some(ref decorations) = self.footers else {
            return;
        };
        let line = decorations.footer(self.page).to_line(FOOTER_SEPARATOR);
        if line.is_empty() {
            return;
        }
        let line = escape_markdown(&line);
        if self.toc_link {
            output.push_str(&format!("<sub>[{}](#{})</sub>\n\n", line, TOC_KEY));
        } else {
            output.push_str(&format!("<sub>{}</sub>\n\n", line));
        }
    }
}

fn apply_text_style(text: &str, style: &TextStyle) -> String {
    let mut result = text.to_string();
    if style.italic {
        result = format!("*{}*", result);
    }
    if style.bold {
        result = format!("**{}**", result);
    }
    result
}

fn code_span(text: &str) -> String {
    if text.contains('`') {
        format!("`` {} ``", text)
    } else {
        format!("`{}`", text)
    }
}

fn relative_path(path: &Path, base: Option<&Path>) -> String {
    let path = base
        .and_then(|base| path.strip_prefix(base).ok())
        .unwrap_or(path);
    path.display().to_string().replace('\\', "/")
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' | '<' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

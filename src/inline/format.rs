//! Inline span formatting.
//!
//! `**bold**`, `*italic*` and `` `code` `` spans become styled runs, which
//! render to the small rich-text dialect the layout engine accepts
//! (`<b>`, `<i>`, `<font face="Courier">`, XML entities). The parser also
//! reads that dialect back, so formatting already-formatted text is a no-op.

use crate::model::{TextRun, TextStyle};

use super::sanitize::{collapse_whitespace, decode_entity, escape_markup, normalize_unicode, unescape_markup};

const BOLD_OPEN: &str = "<b>";
const BOLD_CLOSE: &str = "</b>";
const ITALIC_OPEN: &str = "<i>";
const ITALIC_CLOSE: &str = "</i>";
const CODE_OPEN: &str = "<font face=\"Courier\">";
const CODE_CLOSE: &str = "</font>";

/// Format one line of source text into rich-text markup.
///
/// Applies Unicode normalization, inline spans and escaping. Whitespace is
/// left as is; see [`sanitize_para`] for paragraph text.
pub fn format_inline(text: &str) -> String {
    render_markup(&parse_inline(&normalize_unicode(text)))
}

/// Sanitize paragraph-level text: [`format_inline`] plus whitespace
/// collapsing and trimming.
pub fn sanitize_para(text: &str) -> String {
    collapse_whitespace(&format_inline(text))
}

/// Sanitize one line of a code block.
///
/// Tabs expand to four spaces, then every space becomes `&nbsp;` so the
/// layout engine keeps the indentation.
pub fn sanitize_code_line(line: &str) -> String {
    let expanded = line.trim_end_matches(['\n', '\r']).replace('\t', "    ");
    escape_markup(&normalize_unicode(&expanded)).replace(' ', "&nbsp;")
}

/// Parse inline spans and markup tags into styled runs.
///
/// Adjacent runs with the same style are merged and empty runs dropped.
pub fn parse_inline(text: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    parse_into(text, TextStyle::default(), &mut runs);
    merge_runs(runs)
}

/// Render runs to escaped rich-text markup.
pub fn render_markup(runs: &[TextRun]) -> String {
    let mut out = String::new();
    for run in runs {
        let mut text = escape_markup(&run.text);
        if run.style.code {
            text = format!("{CODE_OPEN}{text}{CODE_CLOSE}");
        } else {
            // Leftover markers must not pair up when the markup is parsed again.
            text = text.replace('*', "&#42;").replace('`', "&#96;");
        }
        if run.style.italic {
            text = format!("{ITALIC_OPEN}{text}{ITALIC_CLOSE}");
        }
        if run.style.bold {
            text = format!("{BOLD_OPEN}{text}{BOLD_CLOSE}");
        }
        out.push_str(&text);
    }
    out
}

/// Plain text of a line produced by [`sanitize_code_line`].
pub fn code_line_to_plain(line: &str) -> String {
    unescape_markup(line).replace('\u{00A0}', " ")
}

/// Plain text of a markup string (tags dropped, entities decoded).
pub fn markup_to_plain(markup: &str) -> String {
    parse_inline(markup).into_iter().map(|run| run.text).collect()
}

fn parse_into(text: &str, style: TextStyle, runs: &mut Vec<TextRun>) {
    let mut plain = String::new();
    let mut prev: Option<char> = None;
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some((inner, after)) = enclosed(rest, BOLD_OPEN, BOLD_CLOSE) {
                flush(&mut plain, style, runs);
                parse_into(inner, TextStyle { bold: true, ..style }, runs);
                rest = after;
                prev = Some('>');
                continue;
            }
            if let Some((inner, after)) = enclosed(rest, ITALIC_OPEN, ITALIC_CLOSE) {
                flush(&mut plain, style, runs);
                parse_into(inner, TextStyle { italic: true, ..style }, runs);
                rest = after;
                prev = Some('>');
                continue;
            }
            if let Some((inner, after)) = enclosed(rest, CODE_OPEN, CODE_CLOSE) {
                flush(&mut plain, style, runs);
                push_run(unescape_markup(inner), TextStyle { code: true, ..style }, runs);
                rest = after;
                prev = Some('>');
                continue;
            }
        }

        if c == '&' {
            if let Some((decoded, len)) = decode_entity(rest) {
                plain.push(decoded);
                rest = &rest[len..];
                prev = Some(decoded);
                continue;
            }
        }

        if c == '`' {
            if let Some((inner, after)) = enclosed(rest, "`", "`") {
                if !inner.is_empty() {
                    flush(&mut plain, style, runs);
                    push_run(inner.to_string(), TextStyle { code: true, ..style }, runs);
                    rest = after;
                    prev = Some('`');
                    continue;
                }
            }
        }

        if c == '*' {
            if rest.starts_with("**") {
                if let Some((inner, after)) = bold_span(rest) {
                    flush(&mut plain, style, runs);
                    parse_into(inner, TextStyle { bold: true, ..style }, runs);
                    rest = after;
                    prev = Some('*');
                    continue;
                }
            } else if prev != Some('*') {
                if let Some((inner, after)) = italic_span(rest) {
                    flush(&mut plain, style, runs);
                    parse_into(inner, TextStyle { italic: true, ..style }, runs);
                    rest = after;
                    prev = Some('*');
                    continue;
                }
            }
        }

        plain.push(c);
        prev = Some(c);
        rest = &rest[c.len_utf8()..];
    }

    flush(&mut plain, style, runs);
}

/// Split `text` into the content between `open` and the first `close`, and
/// the remainder after `close`.
fn enclosed<'t>(text: &'t str, open: &str, close: &str) -> Option<(&'t str, &'t str)> {
    let body = text.strip_prefix(open)?;
    let end = body.find(close)?;
    Some((&body[..end], &body[end + close.len()..]))
}

/// `**x**` with at least one character of content, shortest match.
fn bold_span(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix("**")?;
    let first = body.chars().next()?.len_utf8();
    let end = first + body[first..].find("**")?;
    Some((&body[..end], &body[end + 2..]))
}

/// `*x*` where neither delimiter touches another `*`.
fn italic_span(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix('*')?;
    if body.starts_with('*') {
        return None;
    }
    let first = body.chars().next()?.len_utf8();
    let bytes = body.as_bytes();
    let mut i = first;
    while i < bytes.len() {
        if bytes[i] == b'*' && bytes[i - 1] != b'*' && bytes.get(i + 1) != Some(&b'*') {
            return Some((&body[..i], &body[i + 1..]));
        }
        i += 1;
    }
    None
}

fn flush(plain: &mut String, style: TextStyle, runs: &mut Vec<TextRun>) {
    if !plain.is_empty() {
        push_run(std::mem::take(plain), style, runs);
    }
}

fn push_run(text: String, style: TextStyle, runs: &mut Vec<TextRun>) {
    if !text.is_empty() {
        runs.push(TextRun::styled(text, style));
    }
}

fn merge_runs(runs: Vec<TextRun>) -> Vec<TextRun> {
    let mut merged: Vec<TextRun> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(last) if last.style == run.style => last.text.push_str(&run.text),
            _ => merged.push(run),
        }
    }
    merged
}

//! `[DOC key="value" ...]` document header.
//!
//! The first non-blank line of a note may carry document settings. The
//! line is removed from the body before scanning.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::model::Metadata;

static DOC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[DOC(?P<body>.*)\]\s*$").unwrap());

static INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+$").unwrap());

/// Keys understood in a `[DOC]` header.
pub const ALLOWED_KEYS: [&str; 18] = [
    "out",
    "title",
    "subtitle",
    "meta_line",
    "include_title_block",
    "include_toc",
    "toc_title",
    "toc_max_level",
    "footer_left",
    "footer_center",
    "footer_right",
    "footer_show_page",
    "footer_link_to_toc",
    "author",
    "subject",
    "keywords",
    "system",
    "contacto",
];

/// Deepest TOC level a header may ask for.
const MAX_TOC_LEVEL: i64 = 6;

/// A scalar header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    /// `true` / `false` (any case)
    Bool(bool),
    /// Optionally negative integer
    Int(i64),
    /// Anything else
    Text(String),
}

impl HeaderValue {
    /// Parse a raw (already unquoted) value.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        match s.to_lowercase().as_str() {
            "true" => return HeaderValue::Bool(true),
            "false" => return HeaderValue::Bool(false),
            _ => {}
        }
        if INT_RE.is_match(s) {
            if let Ok(n) = s.parse() {
                return HeaderValue::Int(n);
            }
        }
        HeaderValue::Text(s.to_string())
    }

    /// Truthiness: `false`, `0` and empty text are false.
    pub fn truthy(&self) -> bool {
        match self {
            HeaderValue::Bool(b) => *b,
            HeaderValue::Int(n) => *n != 0,
            HeaderValue::Text(s) => !s.is_empty(),
        }
    }

    /// Non-empty text of a text or integer value.
    pub fn text(&self) -> Option<String> {
        match self {
            HeaderValue::Text(s) if !s.is_empty() => Some(s.clone()),
            HeaderValue::Int(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Bool(b) => write!(f, "{}", b),
            HeaderValue::Int(n) => write!(f, "{}", n),
            HeaderValue::Text(s) => f.write_str(s),
        }
    }
}

/// Parsed `[DOC]` header values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocHeader {
    values: BTreeMap<String, HeaderValue>,
}

impl DocHeader {
    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.values.get(key)
    }

    /// Check if the header set no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All key/value pairs, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys that are not in [`ALLOWED_KEYS`], sorted.
    pub fn unknown_keys(&self) -> Vec<String> {
        self.values
            .keys()
            .filter(|k| !ALLOWED_KEYS.contains(&k.as_str()))
            .cloned()
            .collect()
    }

    fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(HeaderValue::text)
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).map(HeaderValue::truthy)
    }

    /// Copy header settings into `meta`. Missing keys leave it untouched.
    pub fn apply(&self, meta: &mut Metadata) {
        if let Some(title) = self.text("title") {
            meta.title = Some(title);
        }
        if let Some(HeaderValue::Text(s)) = self.get("subtitle") {
            meta.subtitle = Some(s.clone());
        }
        if let Some(HeaderValue::Text(s)) = self.get("meta_line") {
            meta.meta_line = Some(s.clone());
        }
        if let Some(out) = self.text("out") {
            meta.output = Some(out);
        }
        if let Some(b) = self.flag("include_title_block") {
            meta.include_title_block = b;
        }
        if let Some(b) = self.flag("include_toc") {
            meta.include_toc = b;
        }
        if let Some(title) = self.text("toc_title") {
            meta.toc_title = title;
        }
        if let Some(HeaderValue::Int(n)) = self.get("toc_max_level") {
            meta.toc_max_level = (*n).clamp(1, MAX_TOC_LEVEL) as u8;
        }
        if let Some(left) = self.text("footer_left").or_else(|| self.text("system")) {
            meta.footer_left = Some(left);
        }
        if let Some(center) = self.text("footer_center").or_else(|| self.text("contacto")) {
            meta.footer_center = Some(center);
        }
        if let Some(right) = self.text("footer_right") {
            meta.footer_right = Some(right);
        }
        if let Some(b) = self.flag("footer_show_page") {
            meta.footer_show_page = b;
        }
        if let Some(b) = self.flag("footer_link_to_toc") {
            meta.footer_link_to_toc = b;
        }
        if let Some(author) = self.text("author") {
            meta.author = Some(author);
        }
        if let Some(subject) = self.text("subject") {
            meta.subject = Some(subject);
        }
        if let Some(keywords) = self.text("keywords") {
            meta.keywords = Some(keywords);
        }
    }
}

/// Split a note into its `[DOC]` header and the remaining body.
///
/// Only the first non-blank line is considered. Without a header the body
/// is the input unchanged. Fails only on unbalanced quotes.
pub fn split_header(text: &str) -> Result<(DocHeader, String)> {
    let lines: Vec<&str> = text.lines().collect();
    let Some(index) = lines.iter().position(|line| !line.trim().is_empty()) else {
        return Ok((DocHeader::default(), text.to_string()));
    };
    let Some(caps) = DOC_RE.captures(lines[index].trim()) else {
        return Ok((DocHeader::default(), text.to_string()));
    };

    let mut header = DocHeader::default();
    for token in split_words(caps["body"].trim())? {
        if let Some((key, value)) = token.split_once('=') {
            header
                .values
                .insert(key.trim().to_string(), HeaderValue::parse(value));
        }
    }

    let body = lines
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, line)| *line)
        .collect::<Vec<_>>()
        .join("\n");

    Ok((header, body))
}

/// Split on whitespace with POSIX shell quoting rules.
fn split_words(input: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(Error::InvalidHeader("no closing quotation".into())),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\' | '$' | '`')) => current.push(ch),
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => {
                                return Err(Error::InvalidHeader("no closing quotation".into()))
                            }
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(Error::InvalidHeader("no closing quotation".into())),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(ch) => current.push(ch),
                    None => return Err(Error::InvalidHeader("no escaped character".into())),
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_header() {
        let (header, body) = split_header("1. Intro\ntext").unwrap();
        assert!(header.is_empty());
        assert_eq!(body, "1. Intro\ntext");
    }

    #[test]
    fn test_header_removed_from_body() {
        let text = "\n[DOC title=\"Relational Algebra\" toc_max_level=2 include_toc=false]\n1. Intro";
        let (header, body) = split_header(text).unwrap();
        assert_eq!(
            header.get("title"),
            Some(&HeaderValue::Text("Relational Algebra".into()))
        );
        assert_eq!(header.get("toc_max_level"), Some(&HeaderValue::Int(2)));
        assert_eq!(header.get("include_toc"), Some(&HeaderValue::Bool(false)));
        assert_eq!(body, "\n1. Intro");
    }

    #[test]
    fn test_header_only_on_first_content_line() {
        let (header, body) = split_header("intro\n[DOC title=x]").unwrap();
        assert!(header.is_empty());
        assert_eq!(body, "intro\n[DOC title=x]");
    }

    #[test]
    fn test_scalar_parsing() {
        assert_eq!(HeaderValue::parse("TRUE"), HeaderValue::Bool(true));
        assert_eq!(HeaderValue::parse("-12"), HeaderValue::Int(-12));
        assert_eq!(HeaderValue::parse("1.5"), HeaderValue::Text("1.5".into()));
        assert_eq!(HeaderValue::parse(" x "), HeaderValue::Text("x".into()));
        assert!(!HeaderValue::parse("0").truthy());
        assert!(!HeaderValue::parse("").truthy());
    }

    #[test]
    fn test_shell_quoting() {
        assert_eq!(
            split_words(r#"a="b c" d='e "f"' g=h\ i j="k\"l""#).unwrap(),
            vec!["a=b c", "d=e \"f\"", "g=h i", "j=k\"l"]
        );
        assert!(split_words(r#"a="open"#).is_err());
        assert!(matches!(
            split_header("[DOC title=\"x]"),
            Err(Error::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_unknown_keys_and_tokens_without_equals() {
        let (header, _) = split_header("[DOC colour=red title=T stray font=x]").unwrap();
        assert_eq!(header.unknown_keys(), vec!["colour", "font"]);
        assert!(header.get("stray").is_none());
    }

    #[test]
    fn test_apply_to_metadata() {
        let (header, _) = split_header(
            r#"[DOC title="Notes" system="DB course" contacto="me@uni" footer_show_page=false toc_max_level=99 out="x/y.md"]"#,
        )
        .unwrap();
        let mut meta = Metadata::with_title("stem");
        header.apply(&mut meta);

        assert_eq!(meta.title.as_deref(), Some("Notes"));
        assert_eq!(meta.footer_left.as_deref(), Some("DB course"));
        assert_eq!(meta.footer_center.as_deref(), Some("me@uni"));
        assert!(!meta.footer_show_page);
        assert_eq!(meta.toc_max_level, 6);
        assert_eq!(meta.output.as_deref(), Some("x/y.md"));
        assert!(meta.include_toc);
    }

    #[test]
    fn test_footer_keys_win_over_legacy() {
        let (header, _) = split_header("[DOC footer_left=A system=B]").unwrap();
        let mut meta = Metadata::default();
        header.apply(&mut meta);
        assert_eq!(meta.footer_left.as_deref(), Some("A"));
    }
}

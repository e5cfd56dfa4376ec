//! Unicode cleanup for the core PDF fonts.
//!
//! The layout engine renders with the standard Helvetica/Courier faces,
//! which lack most symbols that show up in course notes. Everything goes
//! through [`normalize_unicode`] before it reaches a paragraph.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Zero-width joiner, variation selectors and zero-width space.
const INVISIBLE: [char; 4] = ['\u{200D}', '\u{FE0F}', '\u{FE0E}', '\u{200B}'];

/// Emoji followed by the word it stands for collapse to the word alone.
const PHRASES: [(&str, &str); 3] = [
    ("\u{1F7E2} OK", "OK"),   // 🟢 OK
    ("\u{1F7E1} WARN", "WARN"), // 🟡 WARN
    ("\u{1F534} CRIT", "CRIT"), // 🔴 CRIT
];

/// Curated glyphs with a textual meaning. Applied before the emoji ranges
/// are stripped, since several of them live inside those ranges.
const GLYPHS: [(&str, &str); 10] = [
    ("\u{1F7E2}", "OK"),   // 🟢
    ("\u{1F7E1}", "WARN"), // 🟡
    ("\u{1F534}", "CRIT"), // 🔴
    ("\u{2705}", "OK"),    // ✅
    ("\u{274C}", "NO"),    // ❌
    ("\u{26A0}", "WARN"),  // ⚠
    ("\u{2139}", "INFO"),  // ℹ
    ("\u{1F4A1}", "TIP"),  // 💡
    ("\u{2713}", "OK"),    // ✓
    ("\u{2717}", "NO"),    // ✗
];

/// Symbols the core fonts cannot draw, with ASCII stand-ins.
const SYMBOLS: [(&str, &str); 22] = [
    ("\u{25B7}\u{25C1}", "JOIN"), // ▷◁
    ("\u{2295}", " XOR "),        // ⊕
    ("\u{2194}", "<->"),          // ↔
    ("\u{2248}", "~="),           // ≈
    ("\u{00B1}", "+/-"),          // ±
    ("\u{2019}", "'"),
    ("\u{201C}", "\""),
    ("\u{201D}", "\""),
    ("\u{2192}", "->"),  // →
    ("\u{21E0}", "->>"), // ⇠
    ("\u{21A3}", "->>"), // ↣
    ("\u{21A6}", "|->"), // ↦
    ("\u{21D2}", "=>"),  // ⇒
    ("\u{21D4}", "<=>"), // ⇔
    ("\u{222A}", " U "), // ∪
    ("\u{2014}", "-"),
    ("\u{2013}", "-"),
    ("\u{2011}", "-"),
    ("\u{00A0}", " "),
    ("\u{22C8}", "JOIN"), // ⋈
    ("\u{2A1D}", "JOIN"), // ⨝
    ("\u{00F7}", "DIV"),  // ÷
];

/// Remaining pictographs and dingbats are dropped.
static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{1F300}-\x{1FAFF}\x{2600}-\x{27BF}]").unwrap()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize text for the core fonts.
///
/// NFKC, invisible-character removal, curated glyph/emoji substitution,
/// emoji stripping, then the symbol table. Deletions all happen before the
/// symbol table and a final NFKC pass recomposes anything they split, so
/// the function is idempotent.
pub fn normalize_unicode(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| !INVISIBLE.contains(c)).collect();
    let mut out: String = cleaned.nfkc().collect();

    for (from, to) in PHRASES.iter().chain(GLYPHS.iter()) {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }

    if EMOJI_RE.is_match(&out) {
        out = EMOJI_RE.replace_all(&out, "").into_owned();
    }

    for (from, to) in SYMBOLS.iter() {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }

    out.nfkc().collect()
}

/// Collapse whitespace runs to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Sanitize a string for plain-text contexts (footers, metadata).
///
/// No XML escaping is applied.
pub fn sanitize_plain(text: &str) -> String {
    collapse_whitespace(&normalize_unicode(text))
}

/// Escape text for the rich-text markup understood by the layout engine.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode the entity at the start of `text`, returning the character and
/// the number of bytes consumed.
pub(crate) fn decode_entity(text: &str) -> Option<(char, usize)> {
    let body = text.strip_prefix('&')?;
    let semi = body.char_indices().take(10).find(|(_, c)| *c == ';')?.0;
    let name = &body[..semi];

    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        _ => {
            let code = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)?
        }
    };

    Some((c, semi + 2))
}

/// Decode every entity in `text`; unknown sequences are kept literally.
pub(crate) fn unescape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if c == '&' {
            if let Some((decoded, len)) = decode_entity(rest) {
                out.push(decoded);
                rest = &rest[len..];
                continue;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_substitution() {
        assert_eq!(normalize_unicode("a → b"), "a -> b");
        assert_eq!(normalize_unicode("A ∪ B"), "A  U  B");
        assert_eq!(normalize_unicode("R ⋈ S"), "R JOIN S");
        assert_eq!(normalize_unicode("x ± 1"), "x +/- 1");
        assert_eq!(normalize_unicode("p ⊕ q"), "p  XOR  q");
    }

    #[test]
    fn test_checkmarks_and_emoji() {
        assert_eq!(normalize_unicode("✓ done, ✗ failed"), "OK done, NO failed");
        assert_eq!(normalize_unicode("🟢 OK"), "OK");
        assert_eq!(normalize_unicode("⚠\u{FE0F} careful"), "WARN careful");
        assert_eq!(normalize_unicode("party 🎉 time"), "party  time");
    }

    #[test]
    fn test_invisible_characters_removed() {
        assert_eq!(normalize_unicode("zero\u{200B}width"), "zerowidth");
    }

    #[test]
    fn test_compatibility_normalization() {
        assert_eq!(normalize_unicode("ﬁle"), "file");
        assert_eq!(normalize_unicode("x²"), "x2");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = ["▷🎉◁", "🟢🟢 OK", "e🎉\u{0301}", "a → b ⇔ c", "plain"];
        for input in inputs {
            let once = normalize_unicode(input);
            assert_eq!(normalize_unicode(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_sanitize_plain() {
        assert_eq!(sanitize_plain("  Computer   Architecture → 2024 "), "Computer Architecture -> 2024");
        assert_eq!(sanitize_plain("a < b & c"), "a < b & c");
    }

    #[test]
    fn test_escape_and_decode() {
        assert_eq!(escape_markup("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(decode_entity("&amp;rest"), Some(('&', 5)));
        assert_eq!(decode_entity("&#65;"), Some(('A', 5)));
        assert_eq!(decode_entity("&#x41;"), Some(('A', 6)));
        assert_eq!(decode_entity("&bogus;"), None);
        assert_eq!(decode_entity("& alone"), None);
        assert_eq!(unescape_markup("x&nbsp;&lt;y&gt; &unknown;"), "x\u{00A0}<y> &unknown;");
    }
}

//! Inline formatter and sanitizer.
//!
//! Every string that ends up in the document passes through here:
//! [`sanitize_para`] for rich text, [`sanitize_code_line`] for code block
//! lines and [`sanitize_plain`] for plain-text contexts such as footers.

mod format;
mod sanitize;

pub use format::{
    code_line_to_plain, format_inline, markup_to_plain, parse_inline, render_markup,
    sanitize_code_line, sanitize_para,
};
pub use sanitize::{collapse_whitespace, escape_markup, normalize_unicode, sanitize_plain};

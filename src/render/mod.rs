//! Rendering module for converting handouts to various output formats.

mod assemble;
mod decorations;
mod json;
mod markdown;
mod options;
mod text;

pub use assemble::{assemble, Assembly};
pub use decorations::{Footer, PageDecorations, FOOTER_SEPARATOR};
pub use json::{navigation_to_json, to_json, JsonFormat};
pub use markdown::{to_markdown, MarkdownRenderer};
pub use options::{PageBreakStyle, RenderOptions};
pub use text::{to_text, TextRenderer, FORM_FEED};

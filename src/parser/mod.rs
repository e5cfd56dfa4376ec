//! Note parsing module.
//!
//! [`NoteParser`] splits off the `[DOC]` header and runs the [`Scanner`]
//! over the body. Blocks are built through a [`BlockFactory`], figures are
//! located with a [`SourceResolver`] and rasterized by an optional
//! [`PageRasterizer`].

mod anchors;
mod factory;
mod figure;
mod header;
mod markers;
mod note_parser;
mod options;
mod pagination;
mod scanner;
mod table;

pub use anchors::{slugify, AnchorRegistry, FALLBACK_SLUG};
pub use factory::{BlockFactory, DefaultFactory};
pub use figure::{
    cache_path, default_caption, PageRasterizer, PdftoppmRasterizer, SearchPathResolver,
    SourceResolver,
};
pub use header::{split_header, DocHeader, HeaderValue, ALLOWED_KEYS};
pub use markers::{classify, FigureMarker, Line, NumberedHeading, Opener};
pub use note_parser::NoteParser;
pub use options::{HeaderMode, Labels, ParseOptions};
pub use pagination::{PaginationPolicy, Story};
pub use scanner::{ScanContext, Scanner};
pub use table::{parse_pipe_table, PipeTable};

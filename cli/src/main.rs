//! handout CLI - turn plain-text course notes into handouts

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use handout::build::{self, BuildOptions, OutputFormat};
use handout::parser::{PdftoppmRasterizer, SearchPathResolver};
use handout::{
    parse_file_with_options, Document, JsonFormat, PageBreakStyle, ParseOptions, RenderOptions,
    TableOfContents,
};

#[derive(Parser)]
#[command(name = "handout")]
#[command(author = "handout contributors")]
#[command(version)]
#[command(about = "Turn plain-text course notes into structured handouts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every command that parses notes.
#[derive(clap::Args)]
struct NoteArgs {
    /// Fail on unknown [DOC] header keys
    #[arg(long)]
    strict: bool,

    /// Extra directories searched for figure sources
    #[arg(
        long = "search-dir",
        value_name = "DIR",
        env = "HANDOUT_SEARCH_PATH",
        value_delimiter = ','
    )]
    search_dirs: Vec<PathBuf>,

    /// Directory for rasterized figure pages
    #[arg(long, value_name = "DIR", env = "HANDOUT_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Rasterize figure pages with pdftoppm
    #[arg(long)]
    rasterize: bool,
}

impl NoteArgs {
    /// Options for parsing `input`: its own directory is searched for
    /// figure sources before the extra search dirs.
    fn parse_options(&self, input: &Path) -> ParseOptions {
        let note_dir = input
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        log::debug!(
            "figure sources for {}: {} then {:?}",
            input.display(),
            note_dir.display(),
            self.search_dirs
        );
        let resolver = SearchPathResolver::new([note_dir]);
        let resolver = self
            .search_dirs
            .iter()
            .fold(resolver, |resolver, dir| resolver.with_dir(dir));

        let mut options = self.base_options().with_resolver(Arc::new(resolver));
        if let Some(ref dir) = self.cache_dir {
            options = options.with_cache_dir(dir);
        }
        options
    }

    /// Options every note shares, whatever its directory.
    fn base_options(&self) -> ParseOptions {
        let mut options = ParseOptions::new();
        if self.strict {
            options = options.strict();
        }
        if self.rasterize {
            options = options.with_rasterizer(Arc::new(PdftoppmRasterizer::new()));
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a note file or every note in a directory
    Build {
        /// Note file or directory of notes
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", env = "HANDOUT_OUTPUT_DIR")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "markdown")]
        format: Format,

        /// Remove earlier outputs of the same format first
        #[arg(long)]
        clean: bool,

        /// Write running footers
        #[arg(long)]
        footers: bool,

        #[command(flatten)]
        notes: NoteArgs,
    },

    /// Convert a note to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input note file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Include YAML frontmatter
        #[arg(long)]
        frontmatter: bool,

        /// Leave out the table of contents
        #[arg(long)]
        no_toc: bool,

        /// Deepest heading level in the table of contents (1-6)
        #[arg(long)]
        toc_depth: Option<u8>,

        /// How page breaks are written
        #[arg(long, value_enum, default_value = "html")]
        page_break: BreakMode,

        /// Write running footers
        #[arg(long)]
        footers: bool,

        #[command(flatten)]
        notes: NoteArgs,
    },

    /// Convert a note to plain text
    Text {
        /// Input note file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write running footers
        #[arg(long)]
        footers: bool,

        #[command(flatten)]
        notes: NoteArgs,
    },

    /// Convert a note to JSON
    Json {
        /// Input note file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        notes: NoteArgs,
    },

    /// Print the table of contents of a note
    Toc {
        /// Input note file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print TOC and outline as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show document information
    Info {
        /// Input note file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Markdown (.md)
    Markdown,
    /// Plain text (.txt)
    Text,
    /// JSON (.json)
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Markdown => OutputFormat::Markdown,
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum BreakMode {
    /// HTML div with page-break-after
    Html,
    /// Horizontal rule
    Rule,
    /// Nothing
    Omit,
}

impl From<BreakMode> for PageBreakStyle {
    fn from(mode: BreakMode) -> Self {
        match mode {
            BreakMode::Html => PageBreakStyle::Html,
            BreakMode::Rule => PageBreakStyle::Rule,
            BreakMode::Omit => PageBreakStyle::Omit,
        }
    }
}

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Build {
            input,
            output,
            format,
            clean,
            footers,
            notes,
        }) => cmd_build(&input, output.as_deref(), format, clean, footers, &notes),
        Some(Commands::Markdown {
            input,
            output,
            frontmatter,
            no_toc,
            toc_depth,
            page_break,
            footers,
            notes,
        }) => {
            let mut render_options = RenderOptions::new()
                .with_frontmatter(frontmatter)
                .with_page_break(page_break.into())
                .with_footers(footers);
            if no_toc {
                render_options = render_options.with_toc(false);
            }
            if let Some(depth) = toc_depth {
                render_options = render_options.with_toc_max_level(depth);
            }
            cmd_markdown(&input, output.as_deref(), &render_options, &notes)
        }
        Some(Commands::Text {
            input,
            output,
            footers,
            notes,
        }) => cmd_text(&input, output.as_deref(), footers, &notes),
        Some(Commands::Json {
            input,
            output,
            compact,
            notes,
        }) => cmd_json(&input, output.as_deref(), compact, &notes),
        Some(Commands::Toc { input, json }) => cmd_toc(&input, json),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: handout build <INPUT> [-o DIR]".yellow());
            println!("       handout --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_build(
    input: &Path,
    output: Option<&Path>,
    format: Format,
    clean: bool,
    footers: bool,
    notes: &NoteArgs,
) -> CmdResult {
    let (notes_list, input_dir) = if input.is_dir() {
        (build::collect_notes(input)?, input.to_path_buf())
    } else {
        let dir = input.parent().map(Path::to_path_buf).unwrap_or_default();
        (vec![input.to_path_buf()], dir)
    };

    if notes_list.is_empty() {
        println!("{} no notes in {}", "Nothing to do:".yellow(), input.display());
        return Ok(());
    }

    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input_dir.join("handouts"));

    let mut options = BuildOptions::new(&output_dir)
        .with_format(format.into())
        .with_parse_options(notes.base_options())
        .with_render_options(RenderOptions::new().with_footers(footers))
        .with_clean(clean);
    for dir in &notes.search_dirs {
        options = options.with_search_dir(dir);
    }
    if let Some(ref dir) = notes.cache_dir {
        options = options.with_cache_root(dir);
    }

    log::info!(
        "building {} note(s) into {} as {}",
        notes_list.len(),
        output_dir.display(),
        options.format
    );
    build::prepare_output_dir(&options, &notes_list)?;

    let pb = ProgressBar::new(notes_list.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = build::build_files(&notes_list, &options, |outcome| {
        let name = outcome
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Err(ref e) = outcome.result {
            pb.println(format!("{} {}: {}", "Failed".red(), name, e));
        }
        pb.set_message(name);
        pb.inc(1);
    });
    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    let built: Vec<_> = report.succeeded().collect();
    for (i, outcome) in built.iter().enumerate() {
        let branch = if i + 1 == built.len() { "└─" } else { "├─" };
        if let Ok(ref out) = outcome.result {
            println!("  {} {}", branch.dimmed(), out.output.display());
        }
    }

    let failed = report.failed().count();
    if failed > 0 {
        return Err(format!("{} of {} notes failed", failed, report.len()).into());
    }

    Ok(())
}

fn write_or_print(output: Option<&Path>, content: &str) -> CmdResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    render_options: &RenderOptions,
    notes: &NoteArgs,
) -> CmdResult {
    let doc = parse_file_with_options(input, notes.parse_options(input))?;
    let markdown = handout::render::to_markdown(&doc, render_options)?;
    write_or_print(output, &markdown)
}

fn cmd_text(input: &Path, output: Option<&Path>, footers: bool, notes: &NoteArgs) -> CmdResult {
    let doc = parse_file_with_options(input, notes.parse_options(input))?;
    let render_options = RenderOptions::new().with_footers(footers);
    let text = handout::render::to_text(&doc, &render_options)?;
    write_or_print(output, &text)
}

fn cmd_json(input: &Path, output: Option<&Path>, compact: bool, notes: &NoteArgs) -> CmdResult {
    let doc = parse_file_with_options(input, notes.parse_options(input))?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = handout::render::to_json(&doc, format)?;
    write_or_print(output, &json)
}

fn cmd_toc(input: &Path, json: bool) -> CmdResult {
    let doc = handout::parse_file(input)?;

    if json {
        println!(
            "{}",
            handout::render::navigation_to_json(&doc, JsonFormat::Pretty)?
        );
        return Ok(());
    }

    let toc = TableOfContents::from_document(&doc, doc.metadata.toc_max_level);
    println!("{}", toc.title.cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for entry in &toc.entries {
        println!(
            "{}{}  {}",
            "  ".repeat(entry.level as usize),
            entry.text,
            format!("#{}", entry.key).dimmed()
        );
    }

    Ok(())
}

fn cmd_info(input: &Path) -> CmdResult {
    let doc = handout::parse_file(input)?;
    print_info(input, &doc);
    Ok(())
}

fn print_info(input: &Path, doc: &Document) {
    let meta = &doc.metadata;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Title".bold(), meta.display_title());
    if let Some(ref subtitle) = meta.subtitle {
        println!("{}: {}", "Subtitle".bold(), subtitle);
    }
    if let Some(ref author) = meta.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref subject) = meta.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref out) = meta.output {
        println!("{}: {}", "Output".bold(), out);
    }
    println!(
        "{}: {}",
        "Contents".bold(),
        if meta.include_toc {
            format!("yes, {} levels", meta.toc_max_level)
        } else {
            "no".to_string()
        }
    );

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let stats = doc.stats();
    let words = doc.plain_text().split_whitespace().count();

    println!("{}: {}", "Words".bold(), words);
    println!("{}: {}", "Headings".bold(), stats.headings);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraphs);
    println!("{}: {}", "Lists".bold(), stats.lists);
    println!("{}: {}", "Tables".bold(), stats.tables);
    println!("{}: {}", "Code blocks".bold(), stats.code_blocks);
    println!("{}: {}", "Callouts".bold(), stats.callouts);
    println!("{}: {}", "Figures".bold(), stats.figures);
    println!("{}: {}", "Pages".bold(), stats.page_breaks + 1);
}

fn cmd_version() {
    println!("{} {}", "handout".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Plain-text notes to handouts");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/handout-rs/handout".dimmed()
    );
    println!("License: MIT");
}

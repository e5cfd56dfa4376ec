//! Figure resolution and page rasterization.
//!
//! A `[FIG ...]` marker names a page of an external PDF. The source is
//! located with a [`SourceResolver`], then optionally rasterized into a
//! cache directory by a [`PageRasterizer`].

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};
use crate::inline::sanitize_para;
use crate::model::{Figure, Paragraph, ParagraphRole};

use super::markers::FigureMarker;
use super::options::ParseOptions;

/// Locates external figure sources by name.
///
/// Always returns a path; when nothing matches, the best guess is returned
/// and the caller checks whether it exists.
pub trait SourceResolver: Send + Sync {
    /// Resolve a source name to a path.
    fn resolve(&self, name: &str) -> PathBuf;
}

impl<F> SourceResolver for F
where
    F: Fn(&str) -> PathBuf + Send + Sync,
{
    fn resolve(&self, name: &str) -> PathBuf {
        self(name)
    }
}

/// Looks a name up in a list of directories, first hit wins.
#[derive(Debug, Clone, Default)]
pub struct SearchPathResolver {
    dirs: Vec<PathBuf>,
}

impl SearchPathResolver {
    /// Create a resolver over `dirs`, searched in order.
    pub fn new<P: Into<PathBuf>>(dirs: impl IntoIterator<Item = P>) -> Self {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a directory to search last.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    /// Directories searched, in order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl SourceResolver for SearchPathResolver {
    fn resolve(&self, name: &str) -> PathBuf {
        let direct = Path::new(name);
        if direct.is_absolute() {
            return direct.to_path_buf();
        }
        self.dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
            .or_else(|| self.dirs.first().map(|dir| dir.join(name)))
            .unwrap_or_else(|| direct.to_path_buf())
    }
}

/// Renders one page of a PDF to a PNG file.
pub trait PageRasterizer: Send + Sync {
    /// Rasterize `page` (1-based) of `source` at `zoom` into `target`.
    fn rasterize(&self, source: &Path, page: u32, zoom: f32, target: &Path) -> Result<()>;
}

/// Rasterizer that shells out to poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: PathBuf,
}

impl PdftoppmRasterizer {
    /// Use `pdftoppm` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `pdftoppm` binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self {
            program: PathBuf::from("pdftoppm"),
        }
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, source: &Path, page: u32, zoom: f32, target: &Path) -> Result<()> {
        // pdftoppm appends the extension itself.
        let prefix = target.with_extension("");
        let dpi = (72.0 * zoom).round().max(1.0) as u32;
        let output = Command::new(&self.program)
            .arg("-png")
            .arg("-singlefile")
            .args(["-f", &page.to_string(), "-l", &page.to_string()])
            .args(["-r", &dpi.to_string()])
            .arg(source)
            .arg(&prefix)
            .output()
            .map_err(|e| Error::Rasterize(format!("{}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            return Err(Error::Rasterize(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if !target.is_file() {
            return Err(Error::Rasterize(format!(
                "no image written for page {} of {}",
                page,
                source.display()
            )));
        }
        Ok(())
    }
}

/// Cache location of a rasterized page:
/// `<cache_dir>/<source stem>/p<page:03>_z<zoom>.png`.
pub fn cache_path(cache_dir: &Path, source: &Path, page: u32, zoom: f32) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "figure".to_string());
    cache_dir.join(stem).join(format!("p{:03}_z{}.png", page, zoom))
}

/// Default caption of a figure without one.
pub fn default_caption(template: &str, file: &str, page: u32) -> String {
    template
        .replace("{file}", file)
        .replace("{page}", &page.to_string())
}

/// Resolve a figure marker into a figure.
///
/// Returns `None`, with a warning, when the source is missing and not
/// cached, or rasterization fails. Without a rasterizer the figure is kept without an
/// image (a previously cached page is still picked up).
pub(crate) fn resolve_figure(marker: &FigureMarker, options: &ParseOptions) -> Option<Figure> {
    if marker.page == 0 {
        log::warn!("figure {:?}: page numbers start at 1, skipping", marker.file);
        return None;
    }

    let path = options.resolver.resolve(&marker.file);
    let zoom = marker.zoom.unwrap_or(options.default_zoom);
    let target = options
        .cache_dir
        .as_deref()
        .map(|cache_dir| cache_path(cache_dir, &path, marker.page, zoom));

    let image = match target {
        Some(target) if target.is_file() => {
            log::debug!("figure cache hit: {}", target.display());
            Some(target)
        }
        _ if !path.is_file() => {
            log::warn!(
                "figure source {:?} not found (looked for {}), skipping",
                marker.file,
                path.display()
            );
            return None;
        }
        Some(target) => match options.rasterizer.as_deref() {
            Some(rasterizer) => match rasterize_into(rasterizer, &path, marker.page, zoom, &target) {
                Ok(()) => Some(target),
                Err(e) => {
                    log::warn!(
                        "figure {:?} page {}: {}, skipping",
                        marker.file,
                        marker.page,
                        e
                    );
                    return None;
                }
            },
            None => None,
        },
        None => None,
    };

    let caption = marker
        .caption
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            default_caption(&options.labels.figure_caption, &marker.file, marker.page)
        });

    Some(Figure {
        source: marker.file.clone(),
        path,
        page: marker.page,
        caption: Paragraph::from_markup(&sanitize_para(&caption)).with_role(ParagraphRole::Caption),
        zoom,
        image,
    })
}

fn rasterize_into(
    rasterizer: &dyn PageRasterizer,
    source: &Path,
    page: u32,
    zoom: f32,
    target: &Path,
) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    rasterizer.rasterize(source, page, zoom, target)
}

//! High-level pipeline: turns one project folder into one PDF.
//!
//! The run is strictly sequential:
//!   - collect every file under the folder (minus excluded names and the output itself)
//!   - title page for the project
//!   - per file, by extension: paginate text through [`crate::paginate`] into the
//!     [`PdfBuilder`], or place an image on its own page; other files are skipped
//!   - footer on the last page, document metadata, atomic write of the result
//!
//! # Error Handling
//! Any failing file aborts the whole run with a single [`CompileError`] naming
//! the file and the step; nothing is written in that case.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::collect::{collect_files, CollectError};
use crate::config::CompileConfig;
use crate::contract::{Geometry, LayoutRequest};
use crate::metrics::Helvetica;
use crate::paginate::{paginate_into, PaginateError};
use crate::preprocess::{prepare_text, FileKind, PreprocessError};
use crate::render::{PdfBuilder, RenderError};

/// Outcome of a successful run.
#[derive(Debug, Serialize)]
pub struct CompileReport {
    pub output_path: PathBuf,
    pub page_count: usize,
    pub files: Vec<RenderedFile>,
    /// Files with an extension the tool does not render.
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub kind: FileKind,
    pub pages: usize,
}

#[derive(Debug)]
pub enum CompileError {
    InvalidFolder { path: PathBuf, source: std::io::Error },
    NotADirectory(PathBuf),
    ExcludePattern(regex::Error),
    Collect(CollectError),
    Read { path: PathBuf, source: std::io::Error },
    Preprocess { path: PathBuf, source: PreprocessError },
    Paginate { path: PathBuf, source: PaginateError },
    Render { path: PathBuf, source: RenderError },
    Footer(RenderError),
    Write { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::InvalidFolder { path, source } => {
                write!(f, "cannot open folder {}: {source}", path.display())
            }
            CompileError::NotADirectory(path) => write!(f, "{} is not a directory", path.display()),
            CompileError::ExcludePattern(e) => write!(f, "invalid exclude pattern: {e}"),
            CompileError::Collect(e) => write!(f, "{e}"),
            CompileError::Read { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            CompileError::Preprocess { path, source } => {
                write!(f, "failed to prepare {}: {source}", path.display())
            }
            CompileError::Paginate { path, source } => {
                write!(f, "failed to paginate {}: {source}", path.display())
            }
            CompileError::Render { path, source } => {
                write!(f, "failed to render {}: {source}", path.display())
            }
            CompileError::Footer(e) => write!(f, "failed to draw footer: {e}"),
            CompileError::Write { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::InvalidFolder { source, .. }
            | CompileError::Read { source, .. }
            | CompileError::Write { source, .. } => Some(source),
            CompileError::NotADirectory(_) => None,
            CompileError::ExcludePattern(e) => Some(e),
            CompileError::Collect(e) => Some(e),
            CompileError::Preprocess { source, .. } => Some(source),
            CompileError::Paginate { source, .. } => Some(source),
            CompileError::Render { source, .. } | CompileError::Footer(source) => Some(source),
        }
    }
}

impl From<CollectError> for CompileError {
    fn from(e: CollectError) -> Self {
        CompileError::Collect(e)
    }
}

/// Label drawn above the first page of each file.
pub fn file_label(path: &Path) -> String {
    format!("Content of the file: {}", path.display())
}

/// Compile every renderable file under `folder` into a single PDF.
pub async fn compile_folder(
    folder: &Path,
    config: &CompileConfig,
) -> Result<CompileReport, CompileError> {
    info!(folder = %folder.display(), "[COMPILE] Starting compilation");

    let root = tokio::fs::canonicalize(folder)
        .await
        .map_err(|source| CompileError::InvalidFolder {
            path: folder.to_path_buf(),
            source,
        })?;
    if !root.is_dir() {
        error!(path = %root.display(), "[COMPILE][ERROR] Not a directory");
        return Err(CompileError::NotADirectory(root));
    }
    let project = root
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| root.display().to_string());

    let output_path = absolute(&config.output_for(&root)).map_err(|source| CompileError::Write {
        path: config.output_for(&root),
        source,
    })?;
    let exclude = config
        .exclude_patterns()
        .map_err(CompileError::ExcludePattern)?;
    let files = collect_files(&root, &exclude, Some(output_path.as_path()))?;

    let mut builder = PdfBuilder::new(&project);
    builder.add_title_page(&project);

    let mut rendered = Vec::new();
    let mut skipped = Vec::new();
    for path in files {
        let Some(kind) = FileKind::from_path(&path) else {
            debug!(path = %path.display(), "[COMPILE] Skipping unsupported file type");
            skipped.push(path);
            continue;
        };
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| CompileError::Read {
                path: path.clone(),
                source,
            })?;

        let before = builder.page_count();
        if let Err(e) = render_file(&mut builder, &path, kind, bytes, &config.layout) {
            error!(path = %path.display(), error = %e, "[COMPILE][ERROR] File could not be rendered");
            return Err(e);
        }
        let pages = builder.page_count() - before;
        debug!(path = %path.display(), ?kind, pages, "[COMPILE] Rendered file");
        rendered.push(RenderedFile { path, kind, pages });
    }

    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    builder
        .add_footer(&Helvetica, &date)
        .map_err(CompileError::Footer)?;
    builder.set_metadata(&project);

    let page_count = builder.page_count();
    let bytes = builder.finish();
    write_atomically(&output_path, &bytes).map_err(|source| {
        error!(path = %output_path.display(), error = %source, "[COMPILE][ERROR] Failed to write PDF");
        CompileError::Write {
            path: output_path.clone(),
            source,
        }
    })?;

    info!(
        output = %output_path.display(),
        pages = page_count,
        files = rendered.len(),
        skipped = skipped.len(),
        "[COMPILE] PDF written"
    );
    Ok(CompileReport {
        output_path,
        page_count,
        files: rendered,
        skipped,
    })
}

fn render_file(
    builder: &mut PdfBuilder,
    path: &Path,
    kind: FileKind,
    bytes: Vec<u8>,
    geometry: &Geometry,
) -> Result<(), CompileError> {
    let label = file_label(path);
    if !kind.is_textual() {
        builder
            .add_image_page(&label, &bytes)
            .map_err(|source| CompileError::Render {
                path: path.to_path_buf(),
                source,
            })?;
        return Ok(());
    }

    let content = prepare_text(path, kind, bytes).map_err(|source| CompileError::Preprocess {
        path: path.to_path_buf(),
        source,
    })?;
    let request = LayoutRequest::new(&content, &label, *geometry);
    paginate_into(&request, &Helvetica, builder).map_err(|source| CompileError::Paginate {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Write through a temp file in the target directory, then rename into place.
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

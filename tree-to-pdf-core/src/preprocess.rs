//! Extension dispatch and text preparation ahead of pagination.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

const TAB_WIDTH: usize = 4;

/// How a file is rendered, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileKind {
    /// Source code, paginated as-is
    Code,
    /// Structured data; JSON is pretty-printed first
    Data,
    /// Prose and markup, paginated as-is
    Text,
    /// Raster image, one page per file
    Image,
}

impl FileKind {
    /// `None` for extensions the tool does not render.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "js" | "ts" | "py" | "java" | "c" | "cpp" | "cs" | "php" | "rb" | "go" | "rs" => {
                Some(FileKind::Code)
            }
            "json" | "csv" | "xml" | "yml" | "yaml" => Some(FileKind::Data),
            "txt" | "md" | "html" | "css" => Some(FileKind::Text),
            "jpg" | "jpeg" | "png" | "gif" | "bmp" => Some(FileKind::Image),
            _ => None,
        }
    }

    pub fn is_textual(self) -> bool {
        !matches!(self, FileKind::Image)
    }
}

#[derive(Debug)]
pub enum PreprocessError {
    NotUtf8(std::string::FromUtf8Error),
    Json(serde_json::Error),
}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreprocessError::NotUtf8(e) => write!(f, "file is not valid UTF-8: {e}"),
            PreprocessError::Json(e) => write!(f, "invalid JSON: {e}"),
        }
    }
}

impl std::error::Error for PreprocessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PreprocessError::NotUtf8(e) => Some(e),
            PreprocessError::Json(e) => Some(e),
        }
    }
}

impl From<std::string::FromUtf8Error> for PreprocessError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        PreprocessError::NotUtf8(e)
    }
}

impl From<serde_json::Error> for PreprocessError {
    fn from(e: serde_json::Error) -> Self {
        PreprocessError::Json(e)
    }
}

/// Decode and normalise a textual file into paginator input.
pub fn prepare_text(path: &Path, kind: FileKind, bytes: Vec<u8>) -> Result<String, PreprocessError> {
    let content = String::from_utf8(bytes)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let content = if kind == FileKind::Data && is_json {
        let value: serde_json::Value = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "Pretty-printing JSON");
        serde_json::to_string_pretty(&value)?
    } else {
        content
    };
    Ok(normalise_text(&content))
}

/// Unix line endings, no stray carriage returns, tabs expanded to spaces.
pub fn normalise_text(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut column = 0;
    for ch in content.chars() {
        match ch {
            '\r' => {}
            '\n' => {
                out.push('\n');
                column = 0;
            }
            '\t' => {
                let pad = TAB_WIDTH - column % TAB_WIDTH;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            other => {
                out.push(other);
                column += 1;
            }
        }
    }
    out
}

//! # contract: the seams between the layout engine and its collaborators
//!
//! The paginator only knows about the types in this module. It measures text
//! through [`TextMeasure`] and hands finished page blocks to a [`PageSink`];
//! it never touches a PDF document directly.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`, so tests can script widths or
//!   record emitted blocks without building a real document.

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::metrics::MetricsError;

/// Lowest vertical cursor value a page may reach before it has to be flushed.
pub const MARGIN_FLOOR: f32 = 50.0;

/// Layout parameters for one paginated file, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub font_size: f32,
    pub line_height: f32,
    /// Widest a wrapped line may measure.
    pub max_width: f32,
    /// Starting value of the vertical cursor on each page.
    pub max_height: f32,
    pub margin_floor: f32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            font_size: 8.0,
            line_height: 10.0,
            max_width: 750.0,
            max_height: 520.0,
            margin_floor: MARGIN_FLOOR,
        }
    }
}

/// Everything the paginator needs for one file, except the metrics.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRequest<'a> {
    pub content: &'a str,
    /// Banner drawn above the first block only (e.g. the file path).
    pub label: &'a str,
    pub geometry: Geometry,
}

impl<'a> LayoutRequest<'a> {
    pub fn new(content: &'a str, label: &'a str, geometry: Geometry) -> Self {
        Self {
            content,
            label,
            geometry,
        }
    }
}

/// One page worth of wrapped text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBlock {
    /// Wrapped lines, each terminated by `\n`.
    pub text: String,
    /// Set on the first block emitted for a file, and on no other.
    pub is_first_block: bool,
}

impl PageBlock {
    /// The wrapped lines of this block, without their terminators.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    pub fn line_count(&self) -> usize {
        self.lines().count()
    }
}

/// Measures the rendered width of a string.
///
/// Implementations must agree with the font the renderer draws with, or the
/// wrap decisions will not match what ends up on the page.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait TextMeasure {
    /// Width of `text` at `font_size`, in points.
    fn text_width(&self, text: &str, font_size: f32) -> Result<f32, MetricsError>;
}

/// Error a [`PageSink`] reports when it cannot take a block.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Receives page blocks in emission order and turns each into a page.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait PageSink {
    /// Draw `block` onto a fresh page. `label` is only drawn when
    /// `block.is_first_block` is set.
    fn emit_block(
        &mut self,
        label: &str,
        block: &PageBlock,
        geometry: &Geometry,
    ) -> Result<(), SinkError>;
}

//! Greedy word-wrap and page flushing.
//!
//! Content is split into source lines on `\n`, each source line is wrapped
//! word by word against `max_width`, and wrapped lines accumulate into a page
//! buffer while a vertical cursor walks down from `max_height`. When the next
//! line would take the cursor below `margin_floor`, the buffer is flushed as a
//! [`PageBlock`] and a new page starts.
//!
//! All state lives in the call; two `paginate` calls never share anything.

use std::fmt;

use tracing::debug;

use crate::contract::{Geometry, LayoutRequest, PageBlock, PageSink, SinkError, TextMeasure};
use crate::metrics::MetricsError;

#[derive(Debug)]
pub enum PaginateError {
    /// The geometry cannot hold a single line, so the loop would never make progress.
    DegenerateGeometry { reason: &'static str },
    Metrics(MetricsError),
    Sink(SinkError),
}

impl fmt::Display for PaginateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginateError::DegenerateGeometry { reason } => {
                write!(f, "degenerate page geometry: {reason}")
            }
            PaginateError::Metrics(e) => write!(f, "text measurement failed: {e}"),
            PaginateError::Sink(e) => write!(f, "page emission failed: {e}"),
        }
    }
}

impl std::error::Error for PaginateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaginateError::DegenerateGeometry { .. } => None,
            PaginateError::Metrics(e) => Some(e),
            PaginateError::Sink(e) => Some(&**e),
        }
    }
}

impl From<MetricsError> for PaginateError {
    fn from(e: MetricsError) -> Self {
        PaginateError::Metrics(e)
    }
}

impl From<SinkError> for PaginateError {
    fn from(e: SinkError) -> Self {
        PaginateError::Sink(e)
    }
}

/// Rejects geometries the wrap loop cannot make progress with.
pub fn check_geometry(geometry: &Geometry) -> Result<(), PaginateError> {
    let Geometry {
        font_size,
        line_height,
        max_width,
        max_height,
        margin_floor,
    } = *geometry;
    let degenerate = |reason| Err(PaginateError::DegenerateGeometry { reason });

    if ![font_size, line_height, max_width, max_height, margin_floor]
        .iter()
        .all(|v| v.is_finite())
    {
        return degenerate("layout parameters must be finite");
    }
    if font_size <= 0.0 {
        return degenerate("font size must be positive");
    }
    if max_width <= 0.0 {
        return degenerate("max width must be positive");
    }
    if line_height <= 0.0 {
        return degenerate("line height must be positive");
    }
    if max_height <= margin_floor {
        return degenerate("max height must lie above the margin floor");
    }
    // Stricter than `max_height <= margin_floor`: with no room for one line,
    // the first push would flush an empty block before any content.
    if max_height - line_height < margin_floor {
        return degenerate("no line fits between max height and the margin floor");
    }
    Ok(())
}

/// Paginate `request` and collect the blocks.
pub fn paginate<M>(request: &LayoutRequest<'_>, measure: &M) -> Result<Vec<PageBlock>, PaginateError>
where
    M: TextMeasure + ?Sized,
{
    let mut blocks = Vec::new();
    paginate_with(request, measure, |block| {
        blocks.push(block);
        Ok(())
    })?;
    Ok(blocks)
}

/// Paginate `request` straight into a page sink.
pub fn paginate_into<M, S>(
    request: &LayoutRequest<'_>,
    measure: &M,
    sink: &mut S,
) -> Result<usize, PaginateError>
where
    M: TextMeasure + ?Sized,
    S: PageSink + ?Sized,
{
    paginate_with(request, measure, |block| {
        sink.emit_block(request.label, &block, &request.geometry)
    })
}

/// Paginate `request`, handing each block to `emit` as soon as it is flushed.
/// Returns the number of blocks emitted.
pub fn paginate_with<M, F>(
    request: &LayoutRequest<'_>,
    measure: &M,
    emit: F,
) -> Result<usize, PaginateError>
where
    M: TextMeasure + ?Sized,
    F: FnMut(PageBlock) -> Result<(), SinkError>,
{
    let geometry = &request.geometry;
    check_geometry(geometry)?;

    let mut page = PageCursor::new(geometry, emit);
    for source_line in request.content.split('\n') {
        let mut line = String::new();
        for word in source_line.split(' ') {
            let candidate = join_word(&line, word);
            let width = measure.text_width(&candidate, geometry.font_size)?;
            // An overlong first word still closes the empty line before it.
            if width > geometry.max_width {
                page.push_line(&line)?;
                line = word.to_string();
            } else {
                line = candidate;
            }
        }
        page.push_line(&line)?;
    }
    let emitted = page.finish()?;

    debug!(
        label = request.label,
        blocks = emitted,
        "Paginated content"
    );
    Ok(emitted)
}

fn join_word(line: &str, word: &str) -> String {
    let mut joined = String::with_capacity(line.len() + word.len() + 1);
    joined.push_str(line);
    joined.push(' ');
    joined.push_str(word);
    joined.trim().to_string()
}

/// Page buffer plus vertical cursor.
struct PageCursor<'g, F> {
    geometry: &'g Geometry,
    y: f32,
    buffer: String,
    is_first: bool,
    emitted: usize,
    emit: F,
}

impl<'g, F> PageCursor<'g, F>
where
    F: FnMut(PageBlock) -> Result<(), SinkError>,
{
    fn new(geometry: &'g Geometry, emit: F) -> Self {
        Self {
            geometry,
            y: geometry.max_height,
            buffer: String::new(),
            is_first: true,
            emitted: 0,
            emit,
        }
    }

    fn push_line(&mut self, line: &str) -> Result<(), PaginateError> {
        if self.y - self.geometry.line_height < self.geometry.margin_floor {
            self.flush()?;
        }
        self.buffer.push_str(line);
        self.buffer.push('\n');
        self.y -= self.geometry.line_height;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PaginateError> {
        let block = PageBlock {
            text: std::mem::take(&mut self.buffer),
            is_first_block: self.is_first,
        };
        (self.emit)(block)?;
        self.emitted += 1;
        self.y = self.geometry.max_height;
        self.is_first = false;
        Ok(())
    }

    fn finish(mut self) -> Result<usize, PaginateError> {
        if !self.buffer.trim().is_empty() {
            self.flush()?;
        }
        Ok(self.emitted)
    }
}

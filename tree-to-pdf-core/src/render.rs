//! printpdf-backed page emission.
//!
//! [`PdfBuilder`] owns the document while it is assembled. Pages are kept as
//! plain operation lists until [`PdfBuilder::finish`] so the footer can still
//! be drawn onto whichever page ends up last.
//!
//! Every page is A4 landscape. Coordinates are PDF points measured from the
//! bottom-left corner, so "from the top" offsets are subtracted from
//! [`PAGE_HEIGHT`].

use std::fmt;

use printpdf::{
    Actions, BorderArray, BuiltinFont, Color, DictItem, Line, LinePoint, LinkAnnotation, Mm, Op,
    PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, RawImage, RawImageData, RawImageFormat, Rect,
    Rgb, TextItem, XObjectTransform,
};
use tracing::{debug, info};

use crate::contract::{Geometry, PageBlock, PageSink, SinkError, TextMeasure};
use crate::metrics::{win_ansi_byte, MetricsError};

pub const PAGE_WIDTH: f32 = 841.89;
pub const PAGE_HEIGHT: f32 = 595.28;
const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;

const LEFT_MARGIN: f32 = 50.0;
const LABEL_FROM_TOP: f32 = 50.0;
const TEXT_FROM_TOP: f32 = 70.0;
const LABEL_SIZE: f32 = 10.0;
/// Baseline-to-baseline distance as a multiple of the font size.
const LEADING: f32 = 1.2;

const TITLE_SIZE: f32 = 36.0;
const TITLE_X: f32 = 300.0;
const TITLE_FROM_TOP: f32 = 200.0;

const MAX_IMAGE_DIMENSION: f32 = 500.0;
const IMAGE_DROP: f32 = 20.0;

const FOOTER_SIZE: f32 = 10.0;
const FOOTER_X: f32 = 50.0;
const FOOTER_Y: f32 = 50.0;
const FOOTER_PADDING_X: f32 = 10.0;
const FOOTER_PADDING_Y: f32 = 2.0;
pub const FOOTER_LINK_TEXT: &str = "All to PDF - Ai Facilitator";
pub const FOOTER_SUFFIX: &str = " command-line tool";
pub const FOOTER_LINK_URI: &str = "https://github.com/HerreraCarlos81/all_to_pdf";

pub const METADATA_AUTHOR: &str = "Created with All to PDF - AI Facilitator";
pub const METADATA_SUBJECT: &str = "PDF generated from project files";

#[derive(Debug)]
pub enum RenderError {
    /// The image bytes could not be decoded.
    Image(String),
    /// The footer needs a page to sit on.
    NoPages,
    Metrics(MetricsError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Image(desc) => write!(f, "image could not be decoded: {desc}"),
            RenderError::NoPages => write!(f, "document has no pages"),
            RenderError::Metrics(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<MetricsError> for RenderError {
    fn from(e: MetricsError) -> Self {
        RenderError::Metrics(e)
    }
}

/// Where an image lands on its page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ImagePlacement {
    /// Shrink to fit inside a 500pt square (never enlarge), centre
    /// horizontally and sit slightly below the vertical centre.
    pub fn fit(pixel_width: u32, pixel_height: u32) -> Self {
        let (mut width, mut height) = (pixel_width as f32, pixel_height as f32);
        if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
            let scale = MAX_IMAGE_DIMENSION / width.max(height);
            width *= scale;
            height *= scale;
        }
        Self {
            x: (PAGE_WIDTH - width) / 2.0,
            y: (PAGE_HEIGHT - height) / 2.0 - IMAGE_DROP,
            width,
            height,
        }
    }
}

/// Assembles the output PDF page by page.
pub struct PdfBuilder {
    doc: PdfDocument,
    pages: Vec<Vec<Op>>,
}

impl PdfBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            doc: PdfDocument::new(title),
            pages: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Operations of the page at `index`, for inspection.
    pub fn page_ops(&self, index: usize) -> Option<&[Op]> {
        self.pages.get(index).map(Vec::as_slice)
    }

    /// Opening page announcing the project.
    pub fn add_title_page(&mut self, project: &str) {
        let mut ops = Vec::new();
        let heading = ["Compiled PDF".to_string(), String::new(), format!("Project: {project}")];
        write_lines(
            &mut ops,
            TITLE_X,
            PAGE_HEIGHT - TITLE_FROM_TOP,
            TITLE_SIZE,
            heading.iter().map(String::as_str),
        );
        self.pages.push(ops);
    }

    /// One page holding a single image under its label.
    pub fn add_image_page(&mut self, label: &str, bytes: &[u8]) -> Result<ImagePlacement, RenderError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| RenderError::Image(e.to_string()))?
            .to_rgb8();
        let (pixel_width, pixel_height) = decoded.dimensions();
        let placement = ImagePlacement::fit(pixel_width, pixel_height);

        let raw = RawImage {
            pixels: RawImageData::U8(decoded.into_raw()),
            width: pixel_width as usize,
            height: pixel_height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let id = self.doc.add_image(&raw);

        let mut ops = Vec::new();
        write_lines(
            &mut ops,
            LEFT_MARGIN,
            PAGE_HEIGHT - LABEL_FROM_TOP,
            LABEL_SIZE,
            [label],
        );
        // At 72 dpi one pixel is one point, so the scale is the fit ratio.
        ops.push(Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(Pt(placement.x)),
                translate_y: Some(Pt(placement.y)),
                scale_x: Some(placement.width / pixel_width as f32),
                scale_y: Some(placement.height / pixel_height as f32),
                dpi: Some(72.0),
                ..Default::default()
            },
        });
        self.pages.push(ops);

        debug!(
            label,
            pixel_width,
            pixel_height,
            width = placement.width,
            height = placement.height,
            "Added image page"
        );
        Ok(placement)
    }

    /// Credit line in an outlined box at the bottom of the last page.
    pub fn add_footer<M>(&mut self, measure: &M, date: &str) -> Result<(), RenderError>
    where
        M: TextMeasure + ?Sized,
    {
        let lead = format!("PDF of project created on {date} with ");
        let lead_width = measure.text_width(&lead, FOOTER_SIZE)?;
        let link_width = measure.text_width(FOOTER_LINK_TEXT, FOOTER_SIZE)?;

        let page = self.pages.last_mut().ok_or(RenderError::NoPages)?;
        let box_width = PAGE_WIDTH - 2.0 * FOOTER_X;
        let box_height = FOOTER_SIZE * LEADING;
        page.push(Op::SaveGraphicsState);
        page.push(Op::SetOutlineColor { col: rgb(0.0, 0.0, 0.0) });
        page.push(Op::SetOutlineThickness { pt: Pt(1.0) });
        page.push(Op::DrawLine {
            line: polyline(
                &[
                    (FOOTER_X, FOOTER_Y),
                    (FOOTER_X + box_width, FOOTER_Y),
                    (FOOTER_X + box_width, FOOTER_Y + box_height),
                    (FOOTER_X, FOOTER_Y + box_height),
                ],
                true,
            ),
        });

        let text_x = FOOTER_X + FOOTER_PADDING_X;
        let text_y = FOOTER_Y + FOOTER_PADDING_Y;
        let link_x = text_x + lead_width;
        write_lines(page, text_x, text_y, FOOTER_SIZE, [lead.as_str()]);

        page.push(Op::SetFillColor { col: rgb(0.0, 0.0, 1.0) });
        write_lines(page, link_x, text_y, FOOTER_SIZE, [FOOTER_LINK_TEXT]);
        page.push(Op::SetOutlineColor { col: rgb(0.0, 0.0, 1.0) });
        page.push(Op::SetOutlineThickness { pt: Pt(0.5) });
        page.push(Op::DrawLine {
            line: polyline(&[(link_x, text_y - 1.0), (link_x + link_width, text_y - 1.0)], false),
        });

        page.push(Op::LinkAnnotation {
            link: LinkAnnotation::new(
                Rect {
                    x: Pt(link_x),
                    y: Pt(text_y),
                    width: Pt(link_width),
                    height: Pt(FOOTER_SIZE),
                },
                Actions::Uri(FOOTER_LINK_URI.to_string()),
                Some(BorderArray::Solid([0.0, 0.0, 0.0])),
                None,
                None,
            ),
        });

        page.push(Op::SetFillColor { col: rgb(0.0, 0.0, 0.0) });
        write_lines(page, link_x + link_width, text_y, FOOTER_SIZE, [FOOTER_SUFFIX]);
        page.push(Op::RestoreGraphicsState);
        Ok(())
    }

    /// Document information dictionary for the compiled project.
    pub fn set_metadata(&mut self, project: &str) {
        let info = &mut self.doc.metadata.info;
        info.document_title = project.to_string();
        info.author = METADATA_AUTHOR.to_string();
        info.subject = METADATA_SUBJECT.to_string();
        info.keywords = vec![
            project.to_string(),
            "project".to_string(),
            "compilation".to_string(),
            "PDF".to_string(),
        ];
    }

    /// Serialise the document.
    pub fn finish(mut self) -> Vec<u8> {
        let page_count = self.pages.len();
        let pages: Vec<PdfPage> = self
            .pages
            .into_iter()
            .map(|ops| PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), ops))
            .collect();
        // Non-ASCII lines are raw `Tj` operators, which the secure mode drops.
        let options = PdfSaveOptions {
            secure: false,
            ..PdfSaveOptions::default()
        };
        let mut warnings = Vec::new();
        let bytes = self.doc.with_pages(pages).save(&options, &mut warnings);
        info!(
            pages = page_count,
            size = bytes.len(),
            warnings = warnings.len(),
            "Serialised PDF document"
        );
        bytes
    }
}

impl PageSink for PdfBuilder {
    fn emit_block(
        &mut self,
        label: &str,
        block: &PageBlock,
        geometry: &Geometry,
    ) -> Result<(), SinkError> {
        let mut ops = Vec::new();
        if block.is_first_block {
            write_lines(
                &mut ops,
                LEFT_MARGIN,
                PAGE_HEIGHT - LABEL_FROM_TOP,
                LABEL_SIZE,
                [label],
            );
        }
        write_lines(
            &mut ops,
            LEFT_MARGIN,
            PAGE_HEIGHT - TEXT_FROM_TOP,
            geometry.font_size,
            block.lines(),
        );
        self.pages.push(ops);
        Ok(())
    }
}

/// One text section in Helvetica, one line per item, stepping down by the leading.
fn write_lines<'a, I>(ops: &mut Vec<Op>, x: f32, y: f32, size: f32, lines: I)
where
    I: IntoIterator<Item = &'a str>,
{
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point { x: Pt(x), y: Pt(y) },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size),
        font: BuiltinFont::Helvetica,
    });
    ops.push(Op::SetLineHeight { lh: Pt(size * LEADING) });
    for line in lines {
        show_text(ops, line);
        ops.push(Op::AddLineBreak);
    }
    ops.push(Op::EndTextSection);
}

/// Show `text` at the cursor in WinAnsi Helvetica.
///
/// printpdf writes builtin-font strings as UTF-8 bytes, which only matches
/// WinAnsi for ASCII. Other lines are encoded here and shown through a raw
/// `Tj`; the empty builtin write keeps Helvetica registered as a resource.
/// Characters outside WinAnsi are drawn as `?`.
fn show_text(ops: &mut Vec<Op>, text: &str) {
    if text.is_ascii() {
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(text.to_string())],
            font: BuiltinFont::Helvetica,
        });
        return;
    }
    ops.push(Op::WriteTextBuiltinFont {
        items: Vec::new(),
        font: BuiltinFont::Helvetica,
    });
    ops.push(Op::Unknown {
        key: "Tj".to_string(),
        value: vec![DictItem::String {
            data: encode_win_ansi(text),
            literal: false,
        }],
    });
}

fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| win_ansi_byte(ch).unwrap_or(b'?'))
        .collect()
}

fn polyline(points: &[(f32, f32)], is_closed: bool) -> Line {
    Line {
        points: points
            .iter()
            .map(|&(x, y)| LinePoint {
                p: Point { x: Pt(x), y: Pt(y) },
                bezier: false,
            })
            .collect(),
        is_closed,
    }
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Helvetica;

    /// Text shown on a page, one entry per line; raw WinAnsi strings are
    /// decoded back through Latin-1.
    fn written_text(ops: &[Op]) -> Vec<String> {
        ops.iter()
            .filter_map(|op| match op {
                Op::WriteTextBuiltinFont { items, .. } if !items.is_empty() => Some(
                    items
                        .iter()
                        .filter_map(|item| match item {
                            TextItem::Text(t) => Some(t.as_str()),
                            _ => None,
                        })
                        .collect::<String>(),
                ),
                Op::Unknown { key, value } if key == "Tj" => match value.as_slice() {
                    [DictItem::String { data, .. }] => {
                        Some(data.iter().map(|&b| char::from(b)).collect())
                    }
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    fn raw_strings(ops: &[Op]) -> Vec<Vec<u8>> {
        ops.iter()
            .filter_map(|op| match op {
                Op::Unknown { key, value } if key == "Tj" => match value.as_slice() {
                    [DictItem::String { data, .. }] => Some(data.clone()),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    #[test]
    fn label_is_drawn_only_on_first_block() {
        let mut builder = PdfBuilder::new("t");
        let geometry = Geometry::default();
        let first = PageBlock {
            text: "one\ntwo\n".to_string(),
            is_first_block: true,
        };
        let second = PageBlock {
            text: "three\n".to_string(),
            is_first_block: false,
        };
        builder.emit_block("Content of the file: a.rs", &first, &geometry).unwrap();
        builder.emit_block("Content of the file: a.rs", &second, &geometry).unwrap();

        assert_eq!(builder.page_count(), 2);
        assert_eq!(
            written_text(builder.page_ops(0).unwrap()),
            vec!["Content of the file: a.rs", "one", "two"]
        );
        assert_eq!(written_text(builder.page_ops(1).unwrap()), vec!["three"]);
    }

    #[test]
    fn small_images_keep_their_size() {
        let placement = ImagePlacement::fit(100, 50);
        assert_eq!(placement.width, 100.0);
        assert_eq!(placement.height, 50.0);
        assert!((placement.x - (PAGE_WIDTH - 100.0) / 2.0).abs() < 1e-3);
        assert!((placement.y - ((PAGE_HEIGHT - 50.0) / 2.0 - 20.0)).abs() < 1e-3);
    }

    #[test]
    fn large_images_shrink_to_the_longest_side() {
        let placement = ImagePlacement::fit(2000, 1000);
        assert!((placement.width - 500.0).abs() < 1e-3);
        assert!((placement.height - 250.0).abs() < 1e-3);
    }

    #[test]
    fn footer_needs_a_page() {
        let mut builder = PdfBuilder::new("t");
        assert!(matches!(
            builder.add_footer(&Helvetica, "2024-01-01"),
            Err(RenderError::NoPages)
        ));
    }

    #[test]
    fn footer_lands_on_last_page() {
        let mut builder = PdfBuilder::new("t");
        builder.add_title_page("demo");
        builder.add_footer(&Helvetica, "2024-01-01").unwrap();
        let text = written_text(builder.page_ops(0).unwrap());
        assert!(text.contains(&"PDF of project created on 2024-01-01 with ".to_string()));
        assert!(text.contains(&FOOTER_LINK_TEXT.to_string()));
        assert_eq!(builder.page_count(), 1);

        let links: Vec<_> = builder
            .page_ops(0)
            .unwrap()
            .iter()
            .filter_map(|op| match op {
                Op::LinkAnnotation { link } => Some(link),
                _ => None,
            })
            .collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].actions, Actions::Uri(FOOTER_LINK_URI.to_string()));

        let lead = "PDF of project created on 2024-01-01 with ";
        let link_x = FOOTER_X + FOOTER_PADDING_X + Helvetica.text_width(lead, FOOTER_SIZE).unwrap();
        let link_width = Helvetica.text_width(FOOTER_LINK_TEXT, FOOTER_SIZE).unwrap();
        let rect = &links[0].rect;
        assert!((rect.x.0 - link_x).abs() < 1e-3);
        assert!((rect.y.0 - (FOOTER_Y + FOOTER_PADDING_Y)).abs() < 1e-3);
        assert!((rect.width.0 - link_width).abs() < 1e-3);
        assert_eq!(rect.height.0, FOOTER_SIZE);
    }

    #[test]
    fn latin1_lines_are_written_in_win_ansi() {
        let mut builder = PdfBuilder::new("t");
        let block = PageBlock {
            text: "plain\n\u{a9} 2024 \u{2014} caf\u{e9}\n".to_string(),
            is_first_block: false,
        };
        builder.emit_block("l", &block, &Geometry::default()).unwrap();

        let ops = builder.page_ops(0).unwrap();
        assert_eq!(
            raw_strings(ops),
            vec![vec![0xa9, b' ', b'2', b'0', b'2', b'4', b' ', 0x97, b' ', b'c', b'a', b'f', 0xe9]]
        );
        assert_eq!(written_text(ops)[0], "plain");
        assert_eq!(encode_win_ansi("\u{2603}!"), b"?!".to_vec());

        let bytes = builder.finish();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn finished_document_is_a_pdf() {
        let mut builder = PdfBuilder::new("demo");
        builder.add_title_page("demo");
        builder.set_metadata("demo");
        let bytes = builder.finish();
        assert_eq!(&bytes[0..4], b"%PDF");
    }
}

//! PDF canvas adapter – the only module that talks to `printpdf` (v0.8
//! ops-based API).
//!
//! Pages are kept as an arena of op buffers that stay addressable until
//! [`Canvas::save`]: any page can be re-selected by index and receive more
//! ops, which is what the deferred page-numbering pass relies on. All
//! public coordinates are top-left based and in the document unit; the
//! conversion to PDF points with a bottom-left origin happens here.

use printpdf::*;

use crate::config::{Color as RgbColor, Unit};
use crate::error::LayoutError;
use crate::fonts::{FontManager, FontStyle};

/// A4 portrait in PDF points (210 mm × 297 mm).
pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

// ---------------------------------------------------------------------------
// Cell vocabulary
// ---------------------------------------------------------------------------

/// Horizontal alignment of text or images relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub fn from_code(code: &str) -> Result<Self, LayoutError> {
        match code {
            "L" => Ok(Align::Left),
            "C" => Ok(Align::Center),
            "R" => Ok(Align::Right),
            other => Err(LayoutError::InvalidArgument(format!(
                "{other:?} is not an alignment code of \"L\", \"C\" or \"R\""
            ))),
        }
    }
}

/// Vertical alignment of text within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    #[default]
    Middle,
    Bottom,
    /// Baseline placement; rendered like `Middle` with built-in metrics.
    Baseline,
}

/// Combined cell alignment, parsed from letter codes: a horizontal letter
/// optionally followed by a vertical one, e.g. `"L"`, `"RM"`, `"CB"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellAlign {
    pub horizontal: Align,
    pub vertical: VAlign,
}

impl CellAlign {
    pub const LEFT_MIDDLE: CellAlign = CellAlign {
        horizontal: Align::Left,
        vertical: VAlign::Middle,
    };
    pub const RIGHT_MIDDLE: CellAlign = CellAlign {
        horizontal: Align::Right,
        vertical: VAlign::Middle,
    };

    pub fn from_code(code: &str) -> Result<Self, LayoutError> {
        let mut chars = code.chars();
        let horizontal = match chars.next() {
            Some('L') => Align::Left,
            Some('C') => Align::Center,
            Some('R') => Align::Right,
            _ => {
                return Err(LayoutError::InvalidArgument(format!(
                    "{code:?} is not a cell alignment code (expected L/C/R plus optional T/M/B/A)"
                )))
            }
        };
        let vertical = match chars.next() {
            None => VAlign::Middle,
            Some('T') => VAlign::Top,
            Some('M') => VAlign::Middle,
            Some('B') => VAlign::Bottom,
            Some('A') => VAlign::Baseline,
            _ => {
                return Err(LayoutError::InvalidArgument(format!(
                    "{code:?} is not a cell alignment code (expected L/C/R plus optional T/M/B/A)"
                )))
            }
        };
        if chars.next().is_some() {
            return Err(LayoutError::InvalidArgument(format!(
                "{code:?} is not a cell alignment code (expected L/C/R plus optional T/M/B/A)"
            )));
        }
        Ok(CellAlign {
            horizontal,
            vertical,
        })
    }

    fn code(self) -> String {
        let h = match self.horizontal {
            Align::Left => 'L',
            Align::Center => 'C',
            Align::Right => 'R',
        };
        let v = match self.vertical {
            VAlign::Top => 'T',
            VAlign::Middle => 'M',
            VAlign::Bottom => 'B',
            VAlign::Baseline => 'A',
        };
        format!("{h}{v}")
    }
}

impl serde::Serialize for CellAlign {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code())
    }
}

impl<'de> serde::Deserialize<'de> for CellAlign {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = <String as serde::Deserialize>::deserialize(deserializer)?;
        CellAlign::from_code(&code).map_err(serde::de::Error::custom)
    }
}

/// Which sides of a cell get a border line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Borders {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Borders {
    pub const NONE: Borders = Borders {
        top: false,
        bottom: false,
        left: false,
        right: false,
    };
    pub const ALL: Borders = Borders {
        top: true,
        bottom: true,
        left: true,
        right: true,
    };
    pub const TOP_BOTTOM: Borders = Borders {
        top: true,
        bottom: true,
        left: false,
        right: false,
    };
    pub const BOTTOM: Borders = Borders {
        top: false,
        bottom: true,
        left: false,
        right: false,
    };

    /// Parse a border code: `""` none, `"1"` full, otherwise any
    /// combination of `T`, `B`, `L`, `R`.
    pub fn from_code(code: &str) -> Result<Self, LayoutError> {
        if code.is_empty() {
            return Ok(Borders::NONE);
        }
        if code == "1" {
            return Ok(Borders::ALL);
        }
        let mut b = Borders::NONE;
        for c in code.chars() {
            match c {
                'T' => b.top = true,
                'B' => b.bottom = true,
                'L' => b.left = true,
                'R' => b.right = true,
                other => {
                    return Err(LayoutError::InvalidArgument(format!(
                        "{other:?} is not a border side of \"T\", \"B\", \"L\" or \"R\""
                    )))
                }
            }
        }
        Ok(b)
    }

    pub fn any(self) -> bool {
        self.top || self.bottom || self.left || self.right
    }
}

/// An ephemeral cell rendering request, consumed immediately by the canvas.
/// `x`/`y` is the top-left corner in document units.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    pub text: &'a str,
    pub style: FontStyle,
    pub align: CellAlign,
    pub borders: Borders,
    pub fill: Option<RgbColor>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Ops-based drawing surface over `printpdf`.
pub struct Canvas {
    doc: PdfDocument,
    pages: Vec<Vec<Op>>,
    current: usize,
    unit: Unit,
    font_family: String,
    /// Registered image XObjects with their pixel dimensions.
    xobjects: Vec<(XObjectId, u32, u32)>,
}

impl Canvas {
    pub fn new(title: &str, unit: Unit, font_family: String) -> Self {
        Self {
            doc: PdfDocument::new(title),
            pages: vec![Vec::new()],
            current: 0,
            unit,
            font_family,
            xobjects: Vec::new(),
        }
    }

    /// Page size in document units.
    pub fn page_size(&self) -> (f32, f32) {
        (
            self.unit.from_pt(A4_WIDTH_PT),
            self.unit.from_pt(A4_HEIGHT_PT),
        )
    }

    /// Append a fresh page and make it the drawing target.
    pub fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.current = self.pages.len() - 1;
    }

    /// Re-select an already emitted page (0-based) as the drawing target.
    pub fn select_page(&mut self, index: usize) -> bool {
        if index < self.pages.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of ops emitted on a page so far. Mostly useful in tests.
    pub fn op_count(&self, index: usize) -> Option<usize> {
        self.pages.get(index).map(Vec::len)
    }

    fn ops(&mut self) -> &mut Vec<Op> {
        &mut self.pages[self.current]
    }

    /// Draw a cell: optional background fill, optional border sides, and the
    /// text positioned inside the cell box. Does not touch any cursor.
    pub fn draw_cell(
        &mut self,
        cell: &Cell<'_>,
        font_size: f32,
        border_color: RgbColor,
        border_width: f32,
        fonts: &FontManager,
    ) {
        let x1 = self.unit.to_pt(cell.x);
        let y_top = A4_HEIGHT_PT - self.unit.to_pt(cell.y);
        let w = self.unit.to_pt(cell.width);
        let h = self.unit.to_pt(cell.height);
        let y_bottom = y_top - h;
        let x2 = x1 + w;

        if let Some(fill) = cell.fill {
            self.pages[self.current].push(Op::SetFillColor {
                col: pdf_color(fill),
            });
            self.pages[self.current].push(Op::DrawPolygon {
                polygon: rect_polygon(x1, y_bottom, x2, y_top),
            });
        }

        if cell.borders.any() {
            self.pages[self.current].push(Op::SetOutlineColor {
                col: pdf_color(border_color),
            });
            self.pages[self.current].push(Op::SetOutlineThickness {
                pt: Pt(self.unit.to_pt(border_width)),
            });
            let mut side = |xa: f32, ya: f32, xb: f32, yb: f32, enabled: bool| {
                if enabled {
                    self.pages[self.current].push(Op::DrawLine {
                        line: Line {
                            points: vec![line_point(xa, ya), line_point(xb, yb)],
                            is_closed: false,
                        },
                    });
                }
            };
            side(x1, y_top, x2, y_top, cell.borders.top);
            side(x1, y_bottom, x2, y_bottom, cell.borders.bottom);
            side(x1, y_bottom, x1, y_top, cell.borders.left);
            side(x2, y_bottom, x2, y_top, cell.borders.right);
        }

        if !cell.text.is_empty() {
            let font = builtin_font(&self.font_family, cell.style);
            let text_w = fonts.text_width_pt(cell.text, font_size, &self.font_family, cell.style);
            let pad = self.unit.to_pt(CELL_PAD);

            let text_x = match cell.align.horizontal {
                Align::Left => x1 + pad,
                Align::Center => x1 + (w - text_w) / 2.0,
                Align::Right => x2 - pad - text_w,
            };
            let glyph_top = match cell.align.vertical {
                VAlign::Top => y_top,
                VAlign::Middle | VAlign::Baseline => y_top - (h - font_size) / 2.0,
                VAlign::Bottom => y_bottom + font_size,
            };
            let baseline_y =
                glyph_top - fonts.ascender_pt(font_size, &self.font_family, cell.style);

            let ops = self.ops();
            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(text_x),
                    y: Pt(baseline_y),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(font_size),
                font,
            });
            ops.push(Op::SetFillColor {
                col: pdf_color(RgbColor::BLACK),
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winlatin(cell.text))],
                font,
            });
            ops.push(Op::EndTextSection);
        }
    }

    /// Draw a straight line between two points (document units, top-left
    /// origin).
    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: RgbColor, width: f32) {
        let p1 = line_point(self.unit.to_pt(x1), A4_HEIGHT_PT - self.unit.to_pt(y1));
        let p2 = line_point(self.unit.to_pt(x2), A4_HEIGHT_PT - self.unit.to_pt(y2));
        let thickness = Pt(self.unit.to_pt(width));
        let ops = self.ops();
        ops.push(Op::SetOutlineColor {
            col: pdf_color(color),
        });
        ops.push(Op::SetOutlineThickness { pt: thickness });
        ops.push(Op::DrawLine {
            line: Line {
                points: vec![p1, p2],
                is_closed: false,
            },
        });
    }

    /// Decode image bytes and register them as a reusable XObject. Returns a
    /// handle for [`Canvas::draw_image`].
    pub fn add_image(&mut self, bytes: &[u8], px_width: u32, px_height: u32) -> Result<usize, LayoutError> {
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let raw = RawImage::decode_from_bytes(bytes, &mut warnings)
            .map_err(|e| LayoutError::ImageFetch(format!("image decode for PDF failed: {e}")))?;
        let id = self.doc.add_image(&raw);
        self.xobjects.push((id, px_width, px_height));
        Ok(self.xobjects.len() - 1)
    }

    /// Place a registered image with its top-left corner at `(x, y)` and the
    /// given target size, all in document units.
    pub fn draw_image(&mut self, handle: usize, x: f32, y: f32, width: f32, height: f32) {
        let Some((id, px_w, px_h)) = self.xobjects.get(handle).cloned() else {
            return;
        };
        let w_pt = self.unit.to_pt(width);
        let h_pt = self.unit.to_pt(height);
        // At dpi = 72 printpdf renders 1 px = 1 pt, so scale = target_pt / px.
        let scale_x = if px_w > 0 { w_pt / px_w as f32 } else { 1.0 };
        let scale_y = if px_h > 0 { h_pt / px_h as f32 } else { 1.0 };
        let translate_x = self.unit.to_pt(x);
        let translate_y = A4_HEIGHT_PT - self.unit.to_pt(y) - h_pt;

        self.ops().push(Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(Pt(translate_x)),
                translate_y: Some(Pt(translate_y)),
                dpi: Some(72.0),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                rotate: None,
            },
        });
    }

    /// Assemble all page buffers and serialize the document to bytes.
    pub fn save(self) -> Vec<u8> {
        let page_w = Mm(A4_WIDTH_PT * 0.352778); // pt → mm
        let page_h = Mm(A4_HEIGHT_PT * 0.352778);

        let mut doc = self.doc;
        let pages: Vec<PdfPage> = self
            .pages
            .into_iter()
            .map(|ops| PdfPage::new(page_w, page_h, ops))
            .collect();
        doc.with_pages(pages);
        doc.save(&PdfSaveOptions::default(), &mut Vec::new())
    }
}

/// Inner padding between a cell edge and left/right aligned text, in
/// document units.
const CELL_PAD: f32 = 1.0;

fn pdf_color(c: RgbColor) -> Color {
    Color::Rgb(Rgb {
        r: c.r as f32 / 255.0,
        g: c.g as f32 / 255.0,
        b: c.b as f32 / 255.0,
        icc_profile: None,
    })
}

fn line_point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

fn rect_polygon(x1: f32, y1: f32, x2: f32, y2: f32) -> Polygon {
    Polygon {
        rings: vec![PolygonRing {
            points: vec![
                line_point(x1, y1),
                line_point(x2, y1),
                line_point(x2, y2),
                line_point(x1, y2),
            ],
        }],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    }
}

/// Map a family name and style flag to a built-in PDF font.
fn builtin_font(family: &str, style: FontStyle) -> BuiltinFont {
    let family = family.to_ascii_lowercase();
    let (bold, italic) = (style.is_bold(), style.is_italic());
    if family.starts_with("times") {
        match (bold, italic) {
            (true, true) => BuiltinFont::TimesBoldItalic,
            (true, false) => BuiltinFont::TimesBold,
            (false, true) => BuiltinFont::TimesItalic,
            (false, false) => BuiltinFont::TimesRoman,
        }
    } else if family.starts_with("courier") {
        match (bold, italic) {
            (true, true) => BuiltinFont::CourierBoldOblique,
            (true, false) => BuiltinFont::CourierBold,
            (false, true) => BuiltinFont::CourierOblique,
            (false, false) => BuiltinFont::Courier,
        }
    } else {
        // Helvetica and Arial, plus the fallback for unknown names.
        match (bold, italic) {
            (true, true) => BuiltinFont::HelveticaBoldOblique,
            (true, false) => BuiltinFont::HelveticaBold,
            (false, true) => BuiltinFont::HelveticaOblique,
            (false, false) => BuiltinFont::Helvetica,
        }
    }
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{201A}' => 0x82, // single low-9 quote
            '\u{201E}' => 0x84, // double low-9 quote
            '\u{2026}' => 0x85, // ellipsis
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en-dash
            '\u{2014}' => 0x97, // em-dash
            '\u{2122}' => 0x99, // trademark
            '\u{00A0}' => 0x20, // non-breaking space -> space
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 for the 0x80-0x9F range; printpdf
    // passes these bytes straight to the PDF stream, decoded by
    // WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

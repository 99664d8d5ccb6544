//! The cursor-based compositor – owns the layout state (cursor, margins,
//! font state, sticky error) and places text, cells, lines and images on
//! the canvas.
//!
//! Placement methods do not return errors; failures go into the sticky slot
//! (see [`crate::error`]) and, in strict mode, turn every following
//! placement call into a no-op. Callers query [`Composer::ok`] or collect
//! the slot from [`Composer::finish`].

use log::debug;

use crate::canvas::{Align, Borders, Canvas, Cell, CellAlign};
use crate::config::{Color, GeneratorConfig};
use crate::error::{ErrorSlot, LayoutError};
use crate::fonts::{FontManager, FontStyle};
use crate::images::ImageCache;

/// Split text on the literal `\n` marker and strip leading ASCII spaces from
/// every segment. Only `' '` is stripped – tabs and trailing spaces are
/// preserved. An empty input yields a single empty segment.
pub fn wrap_lines(text: &str) -> Vec<&str> {
    text.split('\n').map(|l| l.trim_start_matches(' ')).collect()
}

/// The document compositor. One instance per document; no state is shared
/// between documents, so independent documents can be composed in parallel.
pub struct Composer {
    canvas: Canvas,
    fonts: FontManager,
    cfg: GeneratorConfig,
    images: ImageCache,
    errors: ErrorSlot,
    /// Current write position in document units.
    x: f32,
    y: f32,
    /// Current font size in points; mutable between placements.
    font_size: f32,
    /// Current gap between lines in document units.
    line_gap: f32,
    safe_max_x: f32,
    safe_max_y: f32,
}

impl Composer {
    /// Validate the configuration and set up an empty single-page document
    /// with the cursor at the top-left of the writable area.
    pub fn new(cfg: GeneratorConfig) -> Result<Self, LayoutError> {
        if cfg.font_size < 0.0 {
            return Err(LayoutError::InvalidArgument(format!(
                "a negative font size ({}) is not allowed",
                cfg.font_size
            )));
        }
        if cfg.line_gap < 0.0 {
            return Err(LayoutError::InvalidArgument(format!(
                "a negative line gap ({}) is not allowed",
                cfg.line_gap
            )));
        }
        if cfg.line_width < 0.0 {
            return Err(LayoutError::InvalidArgument(format!(
                "a negative line width ({}) is not allowed",
                cfg.line_width
            )));
        }
        for (name, v) in [
            ("margin_left", cfg.margin_left),
            ("margin_top", cfg.margin_top),
            ("margin_right", cfg.margin_right),
            ("margin_bottom", cfg.margin_bottom),
        ] {
            if v < 0.0 {
                return Err(LayoutError::InvalidArgument(format!(
                    "a negative {name} ({v}) is not allowed"
                )));
            }
        }

        let canvas = Canvas::new(&cfg.title, cfg.unit, cfg.font_family.clone());
        let (page_w, page_h) = canvas.page_size();
        let safe_max_x = page_w - cfg.margin_right;
        let safe_max_y = page_h - cfg.margin_bottom;
        if cfg.margin_left >= safe_max_x || cfg.margin_top >= safe_max_y {
            return Err(LayoutError::InvalidArgument(
                "margins leave no writable area on the page".to_string(),
            ));
        }

        debug!("new document {:?} ({:?})", cfg.title, cfg.unit);

        Ok(Self {
            x: cfg.margin_left,
            y: cfg.margin_top,
            font_size: cfg.font_size,
            line_gap: cfg.line_gap,
            safe_max_x,
            safe_max_y,
            canvas,
            fonts: FontManager::new(),
            images: ImageCache::new(),
            errors: ErrorSlot::new(cfg.error_mode),
            cfg,
        })
    }

    // -- error state --------------------------------------------------------

    /// True while no error is recorded.
    pub fn ok(&self) -> bool {
        self.errors.is_ok()
    }

    pub fn error(&self) -> Option<&LayoutError> {
        self.errors.get()
    }

    /// Funnel an error into the sticky slot. Also used by content layers for
    /// failures outside the engine itself.
    pub fn set_error(&mut self, err: LayoutError) {
        self.errors.set(err);
    }

    pub(crate) fn halted(&self) -> bool {
        self.errors.halted()
    }

    // -- geometry & state accessors ----------------------------------------

    /// Page size in document units.
    pub fn page_size(&self) -> (f32, f32) {
        self.canvas.page_size()
    }

    /// Current cursor position.
    pub fn cursor(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn margin_left(&self) -> f32 {
        self.cfg.margin_left
    }

    pub fn margin_top(&self) -> f32 {
        self.cfg.margin_top
    }

    pub fn margin_right(&self) -> f32 {
        self.cfg.margin_right
    }

    pub fn margin_bottom(&self) -> f32 {
        self.cfg.margin_bottom
    }

    /// Width of the writable area between the horizontal margins.
    pub fn printable_width(&self) -> f32 {
        self.safe_max_x - self.cfg.margin_left
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Change the font size (points) for subsequent placements.
    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    pub fn line_gap(&self) -> f32 {
        self.line_gap
    }

    /// Change the gap between lines (document units) for subsequent
    /// placements.
    pub fn set_line_gap(&mut self, gap: f32) {
        self.line_gap = gap;
    }

    pub fn line_color(&self) -> Color {
        self.cfg.line_color
    }

    pub fn line_width(&self) -> f32 {
        self.cfg.line_width
    }

    /// Glyph height of the current font size, in document units.
    pub fn line_height(&self) -> f32 {
        self.cfg.unit.from_pt(self.font_size)
    }

    /// Load real TTF metrics for a family/style pair (otherwise widths come
    /// from the built-in heuristic).
    pub fn load_font_metrics(
        &mut self,
        family: &str,
        style: FontStyle,
        bytes: Vec<u8>,
    ) -> Result<(), LayoutError> {
        self.fonts.load_font(family, style, bytes)
    }

    /// Measured width of `text` in document units at the current font size,
    /// without the cell padding.
    pub fn text_width(&self, text: &str) -> f32 {
        self.styled_text_width(text, FontStyle::Regular)
    }

    fn styled_text_width(&self, text: &str, style: FontStyle) -> f32 {
        self.cfg.unit.from_pt(self.fonts.text_width_pt(
            text,
            self.font_size,
            &self.cfg.font_family,
            style,
        ))
    }

    // -- cursor movement ----------------------------------------------------

    /// Move the cursor, constrained to the writable rectangle between the
    /// margins. An out-of-range position sets the sticky error and leaves
    /// the cursor unchanged; nothing is clamped.
    pub fn set_cursor(&mut self, x: f32, y: f32) {
        if self.halted() {
            return;
        }
        if x < self.cfg.margin_left || x > self.safe_max_x {
            self.errors.set(LayoutError::OutOfRange {
                what: "cursor x",
                value: x,
                min: self.cfg.margin_left,
                max: self.safe_max_x,
            });
            return;
        }
        if y < self.cfg.margin_top || y > self.safe_max_y {
            self.errors.set(LayoutError::OutOfRange {
                what: "cursor y",
                value: y,
                min: self.cfg.margin_top,
                max: self.safe_max_y,
            });
            return;
        }
        self.x = x;
        self.y = y;
    }

    /// Move the cursor, constrained only to the page rectangle. Used for the
    /// header and footer zones that lie inside the margin reserve.
    pub fn set_unsafe_cursor(&mut self, x: f32, y: f32) {
        if self.halted() {
            return;
        }
        let (page_w, page_h) = self.canvas.page_size();
        if x < 0.0 || x > page_w {
            self.errors.set(LayoutError::OutOfRange {
                what: "cursor x",
                value: x,
                min: 0.0,
                max: page_w,
            });
            return;
        }
        if y < 0.0 || y > page_h {
            self.errors.set(LayoutError::OutOfRange {
                what: "cursor y",
                value: y,
                min: 0.0,
                max: page_h,
            });
            return;
        }
        self.x = x;
        self.y = y;
    }

    /// Move to the next line: y advances by glyph height + line gap, x is
    /// reset to `reference_x` (usually the start x of the current block).
    pub fn new_line(&mut self, reference_x: f32) {
        if self.halted() {
            return;
        }
        if reference_x < 0.0 {
            self.errors.set(LayoutError::InvalidArgument(
                "a negative reference x is not allowed".to_string(),
            ));
            return;
        }
        self.y += self.line_height() + self.line_gap;
        self.x = reference_x;
    }

    /// Move one line up; the counterpart of [`Composer::new_line`].
    pub fn previous_line(&mut self, reference_x: f32) {
        if self.halted() {
            return;
        }
        if reference_x < 0.0 {
            self.errors.set(LayoutError::InvalidArgument(
                "a negative reference x is not allowed".to_string(),
            ));
            return;
        }
        self.y -= self.line_height() + self.line_gap;
        self.x = reference_x;
    }

    // -- text placement ------------------------------------------------------

    /// Print a single text cell at the cursor. The alignment is relative to
    /// the cursor position: `Right` puts the text's right edge there,
    /// `Center` its middle. The cursor advances to the cell's right edge and
    /// does not move vertically.
    pub fn print_text(&mut self, text: &str, style: FontStyle, align: Align) {
        if self.halted() {
            return;
        }
        let width = self.styled_text_width(text, style) + 2.0;
        let height = self.line_height();
        let x0 = match align {
            Align::Left => self.x,
            Align::Right => self.x - width,
            Align::Center => self.x - width / 2.0,
        };
        self.canvas.draw_cell(
            &Cell {
                text,
                style,
                align: CellAlign::LEFT_MIDDLE,
                borders: Borders::NONE,
                fill: None,
                x: x0,
                y: self.y,
                width,
                height,
            },
            self.font_size,
            self.cfg.line_color,
            self.cfg.line_width,
            &self.fonts,
        );
        self.x = x0 + width;
    }

    /// Print text and advance to the next line. Embedded `\n` markers split
    /// the text; every resulting line is printed with the given alignment
    /// and the x captured before the first placement serves as the reset
    /// reference, so a multi-line block keeps its own start column.
    pub fn print_text_line(&mut self, text: &str, style: FontStyle, align: Align) {
        if self.halted() {
            return;
        }
        let reference_x = self.x;
        for line in wrap_lines(text) {
            self.print_text(line, style, align);
            self.new_line(reference_x);
        }
    }

    /// Print a formatted cell (borders, fill, alignment within the cell) of
    /// explicit size at the cursor. The cursor advances horizontally by the
    /// cell width; vertical advance is left to the caller so that adjacent
    /// calls at one y compose a table row.
    #[allow(clippy::too_many_arguments)]
    pub fn print_cell(
        &mut self,
        text: &str,
        style: FontStyle,
        align: CellAlign,
        borders: Borders,
        fill: Option<Color>,
        height: f32,
        width: f32,
    ) {
        if self.halted() {
            return;
        }
        if height <= 0.0 {
            self.errors.set(LayoutError::InvalidArgument(format!(
                "cell height must be positive, got {height}"
            )));
            return;
        }
        if width <= 0.0 {
            self.errors.set(LayoutError::InvalidArgument(format!(
                "cell width must be positive, got {width}"
            )));
            return;
        }
        self.canvas.draw_cell(
            &Cell {
                text,
                style,
                align,
                borders,
                fill,
                x: self.x,
                y: self.y,
                width,
                height,
            },
            self.font_size,
            self.cfg.line_color,
            self.cfg.line_width,
            &self.fonts,
        );
        self.x += width;
    }

    // -- lines ---------------------------------------------------------------

    /// Draw a straight line between two points on the current page. Both
    /// points must lie inside the page rectangle.
    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Color, width: f32) {
        if self.halted() {
            return;
        }
        if width < 0.0 {
            self.errors.set(LayoutError::InvalidArgument(
                "a negative line width is not allowed".to_string(),
            ));
            return;
        }
        let (page_w, page_h) = self.canvas.page_size();
        for (what, v, max) in [
            ("line x1", x1, page_w),
            ("line x2", x2, page_w),
            ("line y1", y1, page_h),
            ("line y2", y2, page_h),
        ] {
            if v < 0.0 || v > max {
                self.errors.set(LayoutError::OutOfRange {
                    what,
                    value: v,
                    min: 0.0,
                    max,
                });
                return;
            }
        }
        self.canvas.draw_line(x1, y1, x2, y2, color, width);
    }

    // -- images --------------------------------------------------------------

    /// Fetch and register an image resource; idempotent per identifier.
    /// Failures go into the sticky slot.
    pub fn register_image(&mut self, identifier: &str) {
        if self.halted() {
            return;
        }
        if let Err(e) = self.images.register(&mut self.canvas, identifier) {
            self.errors.set(e);
        }
    }

    pub fn image_registered(&self, identifier: &str) -> bool {
        self.images.contains(identifier)
    }

    /// Natural extent of a registered image in document units, or `None` if
    /// the identifier is unknown.
    pub fn image_extent(&self, identifier: &str) -> Option<(f32, f32)> {
        self.images.get(identifier).map(|img| {
            (
                self.cfg.unit.from_pt(img.width_pt),
                self.cfg.unit.from_pt(img.height_pt),
            )
        })
    }

    /// Place a registered image at the cursor (its top-left corner), scaled
    /// by `scale`. The alignment shifts the image left by zero, half or the
    /// full width, mirroring the text convention.
    pub fn place_image(&mut self, identifier: &str, align: Align, scale: f32) {
        if self.halted() {
            return;
        }
        if scale <= 0.0 {
            self.errors.set(LayoutError::InvalidArgument(format!(
                "the image scale must be greater than 0, got {scale}"
            )));
            return;
        }
        let Some(img) = self.images.get(identifier) else {
            self.errors
                .set(LayoutError::NotRegistered(identifier.to_string()));
            return;
        };
        let width = self.cfg.unit.from_pt(img.width_pt) * scale;
        let height = self.cfg.unit.from_pt(img.height_pt) * scale;
        let handle = img.handle;
        let x0 = match align {
            Align::Left => self.x,
            Align::Right => self.x - width,
            Align::Center => self.x - width / 2.0,
        };
        self.canvas.draw_image(handle, x0, self.y, width, height);
    }

    // -- pages ---------------------------------------------------------------

    /// Start a new page and home the cursor to the top-left of the writable
    /// area.
    pub fn new_page(&mut self) {
        if self.halted() {
            return;
        }
        self.canvas.new_page();
        self.x = self.cfg.margin_left;
        self.y = self.cfg.margin_top;
    }

    /// Re-select an already emitted page (0-based) as the drawing target for
    /// subsequent placements. This is how the deferred numbering pass
    /// revisits finished pages.
    pub fn select_page(&mut self, index: usize) {
        if self.halted() {
            return;
        }
        if !self.canvas.select_page(index) {
            self.errors.set(LayoutError::OutOfRange {
                what: "page index",
                value: index as f32,
                min: 0.0,
                max: (self.canvas.page_count() - 1) as f32,
            });
        }
    }

    pub fn page_count(&self) -> usize {
        self.canvas.page_count()
    }

    /// Number of drawing ops on a page; useful for asserting what a pass
    /// did or did not emit.
    pub fn page_op_count(&self, index: usize) -> Option<usize> {
        self.canvas.op_count(index)
    }

    /// Serialize the document. The sticky error (if any) is handed back
    /// alongside the bytes – partially rendered output is preserved.
    pub fn finish(self) -> (Vec<u8>, Option<LayoutError>) {
        (self.canvas.save(), self.errors.into_inner())
    }
}

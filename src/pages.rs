//! Page lifecycle – an explicit driver loop around page decoration and the
//! deferred page-numbering pass.
//!
//! Instead of handing callbacks to the canvas, the driver invokes a
//! [`PageDecorator`] at every page boundary: `page_start` right after a page
//! begins, `page_end` right before it is left behind. `page_end` receives a
//! hint whether this is believed to be the last page; the true page count is
//! only known once composition finishes, which is why numbering runs as a
//! second pass over the already-emitted page buffers.

use crate::compose::Composer;
use crate::error::LayoutError;

/// Per-page decoration hooks supplied by the document layer.
pub trait PageDecorator {
    /// Called immediately after a page becomes the drawing target.
    fn page_start(&mut self, c: &mut Composer);

    /// Render the footer content and return the y at which the footer band
    /// actually started. The band height is content-dependent (three
    /// contact lines vs one), which is why the driver cannot know it
    /// upfront.
    fn page_end(&mut self, c: &mut Composer, last_page_hint: bool) -> f32;

    /// Stamp one page's number during the second pass. `page` is 1-based.
    fn page_number(&mut self, c: &mut Composer, page: usize, total: usize, footer_start_y: f32);
}

/// Fixed geometry of the footer machinery, in document units.
#[derive(Debug, Clone, Copy)]
pub struct PageFrame {
    /// Top of the body band; a footer may not start above it.
    pub body_start_y: f32,
    /// Horizontal extent of the footer rules.
    pub rule_start_x: f32,
    pub rule_stop_x: f32,
    /// Fixed y of the rule below the footer band.
    pub bottom_rule_y: f32,
}

/// Drives page decoration and the deferred numbering pass.
pub struct PageDriver<D: PageDecorator> {
    decorator: D,
    frame: PageFrame,
    /// Recorded from the first page's footer; later pages reuse it on the
    /// assumption that the footer height never changes within a document.
    footer_start_y: Option<f32>,
}

impl<D: PageDecorator> PageDriver<D> {
    pub fn new(decorator: D, frame: PageFrame) -> Self {
        Self {
            decorator,
            frame,
            footer_start_y: None,
        }
    }

    /// Decorate the first page. Call once, before any body content.
    pub fn begin(&mut self, c: &mut Composer) {
        self.decorator.page_start(c);
    }

    /// Close the current page (footer, rules), open a fresh one and
    /// decorate it.
    pub fn break_page(&mut self, c: &mut Composer) {
        self.close_page(c, false);
        c.new_page();
        self.decorator.page_start(c);
    }

    /// Close the last page and stamp page numbers onto every page. A
    /// single-page document gets no number at all.
    pub fn finish(&mut self, c: &mut Composer) {
        self.close_page(c, true);

        let total = c.page_count();
        if total == 1 {
            return;
        }
        let Some(footer_y) = self.footer_start_y else {
            return;
        };
        for page in 0..total {
            c.select_page(page);
            self.decorator.page_number(c, page + 1, total, footer_y);
        }
    }

    fn close_page(&mut self, c: &mut Composer, last_page_hint: bool) {
        let y = self.decorator.page_end(c, last_page_hint);

        let (_, page_h) = c.page_size();
        if y <= self.frame.body_start_y || y > page_h {
            // a malformed footer is reported, not partially ruled
            c.set_error(LayoutError::LayoutOverflow {
                y,
                min: self.frame.body_start_y,
                max: page_h,
            });
            return;
        }
        self.footer_start_y.get_or_insert(y);

        let color = c.line_color();
        let width = c.line_width();
        c.draw_line(
            self.frame.rule_start_x,
            y - 1.0,
            self.frame.rule_stop_x,
            y - 1.0,
            color,
            width,
        );
        c.draw_line(
            self.frame.rule_start_x,
            self.frame.bottom_rule_y,
            self.frame.rule_stop_x,
            self.frame.bottom_rule_y,
            color,
            width,
        );
    }
}

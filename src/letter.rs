//! DIN 5008 form A letter layout – the fixed zones (header image, sender
//! line, receiver address, metadata block, footer) and the driver that
//! sequences them around a flowing body.
//!
//! Every document type (invoice, delivery note, table attachment) is the
//! same letter with different content; there is exactly one layout
//! implementation.

use log::{debug, warn};

use crate::canvas::{Align, CellAlign};
use crate::compose::Composer;
use crate::config::GeneratorConfig;
use crate::content::{BodyContent, FooterContent, LetterContent, MetaEntry};
use crate::error::LayoutError;
use crate::fonts::FontStyle;
use crate::pages::{PageDecorator, PageDriver};

/// Zone coordinates of the DIN 5008 form A letter on A4, in millimeters.
pub mod din {
    use crate::pages::PageFrame;

    pub const WIDTH: f32 = 210.0;
    pub const HEIGHT: f32 = 297.0;

    pub const FONT_SIZE_SMALL: f32 = 8.0;
    pub const FONT_SIZE_DEFAULT: f32 = 10.0;
    pub const FONT_SIZE_LARGE: f32 = 15.0;

    pub const LINE_GAP_DEFAULT: f32 = 1.3;
    pub const LINE_GAP_SMALL: f32 = 0.5;
    pub const LINE_GAP_FOOTER: f32 = 1.0;

    /// Bottom of the header band reserved for the logo.
    pub const HEADER_STOP_Y: f32 = 27.0;
    pub const LOGO_TOP_Y: f32 = 5.0;

    /// Small sender line above the receiver address window.
    pub const SENDER_LINE_Y: f32 = 49.0;
    pub const RECEIVER_START_Y: f32 = 56.0;

    pub const META_RULE_X: f32 = 123.0;
    pub const META_LABEL_X: f32 = 125.0;
    pub const META_START_Y: f32 = 56.0;
    /// Gap between the label column and the value column.
    pub const META_COLUMN_GAP: f32 = 2.0;

    pub const BODY_START_X: f32 = 25.0;
    pub const BODY_START_Y: f32 = 100.0;
    pub const BODY_STOP_X: f32 = 190.0;
    /// Body start on continuation pages, which carry no address zones.
    pub const BODY_CONTINUATION_Y: f32 = HEADER_STOP_Y + 5.0;

    /// Offset of the page number below the footer band and above the
    /// bottom edge.
    pub const PAGE_NUMBER_MARGIN_Y: f32 = 4.23;
    pub const BOTTOM_RULE_Y: f32 = HEIGHT - PAGE_NUMBER_MARGIN_Y;

    pub fn page_frame() -> PageFrame {
        PageFrame {
            body_start_y: BODY_START_Y,
            rule_start_x: BODY_START_X,
            rule_stop_x: BODY_STOP_X,
            bottom_rule_y: BOTTOM_RULE_Y,
        }
    }
}

// ---------------------------------------------------------------------------
// Zone renderers
// ---------------------------------------------------------------------------

/// Fit the logo into the header band, right-aligned at the body's right
/// edge. Registration is idempotent, so re-rendering the zone never
/// re-fetches.
pub fn logo_zone(c: &mut Composer, url: &str) {
    let (page_w, _) = c.page_size();
    c.set_unsafe_cursor(page_w - c.margin_right(), din::LOGO_TOP_Y);

    if !c.image_registered(url) {
        c.register_image(url);
    }
    let Some((_, natural_height)) = c.image_extent(url) else {
        // registration failed; the sticky slot already has the cause
        return;
    };
    let max_height = din::HEADER_STOP_Y - din::LOGO_TOP_Y;
    c.place_image(url, Align::Right, max_height / natural_height);
}

/// The small sender line(s) above the receiver window.
pub fn sender_zone(c: &mut Composer, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    c.set_font_size(din::FONT_SIZE_SMALL);
    c.set_line_gap(din::LINE_GAP_SMALL);
    c.set_cursor(din::BODY_START_X, din::SENDER_LINE_Y);
    for line in lines {
        c.print_text_line(line, FontStyle::Regular, Align::Left);
    }
    c.set_font_size(din::FONT_SIZE_DEFAULT);
    c.set_line_gap(din::LINE_GAP_DEFAULT);
}

/// The receiver address block.
pub fn receiver_zone(c: &mut Composer, lines: &[String]) {
    c.set_font_size(din::FONT_SIZE_DEFAULT);
    c.set_line_gap(din::LINE_GAP_DEFAULT);
    c.set_cursor(din::BODY_START_X, din::RECEIVER_START_Y);
    for line in lines {
        c.print_text_line(line, FontStyle::Regular, Align::Left);
    }
}

/// The metadata block: a label column and a value column separated by a
/// measured gap, with a vertical rule on the left.
pub fn meta_zone(c: &mut Composer, entries: &[MetaEntry]) {
    if entries.is_empty() {
        return;
    }
    c.set_font_size(din::FONT_SIZE_DEFAULT);
    c.set_line_gap(din::LINE_GAP_DEFAULT);

    let mut max_label_width = 0.0f32;
    for entry in entries {
        max_label_width = max_label_width.max(c.text_width(&entry.label));
    }

    c.set_cursor(din::META_LABEL_X, din::META_START_Y);
    for entry in entries {
        c.print_text_line(&entry.label, FontStyle::Regular, Align::Left);
    }

    let value_x = din::META_LABEL_X + max_label_width + din::META_COLUMN_GAP;
    c.set_cursor(value_x, din::META_START_Y);
    for entry in entries {
        c.print_text_line(&entry.value, FontStyle::Regular, Align::Left);
    }

    let (_, y) = c.cursor();
    let color = c.line_color();
    let width = c.line_width();
    c.draw_line(
        din::META_RULE_X,
        din::META_START_Y,
        din::META_RULE_X,
        y - c.line_gap(),
        color,
        width,
    );
}

/// Position the cursor at the body start and run the body content
/// function. This is the only part that differs between document types.
pub fn body_zone<F: FnOnce(&mut Composer)>(c: &mut Composer, body: F) {
    c.set_font_size(din::FONT_SIZE_DEFAULT);
    c.set_line_gap(din::LINE_GAP_DEFAULT);
    c.set_cursor(din::BODY_START_X, din::BODY_START_Y);
    body(c);
}

/// Column widths from percentages of the printable width.
pub fn percent_widths(c: &Composer, percents: &[f32]) -> Vec<f32> {
    percents
        .iter()
        .map(|p| p * c.printable_width() / 100.0)
        .collect()
}

// ---------------------------------------------------------------------------
// Page decoration
// ---------------------------------------------------------------------------

/// Decorates every page of a letter: footer band on page end, body cursor
/// on continuation pages, and the "Seite i von n" stamps.
pub struct DinDecorator<'a> {
    footer: &'a FooterContent,
    page_number_prefix: &'a str,
    default_font_size: f32,
    default_line_gap: f32,
}

impl<'a> DinDecorator<'a> {
    pub fn new(content: &'a LetterContent, config: &GeneratorConfig) -> Self {
        Self {
            footer: &content.footer,
            page_number_prefix: content.page_number_prefix.as_str(),
            default_font_size: config.font_size,
            default_line_gap: config.line_gap,
        }
    }

    fn restore_defaults(&self, c: &mut Composer) {
        c.set_font_size(self.default_font_size);
        c.set_line_gap(self.default_line_gap);
    }
}

impl PageDecorator for DinDecorator<'_> {
    fn page_start(&mut self, c: &mut Composer) {
        self.restore_defaults(c);
        if c.page_count() > 1 {
            c.set_unsafe_cursor(din::BODY_START_X, din::BODY_CONTINUATION_Y);
        }
    }

    fn page_end(&mut self, c: &mut Composer, _last_page_hint: bool) -> f32 {
        let rows = self.footer.line_count();
        c.set_font_size(din::FONT_SIZE_SMALL);
        c.set_line_gap(din::LINE_GAP_FOOTER);

        // the band grows upwards from the bottom rule, one line per row of
        // the tallest footer column
        c.set_unsafe_cursor(0.0, din::BOTTOM_RULE_Y);
        for _ in 0..rows {
            c.previous_line(0.0);
        }
        let (_, footer_start_y) = c.cursor();

        if rows > 0 {
            let center_x = (din::BODY_STOP_X - din::BODY_START_X) / 2.0 + din::BODY_START_X;
            let columns = [
                (din::BODY_START_X, Align::Left, &self.footer.left),
                (center_x, Align::Center, &self.footer.center),
                (din::BODY_STOP_X, Align::Right, &self.footer.right),
            ];
            for (x, align, lines) in columns {
                c.set_cursor(x, footer_start_y);
                for line in lines {
                    c.print_text_line(line, FontStyle::Regular, align);
                }
            }
        }

        self.restore_defaults(c);
        footer_start_y
    }

    fn page_number(&mut self, c: &mut Composer, page: usize, total: usize, footer_start_y: f32) {
        c.set_font_size(din::FONT_SIZE_SMALL);
        c.set_line_gap(0.0);
        c.set_unsafe_cursor(
            din::BODY_STOP_X,
            footer_start_y - din::PAGE_NUMBER_MARGIN_Y,
        );
        c.previous_line(din::BODY_STOP_X);
        let label = format!("{}Seite {} von {}", self.page_number_prefix, page, total);
        c.print_text(&label, FontStyle::Regular, Align::Right);
        self.restore_defaults(c);
    }
}

// ---------------------------------------------------------------------------
// Letter driver
// ---------------------------------------------------------------------------

/// A renderable letter: configuration plus content.
pub struct Letter {
    pub config: GeneratorConfig,
    pub content: LetterContent,
}

/// The outcome of a render: the bytes are present even when a sticky error
/// was recorded, so partial output can be inspected.
pub struct RenderedLetter {
    pub bytes: Vec<u8>,
    pub pages: usize,
    pub error: Option<LayoutError>,
}

impl Letter {
    /// A letter with the DIN 5008 A preset configuration.
    pub fn new(content: LetterContent) -> Self {
        Self {
            config: GeneratorConfig::din_5008_a(),
            content,
        }
    }

    /// Compose the full letter: header image, address zones, metadata,
    /// body, footer and page numbers.
    ///
    /// `Err` is returned only for configuration problems; layout failures
    /// end up in [`RenderedLetter::error`] alongside the partial output.
    pub fn render(&self) -> Result<RenderedLetter, LayoutError> {
        debug!("generate letter {:?}", self.config.title);

        let mut c = Composer::new(self.config.clone())?;
        let decorator = DinDecorator::new(&self.content, &self.config);
        let mut driver = PageDriver::new(decorator, din::page_frame());

        driver.begin(&mut c);

        if let Some(logo) = &self.content.logo {
            logo_zone(&mut c, &logo.url);
        }
        sender_zone(&mut c, &self.content.sender_lines);
        receiver_zone(&mut c, &self.content.receiver_lines);
        meta_zone(&mut c, &self.content.meta);
        body_zone(&mut c, |c| standard_body(c, &self.content.body));

        driver.finish(&mut c);

        let pages = c.page_count();
        let (bytes, error) = c.finish();
        if let Some(e) = &error {
            warn!("letter rendered with error: {e}");
        }
        Ok(RenderedLetter {
            bytes,
            pages,
            error,
        })
    }
}

/// The body shared by invoices and delivery notes: headline, opening text,
/// optional note, optional position table, closing paragraphs.
fn standard_body(c: &mut Composer, body: &BodyContent) {
    let reference_x = c.margin_left();

    c.set_font_size(din::FONT_SIZE_LARGE);
    let headline = if body.reference.is_empty() {
        body.headline.clone()
    } else {
        format!("{} {}", body.headline, body.reference)
    };
    c.print_text_line(&headline, FontStyle::Bold, Align::Left);

    c.set_font_size(din::FONT_SIZE_DEFAULT);
    c.new_line(reference_x);
    if !body.opening.is_empty() {
        c.print_text_line(&body.opening, FontStyle::Regular, Align::Left);
    }

    if let Some(table) = &body.table {
        c.new_line(reference_x);
        if let Some(note) = &body.note {
            c.set_font_size(din::FONT_SIZE_SMALL);
            c.print_text_line(note, FontStyle::Italic, Align::Left);
            c.set_font_size(din::FONT_SIZE_DEFAULT);
        }

        let widths = percent_widths(c, &table.column_percents);
        c.table_header(&table.header, &widths, &table.column_aligns);
        c.table_body(&table.rows, &widths, &table.column_aligns);

        if !table.summary.is_empty() {
            let summary_rows: Vec<Vec<String>> = table
                .summary
                .iter()
                .map(|row| vec![String::new(), row.label.clone(), row.value.clone()])
                .collect();
            let summary_widths = percent_widths(c, &table.summary_percents);
            let summary_aligns = [
                CellAlign::LEFT_MIDDLE,
                CellAlign::LEFT_MIDDLE,
                CellAlign::RIGHT_MIDDLE,
            ];
            c.table_footer(&summary_rows, &summary_widths, &summary_aligns);
        }
    }

    for (i, paragraph) in body.closing.iter().enumerate() {
        let blank_lines = if i == 0 { 3 } else { 2 };
        for _ in 0..blank_lines {
            c.new_line(reference_x);
        }
        c.print_text_line(paragraph, FontStyle::Regular, Align::Left);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SummaryRow;

    fn minimal_content() -> LetterContent {
        LetterContent::from_json(
            r#"{
                "senderLines": ["Acme GmbH - Musterweg 1, 12345 Berlin"],
                "receiverLines": ["Erika Musterfrau", "Heidestraße 17", "51147 Köln"],
                "meta": [
                    {"label": "Kundennummer:", "value": "KD-1001"},
                    {"label": "Rechnungsnummer:", "value": "RE-2024-17"},
                    {"label": "Datum:", "value": "12.03.2024"}
                ],
                "body": {
                    "headline": "Rechnung",
                    "reference": "RE-2024-17",
                    "opening": "Sehr geehrte Frau Musterfrau,\nwir berechnen Ihnen:"
                },
                "footer": {
                    "left": ["www.example.com", "+49 30 1234567"],
                    "center": ["Acme GmbH", "Musterweg 1", "12345 Berlin"],
                    "right": ["Berliner Bank", "DE02 1203 0000 0000 2020 51"]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn minimal_letter_renders_one_clean_page() {
        let rendered = Letter::new(minimal_content()).render().unwrap();
        assert!(rendered.error.is_none(), "error: {:?}", rendered.error);
        assert_eq!(rendered.pages, 1);
        assert_eq!(&rendered.bytes[0..5], b"%PDF-");
    }

    #[test]
    fn letter_with_table_and_summary_renders() {
        let mut content = minimal_content();
        content.body.note = Some("Leistungszeitraum 01.02.2024 - 29.02.2024".to_string());
        content.body.table = Some(crate::content::TableContent {
            header: ["Pos", "Anzahl", "Preis", "Beschreibung", "USt", "Netto"]
                .map(String::from)
                .to_vec(),
            column_percents: vec![6.0, 10.0, 10.0, 54.0, 8.0, 12.0],
            column_aligns: ["LM", "LM", "LM", "LM", "RM", "RM"]
                .iter()
                .map(|s| CellAlign::from_code(s).unwrap())
                .collect(),
            rows: vec![
                ["1", "2 Stk", "30,00€", "Widget,\nblau", "19%", "60,00€"]
                    .map(String::from)
                    .to_vec(),
            ],
            summary: vec![
                SummaryRow {
                    label: "Zwischensumme".into(),
                    value: "60,00€".into(),
                },
                SummaryRow {
                    label: "Gesamtbetrag".into(),
                    value: "71,40€".into(),
                },
            ],
            summary_percents: vec![60.0, 25.0, 15.0],
        });
        content.body.closing = vec![
            "Bitte überweisen Sie den Betrag innerhalb von 14 Tagen.".to_string(),
            "Mit freundlichen Grüßen".to_string(),
        ];

        let rendered = Letter::new(content).render().unwrap();
        assert!(rendered.error.is_none(), "error: {:?}", rendered.error);
        assert_eq!(rendered.pages, 1);
    }

    #[test]
    fn percent_widths_scale_to_printable_area() {
        let c = Composer::new(GeneratorConfig::din_5008_a()).unwrap();
        let widths = percent_widths(&c, &[50.0, 50.0]);
        // printable width: 210 - 25 - 20 = 165 mm
        assert!((widths[0] - 82.5).abs() < 1e-3);
        assert!((widths.iter().sum::<f32>() - 165.0).abs() < 1e-3);
    }

    #[test]
    fn footer_band_lies_inside_the_page() {
        let content = minimal_content();
        let config = GeneratorConfig::din_5008_a();
        let mut c = Composer::new(config.clone()).unwrap();
        let mut decorator = DinDecorator::new(&content, &config);
        let y = decorator.page_end(&mut c, true);
        // 3 footer lines of 8 pt with a 1 mm gap, growing up from the rule
        let step = crate::config::Unit::Mm.from_pt(8.0) + 1.0;
        let expected = din::BOTTOM_RULE_Y - 3.0 * step;
        assert!((y - expected).abs() < 1e-3, "y = {y}, expected {expected}");
        assert!(y > din::BODY_START_Y && y < din::HEIGHT);
        assert!(c.ok(), "error: {:?}", c.error());
    }
}

//! Integration tests for the letter-forge layout engine.
//!
//! These tests validate:
//! - Cursor arithmetic across text and table placement
//! - The sticky error contract in both modes
//! - Footer decoration and deferred page numbering
//! - Complete letters rendering to valid PDF bytes

use base64::Engine as _;
use letter_forge::letter::{din, DinDecorator};
use letter_forge::pages::{PageDecorator, PageDriver, PageFrame};
use letter_forge::{
    Align, CellAlign, Composer, ErrorMode, FontStyle, GeneratorConfig, LayoutError, Letter,
    LetterContent, Unit,
};

// =====================================================================
// Helpers
// =====================================================================

fn engine_config() -> GeneratorConfig {
    // margins 25/45/20/0 mm, 10 pt, 1.3 mm line gap
    GeneratorConfig::din_5008_a()
}

fn composer() -> Composer {
    Composer::new(engine_config()).unwrap()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn mm(pt: f32) -> f32 {
    Unit::Mm.from_pt(pt)
}

fn png_data_uri(width: u32, height: u32) -> String {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 255, 255]));
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(
        encoder,
        img.as_raw(),
        width,
        height,
        image::ExtendedColorType::Rgba8,
    )
    .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&buf)
    )
}

// =====================================================================
// End-to-end cursor arithmetic
// =====================================================================

#[test]
fn headline_and_table_cursor_arithmetic() {
    let mut c = composer();

    c.set_cursor(25.0, 100.0);
    c.print_text("Invoice 1001", FontStyle::Regular, Align::Left);
    c.new_line(25.0);

    let (x, y_after_line) = c.cursor();
    assert_eq!(x, 25.0);
    let line_h = mm(10.0) + 1.3;
    assert!((y_after_line - (100.0 + line_h)).abs() < 1e-3);

    let aligns = vec![CellAlign::LEFT_MIDDLE, CellAlign::LEFT_MIDDLE];
    c.table_header(&strings(&["Pos", "Amount"]), &[30.0, 30.0], &aligns);
    c.table_body(&[strings(&["1", "100,00€"])], &[30.0, 30.0], &aligns);

    // header row + one body row, each glyph height + 2 × line gap tall
    let row_h = mm(10.0) + 2.0 * 1.3;
    let (x, y) = c.cursor();
    assert_eq!(x, 25.0);
    assert!(
        (y - (y_after_line + 2.0 * row_h)).abs() < 1e-3,
        "cursor y = {y}, expected {}",
        y_after_line + 2.0 * row_h
    );
    assert!(c.ok(), "unexpected error: {:?}", c.error());

    let (bytes, err) = c.finish();
    assert!(err.is_none());
    assert_valid_pdf(&bytes);
}

#[test]
fn wrapped_body_row_shares_height_and_bottom_border() {
    let mut c = composer();
    c.set_cursor(25.0, 120.0);

    let aligns = vec![CellAlign::LEFT_MIDDLE, CellAlign::LEFT_MIDDLE];
    // one cell wraps to 3 lines, its sibling to 1 -> the logical row must
    // occupy exactly 3 physical lines
    c.table_body(
        &[vec![
            "one\ntwo\nthree".to_string(),
            "single".to_string(),
        ]],
        &[40.0, 40.0],
        &aligns,
    );

    let row_h = mm(10.0) + 2.0 * 1.3;
    let (_, y) = c.cursor();
    assert!((y - (120.0 + 3.0 * row_h)).abs() < 1e-3);
    assert!(c.ok());
}

// =====================================================================
// Sticky error contract
// =====================================================================

#[test]
fn strict_document_skips_everything_after_first_error() {
    let mut c = composer();
    c.set_cursor(25.0, 100.0);
    c.set_cursor(5.0, 100.0); // out of the writable area
    let first = c.error().cloned();
    assert!(matches!(first, Some(LayoutError::OutOfRange { .. })));

    // all of these must be skipped and must not overwrite the first error
    c.print_text("ignored", FontStyle::Regular, Align::Left);
    c.print_text_line("ignored", FontStyle::Regular, Align::Left);
    c.new_line(25.0);
    c.table_header(
        &strings(&["a"]),
        &[10.0, 20.0], // would be a DimensionMismatch
        &[CellAlign::LEFT_MIDDLE],
    );
    assert_eq!(c.cursor(), (25.0, 100.0));
    assert_eq!(c.error().cloned(), first);
}

#[test]
fn lenient_document_keeps_last_error() {
    let mut c = Composer::new(GeneratorConfig {
        error_mode: ErrorMode::Lenient,
        ..engine_config()
    })
    .unwrap();

    c.set_cursor(5.0, 100.0); // error 1
    c.print_cell(
        "x",
        FontStyle::Regular,
        CellAlign::LEFT_MIDDLE,
        letter_forge::Borders::NONE,
        None,
        -1.0, // error 2
        10.0,
    );
    assert!(matches!(c.error(), Some(LayoutError::InvalidArgument(_))));

    // drawing still works
    c.set_cursor(30.0, 100.0);
    assert_eq!(c.cursor(), (30.0, 100.0));
}

// =====================================================================
// Images
// =====================================================================

#[test]
fn image_registration_is_idempotent_and_placeable() {
    let mut c = composer();
    let uri = png_data_uri(4, 2);

    c.register_image(&uri);
    assert!(c.ok(), "registration failed: {:?}", c.error());
    let extent = c.image_extent(&uri).unwrap();
    assert!((extent.0 - mm(4.0)).abs() < 1e-4);
    assert!((extent.1 - mm(2.0)).abs() < 1e-4);

    // registering again must be a no-op with the identical extent
    c.register_image(&uri);
    assert_eq!(c.image_extent(&uri).unwrap(), extent);

    c.set_unsafe_cursor(190.0, 10.0);
    c.place_image(&uri, Align::Right, 2.0);
    assert!(c.ok(), "placement failed: {:?}", c.error());

    let (bytes, err) = c.finish();
    assert!(err.is_none());
    assert_valid_pdf(&bytes);
}

#[test]
fn unsupported_image_kind_sets_sticky_error() {
    let mut c = composer();
    let uri = format!(
        "data:image/webp;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(b"not really webp")
    );
    c.register_image(&uri);
    assert!(matches!(
        c.error(),
        Some(LayoutError::UnsupportedFormat(_))
    ));
}

// =====================================================================
// Page numbering
// =====================================================================

fn letter_content(footer_lines: &[&str]) -> LetterContent {
    LetterContent::from_json(&format!(
        r#"{{
            "receiverLines": ["Erika Musterfrau", "Heidestraße 17", "51147 Köln"],
            "body": {{ "headline": "Rechnung" }},
            "footer": {{ "left": {} }}
        }}"#,
        serde_json::to_string(footer_lines).unwrap()
    ))
    .unwrap()
}

#[test]
fn single_page_letter_is_not_numbered() {
    let content = letter_content(&["www.example.com"]);
    let config = engine_config();
    let mut c = Composer::new(config.clone()).unwrap();
    let mut driver = PageDriver::new(DinDecorator::new(&content, &config), din::page_frame());

    driver.begin(&mut c);
    let ops_before_finish = c.page_op_count(0).unwrap();
    driver.finish(&mut c);
    assert!(c.ok(), "error: {:?}", c.error());
    assert_eq!(c.page_count(), 1);

    // finish adds the footer band (1 text line + 2 rules) but no number stamp
    let ops_after = c.page_op_count(0).unwrap();
    assert!(ops_after > ops_before_finish);

    // a 2-page document decorated the same way carries the same footer plus
    // a number stamp on its first page, so it must hold strictly more ops
    let mut c2 = Composer::new(config.clone()).unwrap();
    let mut driver2 = PageDriver::new(DinDecorator::new(&content, &config), din::page_frame());
    driver2.begin(&mut c2);
    driver2.break_page(&mut c2);
    driver2.finish(&mut c2);
    assert!(c2.ok());
    assert_eq!(c2.page_count(), 2);
    assert!(
        c2.page_op_count(0).unwrap() > ops_after,
        "a numbered page must carry more ops than an unnumbered one"
    );
}

#[test]
fn three_page_letter_numbers_every_page() {
    let content = letter_content(&["www.example.com", "+49 30 1234567"]);
    let config = engine_config();
    let mut c = Composer::new(config.clone()).unwrap();
    let mut driver = PageDriver::new(DinDecorator::new(&content, &config), din::page_frame());

    driver.begin(&mut c);
    c.set_cursor(25.0, 100.0);
    c.print_text_line("Seite eins", FontStyle::Regular, Align::Left);
    driver.break_page(&mut c);
    c.print_text_line("Seite zwei", FontStyle::Regular, Align::Left);
    driver.break_page(&mut c);
    c.print_text_line("Seite drei", FontStyle::Regular, Align::Left);

    let before: Vec<usize> = (0..3).map(|i| c.page_op_count(i).unwrap()).collect();
    driver.finish(&mut c);
    assert!(c.ok(), "error: {:?}", c.error());
    assert_eq!(c.page_count(), 3);

    // every page gained footer + stamp ops; pages 1 and 2 get their footer
    // during break_page, so after finish the growth on page 3 (footer +
    // stamp) exceeds the growth on page 1 (stamp only)
    let after: Vec<usize> = (0..3).map(|i| c.page_op_count(i).unwrap()).collect();
    for i in 0..3 {
        assert!(after[i] > before[i], "page {i} must gain ops");
    }

    let (bytes, err) = c.finish();
    assert!(err.is_none());
    assert_valid_pdf(&bytes);
}

#[test]
fn overflowing_footer_reports_layout_overflow() {
    struct BadFooter;
    impl PageDecorator for BadFooter {
        fn page_start(&mut self, _c: &mut Composer) {}
        fn page_end(&mut self, _c: &mut Composer, _last: bool) -> f32 {
            50.0 // above the body band
        }
        fn page_number(&mut self, _c: &mut Composer, _p: usize, _t: usize, _y: f32) {
            panic!("a malformed footer must never reach numbering");
        }
    }

    let mut c = composer();
    let mut driver = PageDriver::new(
        BadFooter,
        PageFrame {
            body_start_y: 100.0,
            rule_start_x: 25.0,
            rule_stop_x: 190.0,
            bottom_rule_y: 292.77,
        },
    );
    driver.begin(&mut c);
    let ops_before = c.page_op_count(0).unwrap();
    driver.finish(&mut c);

    assert!(matches!(c.error(), Some(LayoutError::LayoutOverflow { .. })));
    assert_eq!(
        c.page_op_count(0).unwrap(),
        ops_before,
        "no rule lines for a malformed footer"
    );
}

// =====================================================================
// Complete letters
// =====================================================================

#[test]
fn sample_invoice_renders() {
    let content = LetterContent::from_json(letter_forge::templates::invoice_template()).unwrap();
    let rendered = Letter::new(content).render().unwrap();
    assert!(rendered.error.is_none(), "error: {:?}", rendered.error);
    assert_eq!(rendered.pages, 1);
    assert_valid_pdf(&rendered.bytes);
}

#[test]
fn sample_delivery_note_renders() {
    let content =
        LetterContent::from_json(letter_forge::templates::delivery_note_template()).unwrap();
    let rendered = Letter::new(content).render().unwrap();
    assert!(rendered.error.is_none(), "error: {:?}", rendered.error);
    assert_valid_pdf(&rendered.bytes);
}

#[test]
fn sample_table_attachment_renders() {
    let content =
        LetterContent::from_json(letter_forge::templates::table_attachment_template()).unwrap();
    let rendered = Letter::new(content).render().unwrap();
    assert!(rendered.error.is_none(), "error: {:?}", rendered.error);
    assert_valid_pdf(&rendered.bytes);
}

#[test]
fn letter_with_data_uri_logo_renders() {
    let mut content = letter_content(&["www.example.com"]);
    content.logo = Some(letter_forge::content::Logo {
        url: png_data_uri(40, 20),
    });
    let rendered = Letter::new(content).render().unwrap();
    assert!(rendered.error.is_none(), "error: {:?}", rendered.error);
    assert_valid_pdf(&rendered.bytes);
}

#[test]
fn letter_with_unreachable_logo_returns_partial_output() {
    let mut content = letter_content(&["www.example.com"]);
    content.logo = Some(letter_forge::content::Logo {
        url: "ftp://nowhere/logo.png".to_string(),
    });
    let rendered = Letter::new(content).render().unwrap();
    // strict mode: the fetch failure is sticky, but bytes are still handed back
    assert!(matches!(rendered.error, Some(LayoutError::ImageFetch(_))));
    assert_valid_pdf(&rendered.bytes);
}

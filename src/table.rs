//! Table rendering – a header band, wrapped body rows and a summary band,
//! drawn top-to-bottom in one pass over the cursor.
//!
//! A logical body row may wrap into several physical lines when a cell's
//! text contains break markers; all columns of the row then share the same
//! physical line count and only the last physical line carries the bottom
//! border, so a wrapped cell is never split by a rule.

use crate::canvas::{Borders, CellAlign};
use crate::compose::{wrap_lines, Composer};
use crate::config::Color;
use crate::error::LayoutError;
use crate::fonts::FontStyle;

/// Background fill of the header band and the summary's grand-total row.
pub const HEADER_FILL: Color = Color::new(239, 239, 239);

impl Composer {
    /// Check the parallel table slices before anything is drawn. On failure
    /// the sticky error is set and the whole table call is a no-op.
    fn check_table_dimensions(
        &mut self,
        widths: &[f32],
        aligns: &[CellAlign],
        rows: &[Vec<String>],
    ) -> bool {
        if widths.len() != aligns.len() {
            self.set_error(LayoutError::DimensionMismatch {
                left: "column widths",
                left_len: widths.len(),
                right: "column alignments",
                right_len: aligns.len(),
            });
            return false;
        }
        for row in rows {
            if row.len() != widths.len() {
                self.set_error(LayoutError::DimensionMismatch {
                    left: "column widths",
                    left_len: widths.len(),
                    right: "row cells",
                    right_len: row.len(),
                });
                return false;
            }
        }
        let total: f32 = widths.iter().sum();
        if total > self.printable_width() + 1e-3 {
            self.set_error(LayoutError::InvalidArgument(format!(
                "column widths sum to {total}, wider than the printable {}",
                self.printable_width()
            )));
            return false;
        }
        true
    }

    /// Height of one table row with the current font state: glyph height
    /// plus a line gap above and below. Body rows reuse this formula as
    /// evaluated when their call starts, not per row.
    fn table_row_height(&self) -> f32 {
        self.line_height() + self.line_gap() * 2.0
    }

    /// Print the table header band: one bold, filled cell per column with
    /// top and bottom borders. The cursor ends at the row's left edge, one
    /// row height further down.
    pub fn table_header(&mut self, cells: &[String], widths: &[f32], aligns: &[CellAlign]) {
        if self.halted() {
            return;
        }
        if cells.len() != widths.len() {
            self.set_error(LayoutError::DimensionMismatch {
                left: "header cells",
                left_len: cells.len(),
                right: "column widths",
                right_len: widths.len(),
            });
            return;
        }
        if !self.check_table_dimensions(widths, aligns, &[]) {
            return;
        }

        let (reference_x, y) = self.cursor();
        let row_height = self.table_row_height();

        for (i, cell) in cells.iter().enumerate() {
            self.print_cell(
                cell,
                FontStyle::Bold,
                aligns[i],
                Borders::TOP_BOTTOM,
                Some(HEADER_FILL),
                row_height,
                widths[i],
            );
        }
        self.set_cursor(reference_x, y + row_height);
    }

    /// Print the table body. Every cell of a logical row is wrapped
    /// independently; the row occupies as many physical lines as its
    /// tallest cell, with missing segments printed as empty cells.
    pub fn table_body(&mut self, rows: &[Vec<String>], widths: &[f32], aligns: &[CellAlign]) {
        if self.halted() {
            return;
        }
        if !self.check_table_dimensions(widths, aligns, rows) {
            return;
        }

        let (reference_x, _) = self.cursor();
        let row_height = self.table_row_height();

        // TODO break to a fresh page when a row would cross the bottom
        // margin instead of letting set_cursor flag the overflow.
        for row in rows {
            let wrapped: Vec<Vec<&str>> = row.iter().map(|cell| wrap_lines(cell)).collect();
            let physical_lines = wrapped.iter().map(Vec::len).max().unwrap_or(0);

            for line in 0..physical_lines {
                self.table_body_line(
                    &wrapped,
                    line,
                    physical_lines,
                    aligns,
                    row_height,
                    widths,
                    reference_x,
                );
            }
        }
    }

    /// One physical line of a logical body row. The bottom border appears
    /// only on the row's last physical line.
    #[allow(clippy::too_many_arguments)]
    fn table_body_line(
        &mut self,
        wrapped: &[Vec<&str>],
        line: usize,
        physical_lines: usize,
        aligns: &[CellAlign],
        row_height: f32,
        widths: &[f32],
        reference_x: f32,
    ) {
        let borders = if line == physical_lines - 1 {
            Borders::BOTTOM
        } else {
            Borders::NONE
        };
        let (_, y) = self.cursor();
        for (col, cell) in wrapped.iter().enumerate() {
            let text = cell.get(line).copied().unwrap_or("");
            self.print_cell(
                text,
                FontStyle::Regular,
                aligns[col],
                borders,
                None,
                row_height,
                widths[col],
            );
        }
        self.set_cursor(reference_x, y + row_height);
    }

    /// Print the table summary band. The last row is promoted to header
    /// style (bold, filled, top and bottom borders) to mark the grand
    /// total; rows before it are borderless. Empty cells never receive the
    /// promoted style, which keeps spacer columns inert.
    pub fn table_footer(&mut self, rows: &[Vec<String>], widths: &[f32], aligns: &[CellAlign]) {
        if self.halted() {
            return;
        }
        if !self.check_table_dimensions(widths, aligns, rows) {
            return;
        }

        let (reference_x, _) = self.cursor();
        let row_height = self.table_row_height();

        for (index, row) in rows.iter().enumerate() {
            let last = index == rows.len() - 1;
            let (_, y) = self.cursor();
            for (col, cell) in row.iter().enumerate() {
                let (style, borders, fill) = if last && !cell.is_empty() {
                    (FontStyle::Bold, Borders::TOP_BOTTOM, Some(HEADER_FILL))
                } else {
                    (FontStyle::Regular, Borders::NONE, None)
                };
                self.print_cell(cell, style, aligns[col], borders, fill, row_height, widths[col]);
            }
            self.set_cursor(reference_x, y + row_height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneratorConfig, Unit};

    fn composer() -> Composer {
        Composer::new(GeneratorConfig {
            unit: Unit::Mm,
            font_size: 10.0,
            line_gap: 1.3,
            ..GeneratorConfig::din_5008_a()
        })
        .unwrap()
    }

    fn aligns(n: usize) -> Vec<CellAlign> {
        vec![CellAlign::LEFT_MIDDLE; n]
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn header_advances_one_row_height() {
        let mut c = composer();
        c.set_cursor(25.0, 100.0);
        c.table_header(&strings(&["Pos", "Amount"]), &[30.0, 30.0], &aligns(2));
        let row_h = Unit::Mm.from_pt(10.0) + 2.0 * 1.3;
        let (x, y) = c.cursor();
        assert_eq!(x, 25.0);
        assert!((y - (100.0 + row_h)).abs() < 1e-3);
        assert!(c.ok());
    }

    #[test]
    fn header_rejects_mismatched_widths() {
        let mut c = composer();
        c.set_cursor(25.0, 100.0);
        c.table_header(&strings(&["Pos", "Amount"]), &[30.0], &aligns(1));
        assert!(matches!(
            c.error(),
            Some(LayoutError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn body_mismatched_aligns_is_a_no_op() {
        let mut c = composer();
        c.set_cursor(25.0, 100.0);
        let before = c.cursor();
        c.table_body(&[strings(&["a", "b"])], &[30.0, 30.0], &aligns(1));
        assert!(matches!(
            c.error(),
            Some(LayoutError::DimensionMismatch { .. })
        ));
        assert_eq!(c.cursor(), before, "nothing may be partially drawn");
    }

    #[test]
    fn body_row_with_wrapped_cell_occupies_max_lines() {
        let mut c = composer();
        c.set_cursor(25.0, 100.0);
        let row_h = Unit::Mm.from_pt(10.0) + 2.0 * 1.3;
        c.table_body(
            &[vec!["1".to_string(), "first\nsecond\nthird".to_string()]],
            &[20.0, 40.0],
            &aligns(2),
        );
        let (x, y) = c.cursor();
        assert_eq!(x, 25.0);
        assert!(
            (y - (100.0 + 3.0 * row_h)).abs() < 1e-3,
            "3 wrapped lines -> 3 physical rows, got y = {y}"
        );
        assert!(c.ok());
    }

    #[test]
    fn body_rows_share_one_height_even_if_font_changes_between_calls() {
        // the row height is captured when table_body starts, not per row
        let mut c = composer();
        c.set_cursor(25.0, 100.0);
        c.set_font_size(20.0);
        let row_h = Unit::Mm.from_pt(20.0) + 2.0 * 1.3;
        c.table_body(
            &[strings(&["a", "b"]), strings(&["c", "d"])],
            &[30.0, 30.0],
            &aligns(2),
        );
        let (_, y) = c.cursor();
        assert!((y - (100.0 + 2.0 * row_h)).abs() < 1e-3);
    }

    #[test]
    fn footer_renders_summary_rows() {
        let mut c = composer();
        c.set_cursor(25.0, 100.0);
        let rows = vec![
            strings(&["", "Zwischensumme", "100,00€"]),
            strings(&["", "19%", "19,00€"]),
            strings(&["", "Gesamtbetrag", "119,00€"]),
        ];
        let row_h = Unit::Mm.from_pt(10.0) + 2.0 * 1.3;
        c.table_footer(&rows, &[80.0, 40.0, 30.0], &aligns(3));
        let (_, y) = c.cursor();
        assert!((y - (100.0 + 3.0 * row_h)).abs() < 1e-3);
        assert!(c.ok());
    }

    #[test]
    fn widths_exceeding_printable_area_are_rejected() {
        let mut c = composer();
        c.set_cursor(25.0, 100.0);
        // printable width is 210 - 25 - 20 = 165 mm
        c.table_header(&strings(&["a", "b"]), &[100.0, 100.0], &aligns(2));
        assert!(matches!(c.error(), Some(LayoutError::InvalidArgument(_))));
    }
}

//! Generator configuration – units, colors, and the construction-time
//! surface of the layout engine (fonts, margins, line defaults, error mode).

use serde::{Deserialize, Serialize};

use crate::error::ErrorMode;

/// Unit of measure for every coordinate and size in a document, except font
/// sizes which are always points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Pt,
    #[default]
    Mm,
    Cm,
    In,
}

impl Unit {
    fn points_per_unit(self) -> f32 {
        match self {
            Unit::Pt => 1.0,
            Unit::Mm => 72.0 / 25.4,
            Unit::Cm => 72.0 / 2.54,
            Unit::In => 72.0,
        }
    }

    /// Convert a value in this unit to PDF points.
    pub fn to_pt(self, v: f32) -> f32 {
        v * self.points_per_unit()
    }

    /// Convert a value in PDF points to this unit.
    pub fn from_pt(self, pt: f32) -> f32 {
        pt / self.points_per_unit()
    }
}

/// An RGB color, each channel 0–255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::new(0, 0, 0);
}

/// Everything the layout engine needs to know at construction time.
///
/// All lengths except `font_size` are in `unit`; `font_size` is in points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Built-in font family: "Helvetica"/"Arial", "Times" or "Courier".
    pub font_family: String,
    /// Default font size in points.
    pub font_size: f32,
    /// Gap between two text lines, added to the glyph height.
    pub line_gap: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub unit: Unit,
    /// Color used for rules and cell borders unless overridden per call.
    pub line_color: Color,
    /// Width of rules and cell borders. 0 renders a hairline.
    pub line_width: f32,
    pub error_mode: ErrorMode,
}

impl GeneratorConfig {
    /// The DIN 5008 form A letter preset: A4, millimeters, 10 pt text with a
    /// 1.3 mm line gap, margins 25/45/20/0 and a light gray rule color.
    pub fn din_5008_a() -> Self {
        Self {
            title: "letter-forge output".to_string(),
            font_family: "Helvetica".to_string(),
            font_size: 10.0,
            line_gap: 1.3,
            margin_left: 25.0,
            margin_top: 45.0,
            margin_right: 20.0,
            margin_bottom: 0.0,
            unit: Unit::Mm,
            line_color: Color::new(200, 200, 200),
            line_width: 0.4,
            error_mode: ErrorMode::Strict,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::din_5008_a()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_round_trip() {
        for unit in [Unit::Pt, Unit::Mm, Unit::Cm, Unit::In] {
            let v = 12.34f32;
            assert!((unit.from_pt(unit.to_pt(v)) - v).abs() < 1e-4);
        }
    }

    #[test]
    fn millimeter_scale() {
        // 25.4 mm = 1 inch = 72 pt
        assert!((Unit::Mm.to_pt(25.4) - 72.0).abs() < 1e-3);
        assert!((Unit::In.to_pt(1.0) - 72.0).abs() < 1e-6);
    }

    #[test]
    fn config_deserializes_with_partial_fields() {
        let cfg: GeneratorConfig =
            serde_json::from_str(r#"{"fontSize": 12.0, "unit": "pt", "errorMode": "lenient"}"#)
                .unwrap();
        assert_eq!(cfg.font_size, 12.0);
        assert_eq!(cfg.unit, Unit::Pt);
        assert_eq!(cfg.error_mode, ErrorMode::Lenient);
        // untouched fields come from the DIN preset
        assert_eq!(cfg.margin_left, 25.0);
    }
}

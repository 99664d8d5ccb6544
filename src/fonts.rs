//! Font styles and text measurement using `ttf-parser`.
//!
//! The engine works with the PDF built-in font families, so by default the
//! manager carries Helvetica-like synthetic metrics and a per-character
//! advance heuristic. Real TTF bytes can be loaded for a family/style pair
//! to get glyph-accurate widths instead.

use std::collections::HashMap;

use crate::error::LayoutError;

/// Font style flag attached to every text placement.
///
/// The codes mirror the letter content JSON: `""` regular, `"l"` light,
/// `"i"` italic, `"b"` bold, `"m"` medium. The built-in PDF fonts have no
/// light or medium cut, so those map to the regular and bold faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Regular,
    Light,
    Italic,
    Bold,
    Medium,
}

impl FontStyle {
    pub fn from_code(code: &str) -> Result<Self, LayoutError> {
        match code {
            "" => Ok(FontStyle::Regular),
            "l" => Ok(FontStyle::Light),
            "i" => Ok(FontStyle::Italic),
            "b" => Ok(FontStyle::Bold),
            "m" => Ok(FontStyle::Medium),
            other => Err(LayoutError::InvalidArgument(format!(
                "{other:?} is not a font style code of \"\", \"l\", \"i\", \"b\" or \"m\""
            ))),
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::Medium)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic)
    }
}

/// A loaded font face with metrics.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes (kept alive for ttf-parser's zero-copy API).
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
    pub ascender: f32,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct FontKey {
    family: String,
    bold: bool,
    italic: bool,
}

impl FontKey {
    fn new(family: &str, style: FontStyle) -> Self {
        Self {
            family: family.to_ascii_lowercase(),
            bold: style.is_bold(),
            italic: style.is_italic(),
        }
    }
}

/// Manages font metrics for text measurement.
pub struct FontManager {
    fonts: HashMap<FontKey, FontData>,
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }

    /// Load a TTF/OTF font for a family/style pair from bytes.
    pub fn load_font(
        &mut self,
        family: &str,
        style: FontStyle,
        bytes: Vec<u8>,
    ) -> Result<(), LayoutError> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| LayoutError::InvalidArgument(format!("failed to parse font: {e}")))?;

        let data = FontData {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            bytes,
        };
        self.fonts.insert(FontKey::new(family, style), data);
        Ok(())
    }

    /// Measure the width of a string at a given font size, in points.
    ///
    /// With real font bytes loaded the glyph advances are summed; otherwise
    /// an average-character-width heuristic is used (0.5 × size per char for
    /// proportional fonts, ~10 % wider for bold).
    pub fn text_width_pt(&self, text: &str, font_size: f32, family: &str, style: FontStyle) -> f32 {
        let key = FontKey::new(family, style);
        let Some(data) = self.fonts.get(&key) else {
            let avg = if style.is_bold() { 0.55 } else { 0.5 };
            return text.chars().count() as f32 * font_size * avg;
        };

        match ttf_parser::Face::parse(&data.bytes, 0) {
            Ok(face) => {
                let scale = font_size / data.units_per_em;
                let mut width = 0.0f32;
                for ch in text.chars() {
                    if let Some(gid) = face.glyph_index(ch) {
                        width += face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
                    } else {
                        width += font_size * 0.5;
                    }
                }
                width
            }
            Err(_) => text.chars().count() as f32 * font_size * 0.5,
        }
    }

    /// Ascender height in points for the given size, used to place the text
    /// baseline inside a cell. Falls back to the Helvetica-like 0.75 ratio.
    pub fn ascender_pt(&self, font_size: f32, family: &str, style: FontStyle) -> f32 {
        let key = FontKey::new(family, style);
        match self.fonts.get(&key) {
            Some(data) => data.ascender / data.units_per_em * font_size,
            None => font_size * 0.75,
        }
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}

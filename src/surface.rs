//! Drawing surfaces.
//!
//! Coordinates are in mm from the bottom-left corner of the page, font sizes
//! and line widths in points, matching PDF conventions.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::{
    BuiltinFont, Color as PdfColor, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

use crate::error::{AppError, DrawError};
use crate::metrics::Face;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const RED: Color = Color { r: 1.0, g: 0.0, b: 0.0 };
}

/// Page-drawing primitives used by the label renderer.
pub trait Surface {
    fn set_font(&mut self, face: Face, size: f32) -> Result<(), DrawError>;
    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
    /// Draw one line of text with its baseline starting at (x, y).
    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<(), DrawError>;
    /// Outline a rectangle whose bottom-left corner is (x, y).
    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<(), DrawError>;
    fn new_page(&mut self) -> Result<(), DrawError>;
}

// ============================================================================
// PDF Output
// ============================================================================

/// `Surface` writing a PDF with the built-in base-14 fonts.
pub struct PdfSurface {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: HashMap<Face, IndirectFontRef>,
    page_width: f32,
    page_height: f32,
    page_count: usize,
    face: Face,
    size: f32,
}

impl PdfSurface {
    /// Open a document with its first page and the given faces loaded.
    pub fn new(title: &str, page_width: f32, page_height: f32, faces: &[Face]) -> Result<Self, AppError> {
        let (doc, page1, layer1) = PdfDocument::new(title, Mm(page_width), Mm(page_height), "Page 1");
        let layer = doc.get_page(page1).get_layer(layer1);

        let mut fonts = HashMap::new();
        for &face in faces {
            let font = doc
                .add_builtin_font(builtin_font(face))
                .map_err(|e| AppError::PdfError(e.to_string()))?;
            fonts.insert(face, font);
        }

        Ok(Self {
            doc,
            layer,
            fonts,
            page_width,
            page_height,
            page_count: 1,
            face: Face::Helvetica,
            size: 12.0,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Write the document to `path`. Consumes the surface.
    pub fn save(self, path: &Path) -> Result<(), AppError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.doc
            .save(&mut writer)
            .map_err(|e| AppError::PdfError(e.to_string()))
    }

    fn font(&mut self, face: Face) -> Result<IndirectFontRef, DrawError> {
        if let Some(font) = self.fonts.get(&face) {
            return Ok(font.clone());
        }
        let font = self
            .doc
            .add_builtin_font(builtin_font(face))
            .map_err(|e| DrawError::Surface(e.to_string()))?;
        self.fonts.insert(face, font.clone());
        Ok(font)
    }
}

impl Surface for PdfSurface {
    fn set_font(&mut self, face: Face, size: f32) -> Result<(), DrawError> {
        self.font(face)?;
        self.face = face;
        self.size = size;
        Ok(())
    }

    fn set_fill_color(&mut self, color: Color) {
        self.layer.set_fill_color(pdf_color(color));
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.layer.set_outline_color(pdf_color(color));
    }

    fn set_line_width(&mut self, width: f32) {
        self.layer.set_outline_thickness(width);
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<(), DrawError> {
        if let Some(c) = text.chars().find(|&c| !is_win_ansi(c)) {
            return Err(DrawError::UnencodableText {
                code: c as u32,
                face: self.face.name(),
            });
        }
        let font = self.font(self.face)?;
        self.layer.use_text(text, self.size, Mm(x), Mm(y), &font);
        Ok(())
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<(), DrawError> {
        let corners = [(x, y), (x + width, y), (x + width, y + height), (x, y + height)];
        let line = Line {
            points: corners
                .iter()
                .map(|&(px, py)| (Point::new(Mm(px), Mm(py)), false))
                .collect(),
            is_closed: true,
        };
        self.layer.add_line(line);
        Ok(())
    }

    fn new_page(&mut self) -> Result<(), DrawError> {
        self.page_count += 1;
        let (page, layer) = self.doc.add_page(
            Mm(self.page_width),
            Mm(self.page_height),
            format!("Page {}", self.page_count),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        Ok(())
    }
}

fn builtin_font(face: Face) -> BuiltinFont {
    match face {
        Face::TimesRoman => BuiltinFont::TimesRoman,
        Face::TimesBold => BuiltinFont::TimesBold,
        Face::Helvetica => BuiltinFont::Helvetica,
        Face::HelveticaBold => BuiltinFont::HelveticaBold,
        Face::Courier => BuiltinFont::Courier,
        Face::CourierBold => BuiltinFont::CourierBold,
    }
}

fn pdf_color(color: Color) -> PdfColor {
    PdfColor::Rgb(Rgb::new(color.r, color.g, color.b, None))
}

/// Characters the base-14 fonts can show under WinAnsiEncoding.
fn is_win_ansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{a0}'..='\u{ff}')
        || matches!(
            c,
            '€' | '‚' | 'ƒ' | '„' | '…' | '†' | '‡' | 'ˆ' | '‰' | 'Š' | '‹' | 'Œ' | 'Ž'
                | '‘' | '’' | '“' | '”' | '•' | '–' | '—' | '˜' | '™' | 'š' | '›' | 'œ'
                | 'ž' | 'Ÿ'
        )
}

// ============================================================================
// In-memory Recording
// ============================================================================

/// One recorded drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        face: Face,
        size: f32,
        color: Color,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
        line_width: f32,
    },
}

/// `Surface` that keeps every primitive in memory, page by page.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pages: Vec<Vec<DrawOp>>,
    face: Face,
    size: f32,
    fill: Color,
    stroke: Color,
    line_width: f32,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            pages: vec![Vec::new()],
            face: Face::Helvetica,
            size: 12.0,
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
        }
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[Vec<DrawOp>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text drawn on `page`, in drawing order.
    pub fn texts(&self, page: usize) -> Vec<&str> {
        self.pages[page]
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Rect { .. } => None,
            })
            .collect()
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }
}

impl Surface for RecordingSurface {
    fn set_font(&mut self, face: Face, size: f32) -> Result<(), DrawError> {
        self.face = face;
        self.size = size;
        Ok(())
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stroke = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<(), DrawError> {
        self.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            face: self.face,
            size: self.size,
            color: self.fill,
        });
        Ok(())
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<(), DrawError> {
        self.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            color: self.stroke,
            line_width: self.line_width,
        });
        Ok(())
    }

    fn new_page(&mut self) -> Result<(), DrawError> {
        self.pages.push(Vec::new());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_ansi_coverage() {
        for c in ['a', 'Z', '~', ' ', 'ä', 'ß', '°', '€', '–', '“'] {
            assert!(is_win_ansi(c), "{c:?} should be encodable");
        }
        for c in ['\n', '\u{7f}', '中', 'ł', '\u{2009}'] {
            assert!(!is_win_ansi(c), "{c:?} should not be encodable");
        }
    }

    #[test]
    fn test_recording_tracks_state_and_pages() {
        let mut surface = RecordingSurface::new();
        surface.set_font(Face::TimesBold, 9.0).unwrap();
        surface.set_fill_color(Color::RED);
        surface.draw_text(1.0, 2.0, "Description:").unwrap();
        surface.new_page().unwrap();
        surface.set_line_width(0.5);
        surface.stroke_rect(0.0, 0.0, 10.0, 5.0).unwrap();

        assert_eq!(surface.page_count(), 2);
        assert_eq!(
            surface.pages()[0][0],
            DrawOp::Text {
                x: 1.0,
                y: 2.0,
                text: "Description:".into(),
                face: Face::TimesBold,
                size: 9.0,
                color: Color::RED,
            }
        );
        assert_eq!(surface.texts(1), Vec::<&str>::new());
        assert!(matches!(surface.pages()[1][0], DrawOp::Rect { line_width, .. } if line_width == 0.5));
    }

    #[test]
    fn test_pdf_surface_rejects_unencodable_text() {
        let mut surface = PdfSurface::new("test", 297.0, 210.0, &[Face::TimesRoman]).unwrap();
        surface.set_font(Face::TimesRoman, 9.0).unwrap();
        surface.draw_text(10.0, 10.0, "Rosaceae äöü").unwrap();
        let err = surface.draw_text(10.0, 20.0, "植物").unwrap_err();
        assert_eq!(
            err,
            DrawError::UnencodableText {
                code: 0x690D,
                face: "Times-Roman",
            }
        );
        surface.new_page().unwrap();
        assert_eq!(surface.page_count(), 2);
    }
}

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::metrics::FontFamily;

// ============================================================================
// Constants
// ============================================================================

/// A4 landscape dimensions in mm
pub const PAGE_WIDTH_MM: f32 = 297.0;
pub const PAGE_HEIGHT_MM: f32 = 210.0;

/// Labels per page, arranged as a 2x2 grid
pub const GRID_COLS: usize = 2;
pub const GRID_ROWS: usize = 2;
pub const LABELS_PER_PAGE: usize = GRID_COLS * GRID_ROWS;

// ============================================================================
// Layout Description
// ============================================================================

/// One field within a row band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Field {
    /// Display name, e.g. "Family"
    pub name: String,
    /// Column key in the data, e.g. "family"
    pub column: String,
    /// Relative width within the row
    #[serde(default = "default_weight")]
    pub width: f32,
}

/// A horizontal band of fields with a fixed height (mm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Row {
    pub fields: Vec<Field>,
    #[serde(default = "default_row_height")]
    pub height: f32,
}

/// Free-text area sharing the space left below the rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextBlock {
    pub name: String,
    pub column: String,
    /// Relative height compared to the other text blocks
    #[serde(default = "default_weight")]
    pub height: f32,
}

/// Complete label layout. Lengths in mm, font sizes in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LabelConfig {
    pub label_width: f32,
    pub label_height: f32,
    pub margin: f32,
    /// Horizontal space between fields of a row
    pub field_spacing: f32,
    pub font_family: FontFamily,
    /// Size of field names
    pub label_font_size: f32,
    /// Size of values and text-block headings
    pub value_font_size: f32,
    /// Declared for layouts that carry it; text is never shrunk to fit.
    pub min_font_size: f32,
    pub rows: Vec<Row>,
    pub text_blocks: Vec<TextBlock>,
}

fn default_weight() -> f32 {
    1.0
}

fn default_row_height() -> f32 {
    7.5
}

impl Field {
    pub fn new(name: &str, column: &str, width: f32) -> Self {
        Self {
            name: name.to_string(),
            column: column.to_string(),
            width,
        }
    }
}

impl TextBlock {
    pub fn new(name: &str, column: &str, height: f32) -> Self {
        Self {
            name: name.to_string(),
            column: column.to_string(),
            height,
        }
    }
}

impl Row {
    pub fn new(fields: Vec<Field>, height: f32) -> Self {
        Self { fields, height }
    }

    /// Four equal-width fields.
    fn quarters(fields: [(&str, &str); 4]) -> Self {
        Self::new(
            fields
                .iter()
                .map(|(name, column)| Field::new(name, column, 0.25))
                .collect(),
            7.5,
        )
    }
}

impl Default for LabelConfig {
    /// Herbarium sheet label: 140 x 100 mm, four rows of collection data
    /// followed by colour and description blocks.
    fn default() -> Self {
        Self {
            label_width: 140.0,
            label_height: 100.0,
            margin: 4.0,
            field_spacing: 1.0,
            font_family: FontFamily::Times,
            label_font_size: 7.0,
            value_font_size: 9.0,
            min_font_size: 5.0,
            rows: vec![
                Row::quarters([
                    ("Family", "family"),
                    ("Genera", "genera"),
                    ("Species", "species"),
                    ("Subspecies", "subspecies"),
                ]),
                Row::quarters([
                    ("ID", "id"),
                    ("Date", "date"),
                    ("Elevation", "elevation"),
                    ("Reference", "reference"),
                ]),
                Row::quarters([
                    ("DD-Latitude", "dd-latitude"),
                    ("DD-Longitude", "dd-longitude"),
                    ("Anthesis", "anthesis"),
                    ("Fruit/Seed", "fruit/seed"),
                ]),
                Row::quarters([
                    ("Complete Specimen", "complete specimen"),
                    ("Coverage Species", "coverage species"),
                    ("Coverage Vegetation", "coverage vegetation"),
                    ("Variant", "variant"),
                ]),
            ],
            text_blocks: vec![
                TextBlock::new("Color Information", "color_information", 0.8),
                TextBlock::new("Description", "description", 2.2),
            ],
        }
    }
}

impl LabelConfig {
    /// Read a JSON layout file. Missing keys fall back to the default layout.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::ConfigError(format!("{}: {}", path.display(), e)))?;
        let config: LabelConfig = serde_json::from_str(&content)
            .map_err(|e| AppError::ConfigError(format!("Invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Every column key the layout reads, rows first, then text blocks.
    pub fn required_columns(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .flat_map(|row| row.fields.iter().map(|f| f.column.as_str()))
            .chain(self.text_blocks.iter().map(|b| b.column.as_str()))
            .collect()
    }

    pub fn inner_width(&self) -> f32 {
        self.label_width - 2.0 * self.margin
    }

    /// Vertical space left for text blocks once the rows are laid out.
    pub fn text_block_space(&self) -> f32 {
        let rows: f32 = self.rows.iter().map(|r| r.height).sum();
        self.label_height - 2.0 * self.margin - rows
    }

    /// Check the layout's geometric invariants.
    pub fn validate(&self) -> Result<(), AppError> {
        let positive = [
            ("label_width", self.label_width),
            ("label_height", self.label_height),
            ("label_font_size", self.label_font_size),
            ("value_font_size", self.value_font_size),
            ("min_font_size", self.min_font_size),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(AppError::ConfigError(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.margin < 0.0 || self.field_spacing < 0.0 {
            return Err(AppError::ConfigError("margin and field_spacing must not be negative".into()));
        }
        if self.inner_width() <= 0.0 {
            return Err(AppError::ConfigError(format!(
                "margin {}mm leaves no room inside a {}mm wide label",
                self.margin, self.label_width
            )));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if !(row.height > 0.0) {
                return Err(AppError::ConfigError(format!("row {} has non-positive height", i + 1)));
            }
            if let Some(field) = row.fields.iter().find(|f| !(f.width > 0.0)) {
                return Err(AppError::ConfigError(format!("field '{}' has non-positive width", field.name)));
            }
            let spacing = self.field_spacing * row.fields.len().saturating_sub(1) as f32;
            if spacing >= self.inner_width() {
                return Err(AppError::ConfigError(format!(
                    "row {} field spacing exceeds the label width",
                    i + 1
                )));
            }
        }
        if let Some(block) = self.text_blocks.iter().find(|b| !(b.height > 0.0)) {
            return Err(AppError::ConfigError(format!("text block '{}' has non-positive height", block.name)));
        }
        let remaining = self.text_block_space();
        if remaining < 0.0 {
            return Err(AppError::ConfigError(format!(
                "rows need {:.2}mm more than the label height allows",
                -remaining
            )));
        }
        Ok(())
    }
}

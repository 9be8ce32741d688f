//! Label composition.
//!
//! All positions are bottom-left origins in mm. Every function draws
//! straight onto the surface and returns the first drawing error unchanged.

use crate::config::{LabelConfig, Row, TextBlock};
use crate::data::Specimen;
use crate::error::DrawError;
use crate::metrics::pt_to_mm;
use crate::surface::{Color, Surface};
use crate::wrap::wrap_text;

/// Inset of text from the edges of its box, in points
const TEXT_INSET_PT: f32 = 2.0;

/// Line advance as a multiple of the font size
const FIELD_LINE_SPACING: f32 = 1.1;
const BLOCK_LINE_SPACING: f32 = 1.2;

/// Distance from the top of a text block to its first body baseline,
/// in multiples of the value font size
const BLOCK_BODY_OFFSET: f32 = 2.5;

/// Value lines shown per field; the rest is dropped.
pub const MAX_VALUE_LINES: usize = 2;

const BORDER_WIDTH_PT: f32 = 0.5;

/// Split `total` into parts proportional to `weights`, with `spacing`
/// reserved between neighbouring parts.
pub fn split_proportionally(total: f32, weights: &[f32], spacing: f32) -> Vec<f32> {
    if weights.is_empty() {
        return Vec::new();
    }
    let available = total - spacing * (weights.len() - 1) as f32;
    let sum: f32 = weights.iter().sum();
    weights.iter().map(|w| available * w / sum).collect()
}

/// Whether a cell holds something worth printing.
pub fn is_present(value: &str) -> bool {
    !value.is_empty() && value != "nan"
}

/// Draw one row band whose bottom-left corner is (x, y).
pub fn draw_info_row<S: Surface + ?Sized>(
    surface: &mut S,
    config: &LabelConfig,
    row: &Row,
    specimen: &Specimen,
    x: f32,
    y: f32,
    width: f32,
) -> Result<(), DrawError> {
    let face = config.font_family.regular();
    let inset = pt_to_mm(TEXT_INSET_PT);
    let weights: Vec<f32> = row.fields.iter().map(|f| f.width).collect();
    let widths = split_proportionally(width, &weights, config.field_spacing);

    let mut current_x = x;
    for (field, field_width) in row.fields.iter().zip(widths) {
        let value = specimen.get(&field.column);
        if is_present(value) {
            surface.set_fill_color(Color::BLACK);

            // Field name, top-aligned; the colon goes after the last line
            let size = config.label_font_size;
            let line_height = pt_to_mm(size * FIELD_LINE_SPACING);
            let name_lines = wrap_text(&field.name, face, size, field_width);
            surface.set_font(face, size)?;
            let mut name_y = y + row.height - inset - line_height;
            let last = name_lines.len() - 1;
            for (i, line) in name_lines.iter().enumerate() {
                if i == last {
                    surface.draw_text(current_x, name_y, &format!("{}:", line))?;
                } else {
                    surface.draw_text(current_x, name_y, line)?;
                }
                name_y -= line_height;
            }

            // Value, bottom-aligned
            let size = config.value_font_size;
            let line_height = pt_to_mm(size * FIELD_LINE_SPACING);
            let mut value_lines = wrap_text(value, face, size, field_width);
            value_lines.truncate(MAX_VALUE_LINES);
            surface.set_font(face, size)?;
            let mut value_y = y + inset + (value_lines.len() - 1) as f32 * line_height;
            for line in &value_lines {
                surface.draw_text(current_x, value_y, line)?;
                value_y -= line_height;
            }
        }
        current_x += field_width + config.field_spacing;
    }
    Ok(())
}

/// Draw a text block occupying `height` mm above (x, y).
pub fn draw_text_block<S: Surface + ?Sized>(
    surface: &mut S,
    config: &LabelConfig,
    block: &TextBlock,
    specimen: &Specimen,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> Result<(), DrawError> {
    let size = config.value_font_size;
    let inset = pt_to_mm(TEXT_INSET_PT);
    let top = y + height;

    surface.set_fill_color(Color::BLACK);
    surface.set_font(config.font_family.bold(), size)?;
    surface.draw_text(x, top - pt_to_mm(size) - inset, &format!("{}:", block.name))?;

    let value = specimen.get(&block.column);
    if !is_present(value) {
        return Ok(());
    }

    let face = config.font_family.regular();
    surface.set_font(face, size)?;
    let line_height = pt_to_mm(size * BLOCK_LINE_SPACING);
    let mut line_y = top - pt_to_mm(size * BLOCK_BODY_OFFSET);
    for line in wrap_text(value, face, size, width - 2.0 * inset) {
        if line_y < y + inset {
            break;
        }
        surface.draw_text(x + inset, line_y, &line)?;
        line_y -= line_height;
    }
    Ok(())
}

/// Draw a full label whose bottom-left corner is (x, y).
pub fn draw_label<S: Surface + ?Sized>(
    surface: &mut S,
    config: &LabelConfig,
    specimen: &Specimen,
    x: f32,
    y: f32,
) -> Result<(), DrawError> {
    surface.set_stroke_color(Color::BLACK);
    surface.set_line_width(BORDER_WIDTH_PT);
    surface.stroke_rect(x, y, config.label_width, config.label_height)?;

    let inner_x = x + config.margin;
    let inner_width = config.inner_width();
    let mut current_y = y + config.label_height - config.margin;

    for row in &config.rows {
        current_y -= row.height;
        draw_info_row(surface, config, row, specimen, inner_x, current_y, inner_width)?;
    }

    let remaining = current_y - y - config.margin;
    let weights: Vec<f32> = config.text_blocks.iter().map(|b| b.height).collect();
    let heights = split_proportionally(remaining, &weights, 0.0);
    for (block, block_height) in config.text_blocks.iter().zip(heights) {
        current_y -= block_height;
        draw_text_block(surface, config, block, specimen, inner_x, current_y, inner_width, block_height)?;
    }
    Ok(())
}

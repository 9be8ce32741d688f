use crate::config::{LabelConfig, GRID_COLS, GRID_ROWS, LABELS_PER_PAGE};
use crate::data::Specimen;
use crate::error::{AppError, DrawError};
use crate::metrics::{pt_to_mm, Face};
use crate::render::draw_label;
use crate::surface::{Color, Surface};

/// Longest error text shown on a placeholder
const ERROR_MESSAGE_CHARS: usize = 50;
const ERROR_FONT_SIZE: f32 = 8.0;

/// Position of the 2x2 grid cells on a page, gaps evenly distributed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub label_width: f32,
    pub label_height: f32,
    pub h_gap: f32,
    pub v_gap: f32,
}

/// Where a specimen lands: page, column (0 = left), row (0 = top).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub page: usize,
    pub column: usize,
    pub row: usize,
}

/// A label that could not be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelFailure {
    /// 0-based specimen index
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub labels: usize,
    pub pages: usize,
    pub grid: GridLayout,
    pub failures: Vec<LabelFailure>,
}

impl GridLayout {
    /// Fails when two labels side by side (or stacked) exceed the page.
    pub fn new(config: &LabelConfig, page_width: f32, page_height: f32) -> Result<Self, AppError> {
        let h_gap = (page_width - GRID_COLS as f32 * config.label_width) / (GRID_COLS + 1) as f32;
        let v_gap = (page_height - GRID_ROWS as f32 * config.label_height) / (GRID_ROWS + 1) as f32;
        if h_gap < 0.0 || v_gap < 0.0 {
            return Err(AppError::LayoutError { h_gap, v_gap });
        }
        Ok(Self {
            label_width: config.label_width,
            label_height: config.label_height,
            h_gap,
            v_gap,
        })
    }

    /// Bottom-left corner of a grid cell.
    pub fn origin(&self, column: usize, row: usize) -> (f32, f32) {
        let x = self.h_gap + column as f32 * (self.label_width + self.h_gap);
        let y = self.v_gap + (GRID_ROWS - 1 - row) as f32 * (self.label_height + self.v_gap);
        (x, y)
    }
}

impl Placement {
    /// Fill pages left to right, then top to bottom.
    pub fn for_index(index: usize) -> Self {
        let slot = index % LABELS_PER_PAGE;
        Self {
            page: index / LABELS_PER_PAGE,
            column: slot % GRID_COLS,
            row: slot / GRID_COLS,
        }
    }
}

pub fn page_count(labels: usize) -> usize {
    labels.div_ceil(LABELS_PER_PAGE)
}

/// Lay out every specimen onto `surface`, which must be positioned on a
/// fresh first page. A label that fails to draw is replaced by a red
/// placeholder; only an empty table or a failure to start a new page aborts.
pub fn render_specimens<S: Surface + ?Sized>(
    surface: &mut S,
    config: &LabelConfig,
    grid: &GridLayout,
    specimens: &[Specimen],
) -> Result<RenderSummary, AppError> {
    // The surface already holds a first page, which would be left blank
    if specimens.is_empty() {
        return Err(AppError::NoSpecimens);
    }
    let mut failures = Vec::new();

    for (index, specimen) in specimens.iter().enumerate() {
        let placement = Placement::for_index(index);
        if index > 0 && placement.column == 0 && placement.row == 0 {
            surface
                .new_page()
                .map_err(|e| AppError::PdfError(format!("cannot start page {}: {}", placement.page + 1, e)))?;
            log::debug!("started page {}", placement.page + 1);
        }

        let (x, y) = grid.origin(placement.column, placement.row);
        if let Err(e) = draw_label(surface, config, specimen, x, y) {
            log::warn!("Error drawing label {}: {}", index + 1, e);
            let message = e.to_string();
            if let Err(placeholder_err) = draw_error_placeholder(surface, grid, x, y, &message) {
                log::error!("cannot mark failed label {}: {}", index + 1, placeholder_err);
            }
            failures.push(LabelFailure { index, message });
        }
    }

    Ok(RenderSummary {
        labels: specimens.len(),
        pages: page_count(specimens.len()),
        grid: *grid,
        failures,
    })
}

fn draw_error_placeholder<S: Surface + ?Sized>(
    surface: &mut S,
    grid: &GridLayout,
    x: f32,
    y: f32,
    message: &str,
) -> Result<(), DrawError> {
    surface.set_stroke_color(Color::RED);
    surface.set_fill_color(Color::RED);
    surface.stroke_rect(x, y, grid.label_width, grid.label_height)?;
    surface.set_font(Face::Helvetica, ERROR_FONT_SIZE)?;
    surface.draw_text(
        x + pt_to_mm(5.0),
        y + grid.label_height - pt_to_mm(15.0),
        &format!("Error: {}", placeholder_text(message)),
    )
}

/// First characters of an error message, reduced to printable ASCII.
fn placeholder_text(message: &str) -> String {
    message
        .chars()
        .take(ERROR_MESSAGE_CHARS)
        .map(|c| match c {
            c if c.is_ascii_graphic() || c == ' ' => c,
            c if c.is_whitespace() => ' ',
            _ => '?',
        })
        .collect()
}

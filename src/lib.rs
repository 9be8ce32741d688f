//! herbarium-labels: render specimen tables as printable herbarium labels,
//! four to an A4 landscape page.

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod paginate;
pub mod render;
pub mod surface;
pub mod wrap;

use std::path::Path;

pub use config::{Field, LabelConfig, Row, TextBlock, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
pub use data::{load_specimens, LoadOptions, Specimen, SpecimenTable};
pub use error::{AppError, DrawError};
pub use metrics::{Face, FontFamily};
pub use paginate::{render_specimens, GridLayout, RenderSummary};
pub use surface::{PdfSurface, RecordingSurface, Surface};

/// Check the layout against the page. Runs before any output is opened.
pub fn prepare_layout(config: &LabelConfig) -> Result<GridLayout, AppError> {
    config.validate()?;
    GridLayout::new(config, PAGE_WIDTH_MM, PAGE_HEIGHT_MM)
}

/// Render all specimens into a PDF at `output_path`.
pub fn generate_pdf(
    config: &LabelConfig,
    specimens: &[Specimen],
    title: &str,
    output_path: &Path,
) -> Result<RenderSummary, AppError> {
    let grid = prepare_layout(config)?;

    let faces = [
        config.font_family.regular(),
        config.font_family.bold(),
        Face::Helvetica,
    ];
    let mut surface = PdfSurface::new(title, PAGE_WIDTH_MM, PAGE_HEIGHT_MM, &faces)?;
    let summary = render_specimens(&mut surface, config, &grid, specimens)?;
    surface.save(output_path)?;

    Ok(summary)
}

/// Lay out every label in memory without writing a file.
pub fn dry_run(config: &LabelConfig, specimens: &[Specimen]) -> Result<(RenderSummary, RecordingSurface), AppError> {
    let grid = prepare_layout(config)?;
    let mut surface = RecordingSurface::new();
    let summary = render_specimens(&mut surface, config, &grid, specimens)?;
    Ok((summary, surface))
}

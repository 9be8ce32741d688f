use thiserror::Error;

/// Fatal errors. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Error loading file: {0}")]
    LoadError(String),
    #[error(
        "Labels do not fit on page! h_gap={h_gap:.2}mm, v_gap={v_gap:.2}mm. \
         Reduce label size or check page orientation."
    )]
    LayoutError { h_gap: f32, v_gap: f32 },
    #[error("No specimens to render: the table has no data rows")]
    NoSpecimens,
    #[error("Invalid label layout: {0}")]
    ConfigError(String),
    #[error("Failed to create PDF: {0}")]
    PdfError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failure while drawing a single label. Caught by the paginator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrawError {
    #[error("cannot encode U+{code:04X} in {face}")]
    UnencodableText { code: u32, face: &'static str },
    #[error("{0}")]
    Surface(String),
}

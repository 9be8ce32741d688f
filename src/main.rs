// herbarium-labels: Generate herbarium specimen labels, 4 per A4 page

use std::path::{Path, PathBuf};

use clap::Parser;
use herbarium_labels::{dry_run, generate_pdf, load_specimens, AppError, LabelConfig, LoadOptions, RenderSummary};

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate herbarium specimen labels (4 per landscape A4 page)")]
struct Args {
    /// Specimen table (CSV, TSV, XLSX, XLS or ODS)
    input: PathBuf,

    /// Output filename (defaults to {input}-labels.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Label layout file (JSON); the built-in herbarium layout is used otherwise
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Field delimiter for text tables (defaults to ',' or tab for .tsv)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// PDF document title
    #[arg(long, default_value = "Herbarium Labels")]
    title: String,

    /// Lay out all labels and report, without writing a PDF
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();

    let config = match &args.layout {
        Some(path) => LabelConfig::from_json_file(path)?,
        None => LabelConfig::default(),
    };

    let options = LoadOptions {
        delimiter: parse_delimiter(args.delimiter)?,
    };
    let table = load_specimens(&args.input, &config, options)?;
    println!("✓ Loaded {} specimens", table.specimens.len());
    println!("✓ Columns: {}", table.columns.join(", "));

    if args.dry_run {
        let (summary, _) = dry_run(&config, &table.specimens)?;
        print_summary(&summary);
        return Ok(());
    }

    let output_file = args.output.unwrap_or_else(|| default_output(&args.input));
    let summary = generate_pdf(&config, &table.specimens, &args.title, &output_file)?;

    println!("✓ PDF generated: {}", output_file.display());
    print_summary(&summary);

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_delimiter(delimiter: Option<char>) -> Result<Option<u8>, AppError> {
    match delimiter {
        Some(c) if c.is_ascii() => Ok(Some(c as u8)),
        Some(c) => Err(AppError::LoadError(format!("delimiter must be a single ASCII character, got {:?}", c))),
        None => Ok(None),
    }
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("herbarium");
    PathBuf::from(format!("{}-labels.pdf", stem))
}

fn print_summary(summary: &RenderSummary) {
    println!("✓ Total labels: {}", summary.labels);
    println!("✓ Pages: {}", summary.pages);
    println!("✓ Layout: 2 columns × 2 rows per page (landscape A4)");
    println!(
        "✓ Gaps: horizontal={:.2}cm, vertical={:.2}cm",
        summary.grid.h_gap / 10.0,
        summary.grid.v_gap / 10.0
    );
    if !summary.failures.is_empty() {
        println!("⚠ {} label(s) could not be drawn:", summary.failures.len());
        for failure in &summary.failures {
            println!("  label {}: {}", failure.index + 1, failure.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_uses_input_stem() {
        assert_eq!(default_output(Path::new("data/Herbar.csv")), PathBuf::from("Herbar-labels.pdf"));
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(Some(';')).unwrap(), Some(b';'));
        assert_eq!(parse_delimiter(None).unwrap(), None);
        assert!(parse_delimiter(Some('§')).is_err());
    }
}

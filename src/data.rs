use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDateTime, Timelike};

use crate::config::LabelConfig;
use crate::error::AppError;

/// One row of the source table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Specimen {
    values: HashMap<String, String>,
}

impl Specimen {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Value for a column key; absent columns read as "".
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Specimen {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Loaded table: header columns in source order plus the specimens.
#[derive(Debug, Clone, Default)]
pub struct SpecimenTable {
    pub columns: Vec<String>,
    pub specimens: Vec<Specimen>,
}

/// How to read the input file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Field delimiter for text tables; guessed from the extension if unset
    pub delimiter: Option<u8>,
}

impl SpecimenTable {
    /// Load a CSV/TSV or spreadsheet file.
    pub fn load(path: &Path, options: LoadOptions) -> Result<Self, AppError> {
        if !path.exists() {
            return Err(AppError::LoadError(format!("{}: file not found", path.display())));
        }
        let table = if is_spreadsheet(path) {
            load_spreadsheet(path)?
        } else {
            let delimiter = options.delimiter.unwrap_or_else(|| default_delimiter(path));
            let file = std::fs::File::open(path)
                .map_err(|e| AppError::LoadError(format!("{}: {}", path.display(), e)))?;
            Self::from_csv_reader(file, delimiter)
                .map_err(|e| AppError::LoadError(format!("{}: {}", path.display(), e)))?
        };
        log::info!("loaded {} specimens from {}", table.specimens.len(), path.display());
        Ok(table)
    }

    /// Parse delimited text with a header row.
    pub fn from_csv_reader<R: std::io::Read>(reader: R, delimiter: u8) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);
        let columns: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        warn_duplicate_columns(&columns);
        let mut specimens = Vec::new();
        for record in rdr.records() {
            let record = record?;
            specimens.push(Self::specimen_from_cells(
                &columns,
                record.iter().map(str::to_string),
            ));
        }
        Ok(Self { columns, specimens })
    }

    /// Pair cells with their header. When a header repeats, the first
    /// column of that name keeps the value.
    fn specimen_from_cells(columns: &[String], cells: impl Iterator<Item = String>) -> Specimen {
        let mut cells = cells;
        let mut values = HashMap::with_capacity(columns.len());
        for column in columns {
            let cell = cells.next().unwrap_or_default();
            values.entry(column.clone()).or_insert(cell);
        }
        Specimen::new(values)
    }

    /// Configured columns absent from the header.
    pub fn missing_columns<'a>(&self, config: &'a LabelConfig) -> BTreeSet<&'a str> {
        config
            .required_columns()
            .into_iter()
            .filter(|column| !self.columns.iter().any(|c| c.as_str() == *column))
            .collect()
    }
}

/// Load the table and warn about any configured column the file lacks.
pub fn load_specimens(path: &Path, config: &LabelConfig, options: LoadOptions) -> Result<SpecimenTable, AppError> {
    let table = SpecimenTable::load(path, options)?;
    let missing = table.missing_columns(config);
    if !missing.is_empty() {
        let list: Vec<&str> = missing.into_iter().collect();
        log::warn!("Missing columns: {}", list.join(", "));
    }
    Ok(table)
}

/// Header names that occur more than once.
fn duplicate_columns(columns: &[String]) -> BTreeSet<&str> {
    let mut seen = BTreeSet::new();
    columns
        .iter()
        .map(String::as_str)
        .filter(|column| !seen.insert(*column))
        .collect()
}

fn warn_duplicate_columns(columns: &[String]) {
    let duplicates = duplicate_columns(columns);
    if !duplicates.is_empty() {
        let list: Vec<&str> = duplicates.into_iter().collect();
        log::warn!("Duplicate columns (first one is used): {}", list.join(", "));
    }
}

fn is_spreadsheet(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods"))
}

fn default_delimiter(path: &Path) -> u8 {
    match extension(path).as_deref() {
        Some("tsv" | "tab") => b'\t',
        _ => b',',
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn load_spreadsheet(path: &Path) -> Result<SpecimenTable, AppError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::LoadError(format!("{}: {}", path.display(), e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::LoadError(format!("{}: workbook has no sheets", path.display())))?
        .map_err(|e| AppError::LoadError(format!("{}: {}", path.display(), e)))?;

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(cell_text).collect(),
        None => return Ok(SpecimenTable::default()),
    };
    warn_duplicate_columns(&columns);
    let specimens = rows
        .map(|row| SpecimenTable::specimen_from_cells(&columns, row.iter().map(cell_text)))
        .collect();
    Ok(SpecimenTable { columns, specimens })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::DateTime(dt) if !dt.is_duration() => match dt.as_datetime() {
            Some(datetime) => date_text(datetime),
            None => dt.to_string(),
        },
        other => other.to_string(),
    }
}

/// Dates without a time of day print as `YYYY-MM-DD`.
fn date_text(datetime: NaiveDateTime) -> String {
    if datetime.num_seconds_from_midnight() == 0 {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    const CSV: &str = "\
family,genera,species,dd-latitude,fruit/seed,description
Rosaceae,Rosa,canina,47.25,yes,Shrub with arching stems
Plantaginaceae,Plantago,lanceolata,,,
";

    #[test]
    fn test_parse_csv_keeps_literal_columns() {
        let table = SpecimenTable::from_csv_reader(CSV.as_bytes(), b',').unwrap();
        assert_eq!(table.columns[3], "dd-latitude");
        assert_eq!(table.columns[4], "fruit/seed");
        assert_eq!(table.specimens.len(), 2);
        assert_eq!(table.specimens[0].get("genera"), "Rosa");
        assert_eq!(table.specimens[0].get("fruit/seed"), "yes");
    }

    #[test]
    fn test_empty_and_absent_cells_read_as_empty() {
        let table = SpecimenTable::from_csv_reader(CSV.as_bytes(), b',').unwrap();
        assert_eq!(table.specimens[1].get("dd-latitude"), "");
        assert_eq!(table.specimens[1].get("description"), "");
        assert_eq!(table.specimens[1].get("elevation"), "");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let data = "id;date;reference\nH-1;2024-05-01\n";
        let table = SpecimenTable::from_csv_reader(data.as_bytes(), b';').unwrap();
        assert_eq!(table.specimens[0].get("date"), "2024-05-01");
        assert_eq!(table.specimens[0].get("reference"), "");
    }

    #[test]
    fn test_missing_columns() {
        let table = SpecimenTable::from_csv_reader(CSV.as_bytes(), b',').unwrap();
        let config = LabelConfig::default();
        let missing = table.missing_columns(&config);
        assert!(missing.contains("id"));
        assert!(missing.contains("color_information"));
        assert!(!missing.contains("family"));
        assert!(!missing.contains("fruit/seed"));
        assert_eq!(missing.len(), 18 - 6);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = SpecimenTable::load(Path::new("does/not/exist.csv"), LoadOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::LoadError(_)));
    }

    #[test]
    fn test_delimiter_from_extension() {
        assert_eq!(default_delimiter(Path::new("herbar.tsv")), b'\t');
        assert_eq!(default_delimiter(Path::new("herbar.CSV")), b',');
        assert!(is_spreadsheet(Path::new("Herbar.xlsx")));
        assert!(!is_spreadsheet(Path::new("Herbar.csv")));
    }

    #[test]
    fn test_spreadsheet_cells() {
        assert_eq!(cell_text(&Data::Float(1200.0)), "1200");
        assert_eq!(cell_text(&Data::Float(47.25)), "47.25");
        assert_eq!(cell_text(&Data::Int(3)), "3");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("Rosa".into())), "Rosa");
    }

    #[test]
    fn test_load_xlsx_workbook() {
        let table = SpecimenTable::load(Path::new("tests/data/specimens.xlsx"), LoadOptions::default()).unwrap();
        assert_eq!(table.columns, vec!["family", "genera", "species", "id", "date", "elevation"]);
        assert_eq!(table.specimens.len(), 3);

        let rosa = &table.specimens[0];
        assert_eq!(rosa.get("species"), "canina");
        assert_eq!(rosa.get("date"), "2024-05-12");
        assert_eq!(rosa.get("elevation"), "1200");

        // the second row stops after two cells
        let plantago = &table.specimens[1];
        assert_eq!(plantago.get("genera"), "Plantago");
        assert_eq!(plantago.get("id"), "");
        assert_eq!(plantago.get("date"), "");

        assert_eq!(table.specimens[2].get("date"), "2024-05-18");
        assert_eq!(table.specimens[2].get("elevation"), "812.5");
    }

    #[test]
    fn test_load_empty_sheet() {
        let table = SpecimenTable::load(Path::new("tests/data/empty_sheet.xlsx"), LoadOptions::default()).unwrap();
        assert!(table.columns.is_empty());
        assert!(table.specimens.is_empty());
    }

    #[test]
    fn test_unreadable_workbook_is_load_error() {
        let err = SpecimenTable::load(Path::new("tests/data/not_a_workbook.xlsx"), LoadOptions::default()).unwrap_err();
        match err {
            AppError::LoadError(message) => assert!(message.contains("not_a_workbook.xlsx"), "{}", message),
            other => panic!("expected load error, got {:?}", other),
        }
    }

    #[test]
    fn test_date_cells_print_as_dates() {
        let date = ExcelDateTime::new(45424.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_text(&Data::DateTime(date)), "2024-05-12");

        let noon = ExcelDateTime::new(45424.5, ExcelDateTimeType::DateTime, false);
        assert_eq!(cell_text(&Data::DateTime(noon)), "2024-05-12 12:00:00");

        assert_eq!(cell_text(&Data::DateTimeIso("2024-05-12T08:30:00".into())), "2024-05-12T08:30:00");
        assert_eq!(cell_text(&Data::DurationIso("PT1H".into())), "PT1H");
    }

    #[test]
    fn test_duplicate_header_keeps_first_value() {
        let table = SpecimenTable::from_csv_reader("id,family,id\nH-1,Rosaceae,H-2\n".as_bytes(), b',').unwrap();
        assert_eq!(table.columns, vec!["id", "family", "id"]);
        assert_eq!(table.specimens[0].get("id"), "H-1");
        assert_eq!(table.specimens[0].get("family"), "Rosaceae");

        let duplicates = duplicate_columns(&table.columns);
        assert_eq!(duplicates.into_iter().collect::<Vec<_>>(), vec!["id"]);
    }
}

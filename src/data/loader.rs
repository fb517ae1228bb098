//! Table Loader Module
//! Reads CSV files (via Polars) and Excel workbooks (via calamine) into
//! text-cell tables.

use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

use super::table::{Row, Table};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to load workbook: {0}")]
    ExcelError(#[from] calamine::Error),
    #[error("No sheets found in workbook {0}")]
    NoSheets(String),
    #[error("No rows found in {0}")]
    NoData(String),
    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

/// Loads delimited and spreadsheet sources as [`Table`]s.
pub struct DataLoader;

impl DataLoader {
    /// Load a table, dispatching on the file extension.
    pub fn load_table(path: &Path) -> Result<Table, LoaderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "txt" => Self::load_csv(path),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::load_excel(path),
            other => Err(LoaderError::UnsupportedExtension(other.to_string())),
        }
    }

    /// Load a CSV file using Polars, keeping every column as text.
    pub fn load_csv(path: &Path) -> Result<Table, LoaderError> {
        // A zero-row inference window makes every column a string column
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_truncate_ragged_lines(true)
            .finish()?
            .collect()?;

        let header: Row = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        if header.is_empty() {
            return Err(LoaderError::NoData(path.display().to_string()));
        }

        let columns = df
            .get_columns()
            .iter()
            .map(|col| col.cast(&DataType::String))
            .collect::<PolarsResult<Vec<_>>>()?;
        let cells = columns
            .iter()
            .map(|col| col.str())
            .collect::<PolarsResult<Vec<_>>>()?;

        let records = (0..df.height())
            .map(|i| {
                cells
                    .iter()
                    .map(|ca| ca.get(i).unwrap_or("").to_string())
                    .collect()
            })
            .collect();

        let table = Table::new(header, records);
        log::info!(
            "Loaded {} records, {} columns from {}",
            table.len(),
            table.width(),
            path.display()
        );
        Ok(table)
    }

    /// Load the first sheet of a workbook.
    pub fn load_excel(path: &Path) -> Result<Table, LoaderError> {
        let mut workbook = open_workbook_auto(path)?;

        let sheets = workbook.sheet_names();
        log::info!("Available sheets in {}: {:?}", path.display(), sheets);
        let Some(sheet) = sheets.first().cloned() else {
            return Err(LoaderError::NoSheets(path.display().to_string()));
        };
        log::info!("Using sheet: {}", sheet);

        let range = workbook.worksheet_range(&sheet)?;
        // Keep cell positions aligned with sheet columns when the used range
        // does not start in column A
        let col_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

        let mut rows = range.rows().map(|cells| sheet_row(cells, col_offset));
        let Some(header) = rows.next() else {
            return Err(LoaderError::NoData(path.display().to_string()));
        };

        let table = Table::new(header, rows.collect());
        log::info!(
            "Loaded {} records, {} columns from {} [{}]",
            table.len(),
            table.width(),
            path.display(),
            sheet
        );
        Ok(table)
    }
}

/// Spreadsheet row to text cells; trailing empty cells are dropped.
fn sheet_row(cells: &[Data], col_offset: usize) -> Row {
    let mut row: Row = std::iter::repeat(String::new())
        .take(col_offset)
        .chain(cells.iter().map(|cell| match cell {
            Data::Empty => String::new(),
            other => other.to_string(),
        }))
        .collect();

    while row.last().is_some_and(|cell| cell.is_empty()) {
        row.pop();
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("flare_join_{}_{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn csv_columns_stay_text() {
        let path = temp_file(
            "loader.csv",
            "country,id,lat\nAlgeria,007,30.5\nLibya,8,abc\n",
        );
        let table = DataLoader::load_table(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(table.header, vec!["country", "id", "lat"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 1), Some("007"));
        assert_eq!(table.cell(1, 2), Some("abc"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("flare_join_does_not_exist.csv");
        assert!(DataLoader::load_table(&path).is_err());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = DataLoader::load_table(Path::new("data.parquet")).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedExtension(ext) if ext == "parquet"));
    }

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("data")
            .join(name)
    }

    #[test]
    fn workbook_uses_first_sheet() {
        let table = DataLoader::load_table(&fixture("flare_volumes.xlsx")).unwrap();

        assert_eq!(table.header, vec!["country", "lat", "lon", "volume"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.records[0], vec!["Algeria", "30.5", "5.25", "1.5"]);
        assert_eq!(table.records[1], vec!["Libya", "28", "9", "2"]);
        // Missing trailing cell leaves a short record
        assert_eq!(table.records[2].len(), 3);
        assert_eq!(table.cell(2, 3), None);
    }

    #[test]
    fn workbook_columns_keep_sheet_positions() {
        let table = DataLoader::load_excel(&fixture("offset_columns.xlsx")).unwrap();
        assert_eq!(table.header, vec!["", "country", "lat"]);
        assert_eq!(table.cell(0, 1), Some("Algeria"));
        assert_eq!(table.cell(0, 2), Some("30.5"));
    }

    #[test]
    fn empty_first_sheet_is_no_data() {
        let err = DataLoader::load_excel(&fixture("empty_first_sheet.xlsx")).unwrap_err();
        assert!(matches!(err, LoaderError::NoData(_)));
    }

    #[test]
    fn workbook_without_sheets_is_rejected() {
        let err = DataLoader::load_excel(&fixture("no_sheets.xlsx")).unwrap_err();
        assert!(matches!(err, LoaderError::NoSheets(_)));
    }

    #[test]
    fn sheet_rows_are_offset_and_trimmed() {
        let cells = [
            Data::String("Algeria".to_string()),
            Data::Float(30.5),
            Data::Empty,
            Data::Empty,
        ];
        let row = sheet_row(&cells, 1);
        assert_eq!(row, vec!["", "Algeria", "30.5"]);
    }
}

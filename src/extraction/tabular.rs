// Delimited text and spreadsheet extraction

use super::table::{Cell, DataTable};
use super::{ContentExtractor, ExtractionResult};
use crate::types::{AppError, AppResult};
use calamine::{Data, Reader};
use std::io::Cursor;

/// Comma-separated values; the first record is the header.
pub struct CsvExtractor;

impl ContentExtractor for CsvExtractor {
    fn extract(&self, bytes: &[u8]) -> AppResult<ExtractionResult> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::decode("CSV", e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
            return Err(AppError::decode("CSV", "No columns to parse from file"));
        }

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| AppError::decode("CSV", e.to_string()))?;
            // Blank lines carry no data.
            if record.len() == 1 && record.get(0).map_or(true, str::is_empty) {
                continue;
            }
            if record.len() > headers.len() {
                // Line numbers are 1-based and include the header line.
                let line = record.position().map_or(idx as u64 + 2, |p| p.line());
                return Err(AppError::decode(
                    "CSV",
                    format!(
                        "Expected {} fields in line {}, saw {}",
                        headers.len(),
                        line,
                        record.len()
                    ),
                ));
            }
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        Ok(ExtractionResult::tabular(DataTable::from_text_rows(headers, rows)))
    }
}

/// Legacy `.xls` and `.xlsx` workbooks. Only the first worksheet is read.
pub struct ExcelExtractor;

impl ContentExtractor for ExcelExtractor {
    fn extract(&self, bytes: &[u8]) -> AppResult<ExtractionResult> {
        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| AppError::decode("Excel", e.to_string()))?;

        let first_sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| AppError::decode("Excel", "Workbook contains no worksheets"))?;

        let range = workbook
            .worksheet_range(&first_sheet)
            .map_err(|e| AppError::decode("Excel", e.to_string()))?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .enumerate()
                .map(|(idx, cell)| match cell {
                    Data::Empty => format!("Unnamed: {}", idx),
                    Data::Float(f) if f.fract() == 0.0 => format!("{:.0}", f),
                    other => other.to_string(),
                })
                .collect(),
            None => Vec::new(),
        };

        let body: Vec<Vec<Cell>> = rows
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();

        Ok(ExtractionResult::tabular(DataTable::from_cells(headers, body)))
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Float(dt.as_f64())),
        Data::DateTimeIso(s) => chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(Cell::DateTime)
            .unwrap_or_else(|_| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

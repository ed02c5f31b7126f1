// In-memory table produced by the tabular extractors.
//
// Columns carry one inferred value type each; missing cells are `None`.
// `render()` produces the full text dump that is shown as the preview and
// fed to the prompt.

use chrono::{NaiveDateTime, Timelike};
use std::collections::HashMap;

/// Markers read as a missing value.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const MAX_FLOAT_DECIMALS: usize = 6;

/// A single typed cell before column unification.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Cell {
    /// Infer a cell from delimited text.
    pub fn infer(raw: &str) -> Self {
        if MISSING_MARKERS.contains(&raw) {
            return Cell::Empty;
        }
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Cell::Float(f);
        }
        match raw {
            "True" | "TRUE" | "true" => Cell::Bool(true),
            "False" | "FALSE" | "false" => Cell::Bool(false),
            _ => Cell::Text(raw.to_string()),
        }
    }

    fn to_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) => Some(float_repr(*f)),
            Cell::Bool(b) => Some(bool_repr(*b).to_string()),
            Cell::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Int,
    Float,
    Bool,
    DateTime,
    Text,
}

/// Column storage after type unification.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
    DateTime(Vec<Option<NaiveDateTime>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    /// Unify a column of cells into one value type.
    ///
    /// `raw` holds the original text of each cell when the source was
    /// delimited text; a column that falls back to text keeps it verbatim.
    pub fn unify(cells: Vec<Cell>, raw: Option<&[String]>) -> Self {
        let mut kinds = Vec::new();
        let mut has_missing = false;
        for cell in &cells {
            let kind = match cell {
                Cell::Empty => {
                    has_missing = true;
                    continue;
                }
                Cell::Int(_) => CellKind::Int,
                Cell::Float(_) => CellKind::Float,
                Cell::Bool(_) => CellKind::Bool,
                Cell::DateTime(_) => CellKind::DateTime,
                Cell::Text(_) => CellKind::Text,
            };
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        let numeric_only = kinds
            .iter()
            .all(|k| matches!(k, CellKind::Int | CellKind::Float));

        match kinds.as_slice() {
            [CellKind::Int] if !has_missing => ColumnValues::Int(
                cells
                    .into_iter()
                    .map(|c| match c {
                        Cell::Int(i) => Some(i),
                        _ => None,
                    })
                    .collect(),
            ),
            // An empty column is a float column of NaN.
            _ if numeric_only => ColumnValues::Float(
                cells
                    .into_iter()
                    .map(|c| match c {
                        Cell::Int(i) => Some(i as f64),
                        Cell::Float(f) => Some(f),
                        _ => None,
                    })
                    .collect(),
            ),
            [CellKind::Bool] => ColumnValues::Bool(
                cells
                    .into_iter()
                    .map(|c| match c {
                        Cell::Bool(b) => Some(b),
                        _ => None,
                    })
                    .collect(),
            ),
            [CellKind::DateTime] => ColumnValues::DateTime(
                cells
                    .into_iter()
                    .map(|c| match c {
                        Cell::DateTime(dt) => Some(dt),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => ColumnValues::Text(
                cells
                    .iter()
                    .enumerate()
                    .map(|(i, c)| match (c, raw) {
                        (Cell::Empty, _) => None,
                        (_, Some(raw)) => raw.get(i).cloned().or_else(|| c.to_text()),
                        (_, None) => c.to_text(),
                    })
                    .collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Bool(v) => v.len(),
            ColumnValues::DateTime(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnValues::Int(v) => v.get(row).map_or(true, Option::is_none),
            ColumnValues::Float(v) => v
                .get(row)
                .map_or(true, |f| f.map_or(true, |f| f.is_nan())),
            ColumnValues::Bool(v) => v.get(row).map_or(true, Option::is_none),
            ColumnValues::DateTime(v) => v.get(row).map_or(true, Option::is_none),
            ColumnValues::Text(v) => v.get(row).map_or(true, Option::is_none),
        }
    }

    /// Numeric view of a cell. `None` for missing cells and non-numeric columns.
    pub fn number_at(&self, row: usize) -> Option<f64> {
        match self {
            ColumnValues::Int(v) => v.get(row).copied().flatten().map(|i| i as f64),
            ColumnValues::Float(v) => v.get(row).copied().flatten().filter(|f| !f.is_nan()),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnValues::Int(_) | ColumnValues::Float(_))
    }

    /// Rendered cells of this column, one per row.
    pub fn rendered(&self) -> Vec<String> {
        match self {
            ColumnValues::Int(v) => v
                .iter()
                .map(|i| i.map_or_else(|| "NaN".to_string(), |i| i.to_string()))
                .collect(),
            ColumnValues::Float(v) => render_floats(v),
            ColumnValues::Bool(v) => v
                .iter()
                .map(|b| b.map_or("NaN", bool_repr).to_string())
                .collect(),
            ColumnValues::DateTime(v) => {
                let date_only = v
                    .iter()
                    .flatten()
                    .all(|dt| dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0);
                let pattern = if date_only { "%Y-%m-%d" } else { "%Y-%m-%d %H:%M:%S" };
                v.iter()
                    .map(|dt| dt.map_or_else(|| "NaT".to_string(), |dt| dt.format(pattern).to_string()))
                    .collect()
            }
            ColumnValues::Text(v) => v
                .iter()
                .map(|s| s.clone().unwrap_or_else(|| "NaN".to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    columns: Vec<Column>,
    row_count: usize,
}

impl DataTable {
    /// Build a table from delimited-text rows. Short rows are padded with
    /// missing cells.
    pub fn from_text_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let row_count = rows.len();
        let mut raw_columns: Vec<Vec<String>> = vec![Vec::with_capacity(row_count); width];
        for row in rows {
            for (idx, column) in raw_columns.iter_mut().enumerate() {
                column.push(row.get(idx).cloned().unwrap_or_default());
            }
        }

        let columns = dedupe_headers(headers)
            .into_iter()
            .zip(raw_columns)
            .map(|(name, raw)| {
                let cells = raw.iter().map(|s| Cell::infer(s)).collect();
                Column {
                    name,
                    values: ColumnValues::unify(cells, Some(&raw)),
                }
            })
            .collect();

        Self { columns, row_count }
    }

    /// Build a table from already-typed cells (spreadsheets).
    pub fn from_cells(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let row_count = rows.len();
        let mut cell_columns: Vec<Vec<Cell>> = vec![Vec::with_capacity(row_count); width];
        for row in rows {
            let mut row = row.into_iter();
            for column in cell_columns.iter_mut() {
                column.push(row.next().unwrap_or(Cell::Empty));
            }
        }

        let columns = dedupe_headers(headers)
            .into_iter()
            .zip(cell_columns)
            .map(|(name, cells)| Column {
                name,
                values: ColumnValues::unify(cells, None),
            })
            .collect();

        Self { columns, row_count }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.row_count
    }

    /// Rendered cells row by row, for structured previews.
    pub fn rendered_rows(&self) -> Vec<Vec<String>> {
        let rendered: Vec<Vec<String>> = self.columns.iter().map(|c| c.values.rendered()).collect();
        (0..self.row_count)
            .map(|row| rendered.iter().map(|col| col[row].clone()).collect())
            .collect()
    }

    /// Full, untruncated text dump with a leading row index.
    pub fn render(&self) -> String {
        if self.columns.is_empty() || self.row_count == 0 {
            return format!(
                "Empty DataFrame\nColumns: [{}]\nIndex: []",
                self.column_names().join(", ")
            );
        }

        let index_width = (self.row_count - 1).to_string().len();
        let rendered: Vec<Vec<String>> = self.columns.iter().map(|c| c.values.rendered()).collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&rendered)
            .map(|(column, cells)| {
                cells
                    .iter()
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(column.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(self.row_count + 1);

        let mut header = " ".repeat(index_width);
        for (column, width) in self.columns.iter().zip(&widths) {
            header.push_str("  ");
            header.push_str(&pad_left(&column.name, *width));
        }
        lines.push(header);

        for row in 0..self.row_count {
            let mut line = format!("{:<width$}", row, width = index_width);
            for (cells, width) in rendered.iter().zip(&widths) {
                line.push_str("  ");
                line.push_str(&pad_left(&cells[row], *width));
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}

/// Repeated header names get a `.1`, `.2`, ... suffix.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(headers.len());
    for name in headers {
        let count = seen.entry(name.clone()).or_insert(0);
        if *count == 0 {
            out.push(name);
        } else {
            out.push(format!("{}.{}", name, count));
        }
        *count += 1;
    }
    out
}

fn pad_left(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        value.to_string()
    } else {
        format!("{}{}", " ".repeat(width - len), value)
    }
}

fn bool_repr(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

fn float_repr(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        special_float(f).unwrap_or_else(|| f.to_string())
    }
}

fn special_float(f: f64) -> Option<String> {
    if f.is_nan() {
        Some("NaN".to_string())
    } else if f == f64::INFINITY {
        Some("inf".to_string())
    } else if f == f64::NEG_INFINITY {
        Some("-inf".to_string())
    } else {
        None
    }
}

fn decimals_needed(f: f64) -> usize {
    let formatted = format!("{:.*}", MAX_FLOAT_DECIMALS, f);
    match formatted.split_once('.') {
        Some((_, frac)) => frac.trim_end_matches('0').len(),
        None => 0,
    }
}

// Every finite value in the column shares one decimal count.
fn render_floats(values: &[Option<f64>]) -> Vec<String> {
    let decimals = values
        .iter()
        .flatten()
        .filter(|f| f.is_finite())
        .map(|f| decimals_needed(*f))
        .max()
        .unwrap_or(1)
        .clamp(1, MAX_FLOAT_DECIMALS);

    values
        .iter()
        .map(|v| match v {
            None => "NaN".to_string(),
            Some(f) => special_float(*f).unwrap_or_else(|| format!("{:.*}", decimals, f)),
        })
        .collect()
}

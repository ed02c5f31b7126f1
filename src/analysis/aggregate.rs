// Group-by-and-sum over table columns

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};

use super::ChartError;
use crate::extraction::{Column, ColumnValues, DataTable};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m.%d.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Parse a calendar date from the textual forms spreadsheets usually export.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

// Sort key for a group; a column only ever yields one variant.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
enum GroupKey {
    Number(f64),
    Flag(bool),
    Moment(NaiveDateTime),
    Label(String),
}

fn group_key(column: &Column, row: usize, rendered: &[String]) -> Option<(GroupKey, String)> {
    let key = match &column.values {
        ColumnValues::Int(v) => GroupKey::Number(v.get(row).copied().flatten()? as f64),
        ColumnValues::Float(v) => GroupKey::Number(v.get(row).copied().flatten().filter(|f| !f.is_nan())?),
        ColumnValues::Bool(v) => GroupKey::Flag(v.get(row).copied().flatten()?),
        ColumnValues::DateTime(v) => GroupKey::Moment(v.get(row).copied().flatten()?),
        ColumnValues::Text(v) => GroupKey::Label(v.get(row).cloned().flatten()?),
    };
    let label = rendered.get(row).cloned().unwrap_or_default();
    Some((key, label))
}

fn numeric_column<'a>(table: &'a DataTable, name: &str) -> Result<&'a Column, ChartError> {
    let column = table
        .column(name)
        .ok_or_else(|| ChartError::NonNumeric { column: name.to_string() })?;
    if !column.values.is_numeric() {
        return Err(ChartError::NonNumeric { column: name.to_string() });
    }
    Ok(column)
}

/// Sum `value_column` per distinct `group_column` value, ascending by key.
/// Rows with a missing key are dropped; missing values add nothing.
pub fn sum_by_category(
    table: &DataTable,
    group_column: &str,
    value_column: &str,
) -> Result<Vec<(String, f64)>, ChartError> {
    let values = numeric_column(table, value_column)?;
    let groups = table
        .column(group_column)
        .ok_or_else(|| ChartError::Render(format!("missing column '{}'", group_column)))?;
    let rendered = groups.values.rendered();

    let mut sums: HashMap<String, (GroupKey, f64)> = HashMap::new();
    for row in 0..table.num_rows() {
        let Some((key, label)) = group_key(groups, row, &rendered) else {
            continue;
        };
        let amount = values.values.number_at(row).unwrap_or(0.0);
        sums.entry(label).or_insert((key, 0.0)).1 += amount;
    }

    let mut out: Vec<(GroupKey, String, f64)> = sums
        .into_iter()
        .map(|(label, (key, sum))| (key, label, sum))
        .collect();
    out.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    Ok(out.into_iter().map(|(_, label, sum)| (label, sum)).collect())
}

/// Sum `value_column` per calendar date of `date_column`, ascending.
pub fn sum_by_date(
    table: &DataTable,
    date_column: &str,
    value_column: &str,
) -> Result<Vec<(NaiveDate, f64)>, ChartError> {
    let values = numeric_column(table, value_column)?;
    let dates = table
        .column(date_column)
        .ok_or_else(|| ChartError::Render(format!("missing column '{}'", date_column)))?;

    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in 0..table.num_rows() {
        let date = match &dates.values {
            ColumnValues::DateTime(v) => match v.get(row).copied().flatten() {
                Some(dt) => dt.date(),
                None => continue,
            },
            ColumnValues::Text(v) => match v.get(row).and_then(|s| s.as_deref()) {
                Some(raw) => parse_date(raw).ok_or_else(|| ChartError::DateParse {
                    value: raw.to_string(),
                })?,
                None => continue,
            },
            // Bare numbers and flags are not dates.
            other => {
                if other.is_missing(row) {
                    continue;
                }
                let rendered = other.rendered();
                return Err(ChartError::DateParse {
                    value: rendered.get(row).cloned().unwrap_or_default(),
                });
            }
        };
        *sums.entry(date).or_insert(0.0) += values.values.number_at(row).unwrap_or(0.0);
    }

    Ok(sums.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> DataTable {
        DataTable::from_text_rows(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7);
        assert_eq!(parse_date("2024-03-07"), expected);
        assert_eq!(parse_date("2024/03/07"), expected);
        assert_eq!(parse_date("3/7/2024"), expected);
        assert_eq!(parse_date("03.07.2024"), expected);
        // Month first, as in the slash form.
        assert_eq!(parse_date("07.03.2024"), NaiveDate::from_ymd_opt(2024, 7, 3));
        assert_eq!(parse_date("2024-03-07 15:30:00"), expected);
        assert_eq!(parse_date("2024-03-07T15:30:00+02:00"), expected);
        assert_eq!(parse_date("next tuesday"), None);
    }

    #[test]
    fn test_numeric_keys_sort_numerically() {
        let t = table(
            &["Region", "Total Revenue"],
            &[&["10", "1"], &["9", "2"], &["10", "3"]],
        );
        let sums = sum_by_category(&t, "Region", "Total Revenue").unwrap();
        assert_eq!(sums, vec![("9".to_string(), 2.0), ("10".to_string(), 4.0)]);
    }

    #[test]
    fn test_missing_keys_and_values_skipped() {
        let t = table(
            &["Region", "Total Revenue"],
            &[&["Asia", "5"], &["", "100"], &["Asia", ""], &["Europe", "1"]],
        );
        let sums = sum_by_category(&t, "Region", "Total Revenue").unwrap();
        assert_eq!(
            sums,
            vec![("Asia".to_string(), 5.0), ("Europe".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_text_revenue_is_non_numeric() {
        let t = table(&["Region", "Total Revenue"], &[&["Asia", "lots"]]);
        assert_eq!(
            sum_by_category(&t, "Region", "Total Revenue"),
            Err(ChartError::NonNumeric {
                column: "Total Revenue".to_string()
            })
        );
    }

    #[test]
    fn test_numeric_date_column_fails_to_parse() {
        let t = table(&["Order Date", "Total Revenue"], &[&["20240101", "5"]]);
        assert!(matches!(
            sum_by_date(&t, "Order Date", "Total Revenue"),
            Err(ChartError::DateParse { .. })
        ));
    }
}

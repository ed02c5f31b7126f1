//! Keyword-driven charts
//!
//! A question mentioning "pie chart", "bar chart" or "line chart" selects one
//! rule from [`CHART_RULES`] (first match wins). The rule names the columns to
//! group by and sum, and the chart is rendered to SVG with plotters.

pub mod aggregate;
pub mod render;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::extraction::DataTable;

pub const REVENUE_COLUMN: &str = "Total Revenue";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    Line,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Pie => "pie",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartRule {
    pub keyword: &'static str,
    pub kind: ChartKind,
    pub group_column: &'static str,
    pub value_column: &'static str,
    pub title: &'static str,
    pub x_label: Option<&'static str>,
    pub y_label: Option<&'static str>,
}

impl ChartRule {
    pub fn required_columns(&self) -> [&'static str; 2] {
        [self.group_column, self.value_column]
    }
}

/// Evaluated in order; the first keyword found in the question wins.
pub const CHART_RULES: &[ChartRule] = &[
    ChartRule {
        keyword: "pie chart",
        kind: ChartKind::Pie,
        group_column: "Item Type",
        value_column: REVENUE_COLUMN,
        title: "Total Revenue by Item Type",
        x_label: None,
        y_label: None,
    },
    ChartRule {
        keyword: "bar chart",
        kind: ChartKind::Bar,
        group_column: "Region",
        value_column: REVENUE_COLUMN,
        title: "Bar Chart: Revenue by Region",
        x_label: Some("Region"),
        y_label: Some("Total Revenue"),
    },
    ChartRule {
        keyword: "line chart",
        kind: ChartKind::Line,
        group_column: "Order Date",
        value_column: REVENUE_COLUMN,
        title: "Total Revenue Over Time",
        x_label: Some("Date"),
        y_label: Some("Revenue"),
    },
];

pub fn select_rule(question: &str) -> Option<&'static ChartRule> {
    let question = question.to_lowercase();
    CHART_RULES.iter().find(|rule| question.contains(rule.keyword))
}

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("Columns required for the {kind} chart are missing: {}", .missing.join(", "))]
    MissingColumns {
        kind: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("Could not parse dates or plot line chart.")]
    DateParse { value: String },

    #[error("Column '{column}' is not numeric; cannot plot chart.")]
    NonNumeric { column: String },

    #[error("Could not render chart: {0}")]
    Render(String),
}

impl ChartError {
    /// Failures the page does not mention at all.
    pub fn is_silent(&self) -> bool {
        matches!(self, ChartError::MissingColumns { .. })
    }
}

/// Grouped sums ready for drawing, ascending by key.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Categories(Vec<(String, f64)>),
    Timeline(Vec<(NaiveDate, f64)>),
}

impl Series {
    pub fn labels(&self) -> Vec<String> {
        match self {
            Series::Categories(points) => points.iter().map(|(k, _)| k.clone()).collect(),
            Series::Timeline(points) => points
                .iter()
                .map(|(d, _)| d.format("%Y-%m-%d").to_string())
                .collect(),
        }
    }

    pub fn values(&self) -> Vec<f64> {
        match self {
            Series::Categories(points) => points.iter().map(|(_, v)| *v).collect(),
            Series::Timeline(points) => points.iter().map(|(_, v)| *v).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Series::Categories(points) => points.is_empty(),
            Series::Timeline(points) => points.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub rule: &'static ChartRule,
    pub series: Series,
}

impl ChartData {
    /// Each group's share of the total as "{:.1}%".
    pub fn percentages(&self) -> Vec<String> {
        let values = self.series.values();
        let total: f64 = values.iter().sum();
        values
            .iter()
            .map(|v| format!("{:.1}%", v / total * 100.0))
            .collect()
    }
}

/// A rendered chart.
#[derive(Debug, Clone, Serialize)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub title: String,
    pub svg: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Slice shares, pie charts only.
    pub shares: Vec<String>,
}

/// Pick a rule and aggregate the table. `Ok(None)` when nothing was asked for.
pub fn plan_chart(
    table: Option<&DataTable>,
    question: &str,
) -> Result<Option<ChartData>, ChartError> {
    let (Some(table), Some(rule)) = (table, select_rule(question)) else {
        return Ok(None);
    };

    let missing: Vec<&'static str> = rule
        .required_columns()
        .into_iter()
        .filter(|name| !table.has_column(name))
        .collect();
    if !missing.is_empty() {
        return Err(ChartError::MissingColumns {
            kind: rule.kind.as_str(),
            missing,
        });
    }

    let series = match rule.kind {
        ChartKind::Pie | ChartKind::Bar => Series::Categories(aggregate::sum_by_category(
            table,
            rule.group_column,
            rule.value_column,
        )?),
        ChartKind::Line => Series::Timeline(aggregate::sum_by_date(
            table,
            rule.group_column,
            rule.value_column,
        )?),
    };

    debug!(kind = rule.kind.as_str(), groups = series.values().len(), "Chart data aggregated");
    Ok(Some(ChartData { rule, series }))
}

pub fn select_and_render(
    table: Option<&DataTable>,
    question: &str,
) -> Result<Option<ChartArtifact>, ChartError> {
    match plan_chart(table, question)? {
        Some(data) => render::render_chart(&data).map(Some),
        None => Ok(None),
    }
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
    fn test_rule_selection_order() {
        assert_eq!(select_rule("Show me a PIE CHART").map(|r| r.kind), Some(ChartKind::Pie));
        assert_eq!(
            select_rule("bar chart or line chart?").map(|r| r.kind),
            Some(ChartKind::Bar)
        );
        assert_eq!(
            select_rule("line chart then pie chart").map(|r| r.kind),
            Some(ChartKind::Pie)
        );
        assert!(select_rule("which region sold most?").is_none());
    }

    #[test]
    fn test_pie_aggregation_and_percentages() {
        let t = table(
            &["Item Type", "Total Revenue"],
            &[&["A", "10"], &["B", "30"], &["A", "20"]],
        );
        let data = plan_chart(Some(&t), "draw a pie chart").unwrap().unwrap();
        assert_eq!(
            data.series,
            Series::Categories(vec![("A".to_string(), 30.0), ("B".to_string(), 30.0)])
        );
        assert_eq!(data.percentages(), vec!["50.0%", "50.0%"]);
    }

    #[test]
    fn test_missing_region_is_silent() {
        let t = table(&["Item Type", "Total Revenue"], &[&["A", "10"]]);
        let err = plan_chart(Some(&t), "bar chart please").unwrap_err();
        assert!(err.is_silent());
        assert_eq!(
            err,
            ChartError::MissingColumns {
                kind: "bar",
                missing: vec!["Region"]
            }
        );
    }

    #[test]
    fn test_no_table_or_keyword_yields_none() {
        let t = table(&["Region", "Total Revenue"], &[&["Asia", "1"]]);
        assert_eq!(plan_chart(None, "bar chart"), Ok(None));
        assert_eq!(plan_chart(Some(&t), "what is the total?"), Ok(None));
    }

    #[test]
    fn test_unparseable_dates_warn() {
        let t = table(
            &["Order Date", "Total Revenue"],
            &[&["2024-01-02", "5"], &["someday", "7"]],
        );
        let err = plan_chart(Some(&t), "line chart").unwrap_err();
        assert!(!err.is_silent());
        assert_eq!(err.to_string(), "Could not parse dates or plot line chart.");
    }

    #[test]
    fn test_line_groups_by_date_ascending() {
        let t = table(
            &["Order Date", "Total Revenue"],
            &[&["3/2/2024", "5"], &["1/15/2024", "7"], &["3/2/2024", "1.5"]],
        );
        let data = plan_chart(Some(&t), "Line chart of revenue").unwrap().unwrap();
        assert_eq!(data.series.labels(), vec!["2024-01-15", "2024-03-02"]);
        assert_eq!(data.series.values(), vec![7.0, 6.5]);
    }
}

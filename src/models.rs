use serde::Serialize;
use std::sync::Arc;

use crate::agents::{AnswerOutcome, DataAnalystAgent, InteractionReport, Preview};
use crate::analysis::ChartArtifact;
use crate::config::Config;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub agent: DataAnalystAgent,
}

impl AppState {
    pub fn new(config: Config, agent: DataAnalystAgent) -> Self {
        Self {
            config: Arc::new(config),
            agent,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub filename: String,
    pub preview: Preview,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartPayload>,
    pub warnings: Vec<String>,
}

impl AnalyzeResponse {
    pub fn from_report(filename: String, report: InteractionReport) -> Self {
        Self {
            filename,
            preview: report.preview,
            answer: report.answer,
            chart: report.chart.map(ChartPayload::from),
            warnings: report.warnings,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartPayload {
    pub kind: String,
    pub title: String,
    pub svg: String,
}

impl From<ChartArtifact> for ChartPayload {
    fn from(chart: ChartArtifact) -> Self {
        Self {
            kind: chart.kind.as_str().to_string(),
            title: chart.title,
            svg: chart.svg,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

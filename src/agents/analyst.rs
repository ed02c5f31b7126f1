//! Data Analyst Agent
//!
//! Runs one interaction: extract the upload, answer the question, and draw a
//! chart when the question asks for one. Each step fails on its own; a failed
//! answer never hides the preview, and a failed chart never hides the answer.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analysis::{self, ChartArtifact};
use crate::extraction::{DataTable, DocumentExtractor, ExtractionResult, UploadedDocument};
use crate::llm::{build_prompt, AnswerService};
use crate::types::{AppError, AppResult};

/// What the page shows for the uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Preview {
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        text: String,
    },
    Text {
        text: String,
    },
    Unsupported {
        text: String,
    },
}

impl Preview {
    pub fn text(&self) -> &str {
        match self {
            Preview::Table { text, .. } | Preview::Text { text } | Preview::Unsupported { text } => text,
        }
    }

    fn from_extraction(result: &ExtractionResult) -> Self {
        match result {
            ExtractionResult::Tabular {
                table,
                rendered_text,
            } => Preview::Table {
                columns: table.column_names(),
                rows: table.rendered_rows(),
                text: rendered_text.clone(),
            },
            ExtractionResult::TextOnly { rendered_text } => Preview::Text {
                text: rendered_text.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum AnswerOutcome {
    #[serde(rename = "ok")]
    Answered { text: String },
    #[serde(rename = "error")]
    Failed { text: String },
}

impl AnswerOutcome {
    pub fn text(&self) -> &str {
        match self {
            AnswerOutcome::Answered { text } | AnswerOutcome::Failed { text } => text,
        }
    }

    fn from_error(err: AppError) -> Self {
        let detail = match err {
            AppError::Service(message) => message,
            other => other.to_string(),
        };
        AnswerOutcome::Failed {
            text: format!("Error from LLM: {}", detail),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InteractionReport {
    pub preview: Preview,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartArtifact>,
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct DataAnalystAgent {
    extractor: Arc<DocumentExtractor>,
    answer_service: Arc<dyn AnswerService>,
}

impl DataAnalystAgent {
    pub fn new(extractor: DocumentExtractor, answer_service: Arc<dyn AnswerService>) -> Self {
        Self {
            extractor: Arc::new(extractor),
            answer_service,
        }
    }

    /// Extract the document on a blocking thread.
    pub async fn extract(&self, document: UploadedDocument) -> AppResult<ExtractionResult> {
        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || extractor.extract(&document))
            .await
            .map_err(|e| AppError::Internal(format!("Extraction task failed: {}", e)))?
    }

    /// Run one upload-and-ask interaction.
    ///
    /// Returns `Err` only when the upload itself cannot be read. An
    /// unsupported file type becomes the content the question is asked about.
    pub async fn run(
        &self,
        document: UploadedDocument,
        question: Option<&str>,
    ) -> AppResult<InteractionReport> {
        info!(file = %document.name, bytes = document.bytes.len(), "Starting interaction");

        // Blank questions are skipped; others go to the prompt as typed.
        let question = question.filter(|q| !q.trim().is_empty());

        let extraction = match self.extract(document).await {
            Ok(extraction) => extraction,
            Err(err @ AppError::UnsupportedType(_)) => {
                info!(error = %err, "Unsupported upload");
                let notice = err.to_string();
                let answer = match question {
                    Some(question) => Some(self.answer(&notice, question).await),
                    None => None,
                };
                return Ok(InteractionReport {
                    preview: Preview::Unsupported { text: notice },
                    answer,
                    chart: None,
                    warnings: Vec::new(),
                });
            }
            Err(err) => return Err(err),
        };

        let mut report = InteractionReport {
            preview: Preview::from_extraction(&extraction),
            answer: None,
            chart: None,
            warnings: Vec::new(),
        };

        let Some(question) = question else {
            return Ok(report);
        };

        report.answer = Some(self.answer(extraction.rendered_text(), question).await);

        if let Some(table) = extraction.table() {
            match self.chart(table.clone(), question).await {
                Ok(chart) => report.chart = chart,
                Err(message) => report.warnings.push(message),
            }
        }

        info!(
            answered = matches!(report.answer, Some(AnswerOutcome::Answered { .. })),
            charted = report.chart.is_some(),
            warnings = report.warnings.len(),
            "Interaction complete"
        );
        Ok(report)
    }

    async fn answer(&self, content: &str, question: &str) -> AnswerOutcome {
        let prompt = build_prompt(content, question);
        match self.answer_service.complete(&prompt).await {
            Ok(text) => AnswerOutcome::Answered { text },
            Err(err) => {
                warn!(error = %err, "Answer service call failed");
                AnswerOutcome::from_error(err)
            }
        }
    }

    /// Chart for the question, or the warning to show instead.
    async fn chart(&self, table: DataTable, question: &str) -> Result<Option<ChartArtifact>, String> {
        let question = question.to_string();
        let outcome = tokio::task::spawn_blocking(move || analysis::select_and_render(Some(&table), &question))
            .await
            .map_err(|e| format!("Chart task failed: {}", e))?;

        match outcome {
            Ok(chart) => Ok(chart),
            Err(err) if err.is_silent() => {
                debug!(error = %err, "Chart skipped");
                Ok(None)
            }
            Err(err) => {
                warn!(error = %err, "Chart not drawn");
                Err(err.to_string())
            }
        }
    }
}

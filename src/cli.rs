// Command-line interface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::agents::{AnswerOutcome, DataAnalystAgent, InteractionReport};
use crate::extraction::UploadedDocument;

#[derive(Parser)]
#[command(name = "data-analyst-agent")]
#[command(about = "Upload a document, ask about it, get answers and charts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    Serve {
        /// Address to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one interaction in the terminal
    Ask {
        /// Document to analyze
        file: PathBuf,
        /// Question about the document
        #[arg(short, long)]
        question: Option<String>,
        /// Where to write the chart SVG, if one is drawn
        #[arg(long, default_value = "chart.svg")]
        chart_out: PathBuf,
    },
}

/// Run the `ask` command and return what should be printed.
pub async fn run_ask(
    agent: &DataAnalystAgent,
    file: &Path,
    question: Option<&str>,
    chart_out: &Path,
) -> Result<String> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let report = agent.run(UploadedDocument::new(name, bytes), question).await?;

    if let Some(chart) = &report.chart {
        tokio::fs::write(chart_out, &chart.svg)
            .await
            .with_context(|| format!("Failed to write chart to {}", chart_out.display()))?;
    }

    Ok(format_report(&report, chart_out))
}

fn format_report(report: &InteractionReport, chart_out: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Extracted Data Preview ==");
    let _ = writeln!(out, "{}", report.preview.text());

    match &report.answer {
        Some(AnswerOutcome::Answered { text }) => {
            let _ = writeln!(out, "\n== Answer ==\n{}", text);
        }
        Some(AnswerOutcome::Failed { text }) => {
            let _ = writeln!(out, "\n{}", text);
        }
        None => {}
    }

    for warning in &report.warnings {
        let _ = writeln!(out, "\nWarning: {}", warning);
    }

    if let Some(chart) = &report.chart {
        let _ = writeln!(out, "\nChart \"{}\" written to {}", chart.title, chart_out.display());
        for (idx, (label, value)) in chart.labels.iter().zip(&chart.values).enumerate() {
            match chart.shares.get(idx) {
                Some(share) => {
                    let _ = writeln!(out, "  {}: {} ({})", label, value, share);
                }
                None => {
                    let _ = writeln!(out, "  {}: {}", label, value);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::DocumentExtractor;
    use crate::llm::AnswerService;
    use crate::types::{AppError, AppResult};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct DownService;

    #[async_trait]
    impl AnswerService for DownService {
        async fn complete(&self, _prompt: &str) -> AppResult<String> {
            Err(AppError::service("connection refused"))
        }
    }

    #[test]
    fn test_cli_parses_ask() {
        let cli = Cli::parse_from([
            "data-analyst-agent",
            "ask",
            "sales.csv",
            "--question",
            "bar chart please",
        ]);
        match cli.command {
            Some(Commands::Ask { file, question, chart_out }) => {
                assert_eq!(file, PathBuf::from("sales.csv"));
                assert_eq!(question.as_deref(), Some("bar chart please"));
                assert_eq!(chart_out, PathBuf::from("chart.svg"));
            }
            _ => panic!("expected ask command"),
        }
    }

    #[tokio::test]
    async fn test_run_ask_prints_preview_and_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "Revenue grew 12% in Q3").unwrap();
        let chart_out = dir.path().join("chart.svg");

        let agent = DataAnalystAgent::new(DocumentExtractor::default(), Arc::new(DownService));
        let output = run_ask(&agent, &file, Some("How much growth?"), &chart_out)
            .await
            .unwrap();

        assert!(output.contains("Revenue grew 12% in Q3"));
        assert!(output.contains("Error from LLM: connection refused"));
        assert!(!chart_out.exists());
    }

    #[tokio::test]
    async fn test_run_ask_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let agent = DataAnalystAgent::new(DocumentExtractor::default(), Arc::new(DownService));
        let err = run_ask(&agent, &dir.path().join("absent.csv"), None, &dir.path().join("c.svg"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }
}

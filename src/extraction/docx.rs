use super::{ContentExtractor, ExtractionResult};
use crate::types::{AppError, AppResult};
use docx_rs::{DocumentChild, ParagraphChild, RunChild};

/// Body paragraphs joined by newlines. Tables and headers are skipped.
pub struct DocxExtractor;

impl ContentExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> AppResult<ExtractionResult> {
        let docx = docx_rs::read_docx(bytes).map_err(|e| AppError::decode("DOCX", e.to_string()))?;

        let paragraphs: Vec<String> = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
                _ => None,
            })
            .collect();

        Ok(ExtractionResult::text(paragraphs.join("\n")))
    }
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    push_children(&mut text, &paragraph.children);
    text
}

// Hyperlinks nest their runs as paragraph children.
fn push_children(text: &mut String, children: &[ParagraphChild]) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(text, run),
            ParagraphChild::Hyperlink(link) => push_children(text, &link.children),
            _ => {}
        }
    }
}

fn push_run(text: &mut String, run: &docx_rs::Run) {
    for run_child in &run.children {
        match run_child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) | RunChild::PTab(_) => text.push('\t'),
            RunChild::Break(_) | RunChild::CarriageReturn(_) => text.push('\n'),
            _ => {}
        }
    }
}

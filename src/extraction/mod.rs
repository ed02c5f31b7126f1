//! Content extraction
//!
//! Turns an uploaded file into either a typed table plus its text dump, or a
//! plain text rendering. The file extension picks the strategy:
//! - `csv`, `xls`, `xlsx` -> [`ExtractionResult::Tabular`]
//! - `txt`, `pdf`, `docx`, `png`, `jpg`, `jpeg` -> [`ExtractionResult::TextOnly`]
//!
//! Anything else is reported as [`AppError::UnsupportedType`].

pub mod docx;
pub mod ocr;
pub mod pdf;
pub mod table;
pub mod tabular;
pub mod text;

pub use table::{Cell, Column, ColumnValues, DataTable};

use crate::config::OcrConfig;
use crate::types::{AppError, AppResult};
use tracing::debug;

pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["csv", "xls", "xlsx", "txt", "pdf", "docx", "png", "jpg", "jpeg"];

/// A file as received from the user. Lives for one interaction.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lower-cased text after the last dot, or "" when the name has none.
    pub fn extension(&self) -> String {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Csv,
    Excel,
    Text,
    Pdf,
    Docx,
    Image,
}

impl DocumentKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(DocumentKind::Csv),
            "xls" | "xlsx" => Some(DocumentKind::Excel),
            "txt" => Some(DocumentKind::Text),
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "png" | "jpg" | "jpeg" => Some(DocumentKind::Image),
            _ => None,
        }
    }

    pub fn is_tabular(&self) -> bool {
        matches!(self, DocumentKind::Csv | DocumentKind::Excel)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    Tabular { table: DataTable, rendered_text: String },
    TextOnly { rendered_text: String },
}

impl ExtractionResult {
    pub fn tabular(table: DataTable) -> Self {
        let rendered_text = table.render();
        ExtractionResult::Tabular {
            table,
            rendered_text,
        }
    }

    pub fn text(rendered_text: impl Into<String>) -> Self {
        ExtractionResult::TextOnly {
            rendered_text: rendered_text.into(),
        }
    }

    pub fn rendered_text(&self) -> &str {
        match self {
            ExtractionResult::Tabular { rendered_text, .. } => rendered_text,
            ExtractionResult::TextOnly { rendered_text } => rendered_text,
        }
    }

    pub fn table(&self) -> Option<&DataTable> {
        match self {
            ExtractionResult::Tabular { table, .. } => Some(table),
            ExtractionResult::TextOnly { .. } => None,
        }
    }
}

/// One strategy per document kind. Implementations are pure over `bytes`.
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> AppResult<ExtractionResult>;
}

pub struct DocumentExtractor {
    csv: tabular::CsvExtractor,
    excel: tabular::ExcelExtractor,
    text: text::PlainTextExtractor,
    pdf: pdf::PdfExtractor,
    docx: docx::DocxExtractor,
    image: ocr::OcrExtractor,
}

impl DocumentExtractor {
    pub fn new(ocr: &OcrConfig) -> Self {
        Self {
            csv: tabular::CsvExtractor,
            excel: tabular::ExcelExtractor,
            text: text::PlainTextExtractor,
            pdf: pdf::PdfExtractor,
            docx: docx::DocxExtractor,
            image: ocr::OcrExtractor::new(&ocr.tesseract_cmd, &ocr.language),
        }
    }

    pub fn strategy(&self, kind: DocumentKind) -> &dyn ContentExtractor {
        match kind {
            DocumentKind::Csv => &self.csv,
            DocumentKind::Excel => &self.excel,
            DocumentKind::Text => &self.text,
            DocumentKind::Pdf => &self.pdf,
            DocumentKind::Docx => &self.docx,
            DocumentKind::Image => &self.image,
        }
    }

    /// Whether image uploads can be read on this host.
    pub fn ocr_available(&self) -> bool {
        self.image.is_available()
    }

    pub fn extract(&self, document: &UploadedDocument) -> AppResult<ExtractionResult> {
        let ext = document.extension();
        let kind = DocumentKind::from_extension(&ext).ok_or(AppError::UnsupportedType(ext))?;
        debug!(
            file = %document.name,
            kind = ?kind,
            tabular = kind.is_tabular(),
            bytes = document.bytes.len(),
            "Extracting document content"
        );
        self.strategy(kind).extract(&document.bytes)
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new(&OcrConfig::default())
    }
}

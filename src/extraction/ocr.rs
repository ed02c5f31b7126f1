// Image text recognition through the tesseract command-line engine

use super::{ContentExtractor, ExtractionResult};
use crate::types::{AppError, AppResult};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use tracing::debug;

pub struct OcrExtractor {
    command: String,
    language: String,
}

impl OcrExtractor {
    pub fn new(command: &str, language: &str) -> Self {
        Self {
            command: command.to_string(),
            language: language.to_string(),
        }
    }

    /// Check if the configured engine can be started
    pub fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl ContentExtractor for OcrExtractor {
    fn extract(&self, bytes: &[u8]) -> AppResult<ExtractionResult> {
        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AppError::Internal(format!("Failed to start OCR engine '{}': {}", self.command, e))
            })?;

        // Dropping stdin closes the pipe so the engine sees EOF.
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(bytes) {
                Ok(()) => {}
                // Engine exited before reading everything; its status says why.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                Err(e) => {
                    return Err(AppError::Internal(format!(
                        "Failed to write image to OCR engine: {}",
                        e
                    )))
                }
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| AppError::Internal(format!("OCR engine failed: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::decode("image", stderr.trim().to_string()));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!(chars = text.len(), "OCR finished");
        Ok(ExtractionResult::text(text))
    }
}

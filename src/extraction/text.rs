use super::{ContentExtractor, ExtractionResult};
use crate::types::{AppError, AppResult};

/// Plain text. Bytes must be valid UTF-8; nothing is replaced.
pub struct PlainTextExtractor;

impl ContentExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> AppResult<ExtractionResult> {
        let content = std::str::from_utf8(bytes).map_err(|e| AppError::decode("text", e.to_string()))?;
        Ok(ExtractionResult::text(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_round_trip() {
        let text = "Umsatz: 1.200 €\nRegion: Süd";
        let result = PlainTextExtractor.extract(text.as_bytes()).unwrap();
        assert_eq!(result.rendered_text(), text);
        assert!(result.table().is_none());
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let err = PlainTextExtractor.extract(&[b'o', b'k', 0xc3, 0x28]).unwrap_err();
        assert!(err.to_string().starts_with("Could not read text content:"));
    }
}

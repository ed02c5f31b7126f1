use super::{ContentExtractor, ExtractionResult};
use crate::types::{AppError, AppResult};
use lopdf::Document;
use tracing::warn;

/// Text layer of every page, in page order, concatenated as-is.
pub struct PdfExtractor;

impl ContentExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> AppResult<ExtractionResult> {
        let doc = Document::load_mem(bytes).map_err(|e| AppError::decode("PDF", e.to_string()))?;

        let mut content = String::new();
        for page_number in doc.get_pages().keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => content.push_str(&text),
                // Scanned or oddly encoded pages contribute nothing.
                Err(e) => warn!(page = page_number, error = %e, "No text extracted from PDF page"),
            }
        }

        Ok(ExtractionResult::text(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_pages_in_order() {
        let bytes = build_pdf(&["Revenue summary", "Second page"]);
        let result = PdfExtractor.extract(&bytes).unwrap();
        let text = result.rendered_text();
        let first = text.find("Revenue summary").expect("first page text");
        let second = text.find("Second page").expect("second page text");
        assert!(first < second);
        assert!(result.table().is_none());
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = PdfExtractor.extract(b"%PDF-nope").unwrap_err();
        assert!(matches!(err, AppError::Decode { format: "PDF", .. }));
    }
}

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::{debug, info};

use crate::extraction::UploadedDocument;
use crate::models::{AnalyzeResponse, AppState};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .with_state(state)
}

/// POST /api/analyze - multipart `file` plus optional `question`
async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<AnalyzeResponse>> {
    let mut document: Option<UploadedDocument> = None;
    let mut question: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::InvalidRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("upload_{}", uuid::Uuid::new_v4()));
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidRequest(format!("Failed to read file: {}", e))
                })?;
                document = Some(UploadedDocument::new(filename, data.to_vec()));
            }
            "question" => {
                let text = field.text().await.map_err(|e| {
                    AppError::InvalidRequest(format!("Failed to read question: {}", e))
                })?;
                question = Some(text);
            }
            other => debug!(field = other, "Ignoring multipart field"),
        }
    }

    let document =
        document.ok_or_else(|| AppError::InvalidRequest("missing 'file' field".to_string()))?;
    let filename = document.name.clone();
    info!(file = %filename, has_question = question.is_some(), "Analyze request received");

    let report = state.agent.run(document, question.as_deref()).await?;
    Ok(Json(AnalyzeResponse::from_report(filename, report)))
}

#[cfg(test)]
mod tests {
    use crate::routes::create_router;
    use crate::routes::tests::test_state;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "analyst-test-boundary";

    fn multipart_body(file: Option<(&str, &[u8])>, question: Option<&str>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some((name, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        if let Some(q) = question {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"question\"\r\n\r\n{q}\r\n")
                    .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_analyze(body: Vec<u8>) -> (StatusCode, Value) {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/analyze")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_csv_preview_and_answer() {
        let csv = b"Region,Total Revenue\nAsia,100\nEurope,250\n";
        let (status, json) =
            post_analyze(multipart_body(Some(("sales.csv", csv)), Some("Which region?"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["filename"], "sales.csv");
        assert_eq!(json["preview"]["kind"], "table");
        assert_eq!(json["preview"]["columns"][0], "Region");
        assert_eq!(json["preview"]["rows"][1][0], "Europe");
        assert_eq!(json["answer"]["status"], "ok");
        assert_eq!(json["answer"]["text"], "stub answer");
        assert!(json.get("chart").is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_bad_request() {
        let (status, json) = post_analyze(multipart_body(None, Some("hello"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid_request");
    }

    #[tokio::test]
    async fn test_undecodable_text_is_unprocessable() {
        let (status, json) =
            post_analyze(multipart_body(Some(("notes.txt", &[0xff, 0xfe])), None)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "decode_error");
    }

    #[tokio::test]
    async fn test_unsupported_type_is_reported_in_preview() {
        let (status, json) =
            post_analyze(multipart_body(Some(("deck.pptx", b"PK")), Some("summarize"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["preview"]["kind"], "unsupported");
        assert_eq!(json["preview"]["text"], "Unsupported file type: .pptx");
        assert_eq!(json["answer"]["status"], "ok");
        assert_eq!(json["answer"]["text"], "stub answer");
        assert!(json.get("chart").is_none());
    }
}

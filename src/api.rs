//! HTTP handlers for uploading a dataset and fetching the latest analysis.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::AnalysisError;
use crate::models::AnalysisResult;
use crate::parser::ParseOptions;
use crate::pipeline::{Analyzer, Upload};
use crate::sentiment::SentimentScorer;

/// Multipart field carrying the dataset.
const UPLOAD_FIELD: &str = "file";

pub struct AppState {
    pub analyzer: Analyzer,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let options = ParseOptions {
            csv_row_cap: config.csv_row_cap,
        };
        Self {
            analyzer: Analyzer::new(SentimentScorer::default(), options),
            config,
        }
    }
}

#[derive(Serialize)]
struct AnalysisEnvelope<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    data: &'a AnalysisResult,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    #[schema(example = "Only CSV and JSON files are allowed")]
    pub error: String,
}

/// Multipart body accepted by `POST /api/analyze`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// `.csv` or `.json` dataset
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message.into(),
        }),
    )
        .into_response()
}

fn status_for(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::NoPriorResult => StatusCode::NOT_FOUND,
        AnalysisError::UnsupportedFileType(_) | AnalysisError::Parse(_) => StatusCode::BAD_REQUEST,
    }
}

fn envelope_response(body: &AnalysisEnvelope<'_>) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            info!(
                "Response size: {:.2} MB",
                bytes.len() as f64 / 1024.0 / 1024.0
            );
            ([(header::CONTENT_TYPE, "application/json")], bytes).into_response()
        }
        Err(e) => {
            error!("Failed to serialize analysis: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to serialize analysis")
        }
    }
}

async fn read_upload(multipart: &mut Multipart) -> Result<Option<Upload>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        return Ok(Some(Upload {
            file_name,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Server is up", body = String))
)]
pub async fn health() -> &'static str {
    "Backend server is running..."
}

/// Upload a CSV or JSON review dataset and analyze it.
#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "analysis",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Dataset analyzed; the result is wrapped in {success, message, data}", body = AnalysisResult),
        (status = 400, description = "Missing file, unsupported type or unparsable content", body = ErrorResponse)
    )
)]
pub async fn analyze_upload(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let upload = match read_upload(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return error_response(StatusCode::BAD_REQUEST, "No file uploaded"),
        Err(e) => {
            warn!("Upload error: {}", e);
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };
    info!(
        "File upload received: {} ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    let worker = state.clone();
    let outcome = tokio::task::spawn_blocking(move || worker.analyzer.analyze(&upload)).await;

    match outcome {
        Ok(Ok(result)) => envelope_response(&AnalysisEnvelope {
            success: true,
            message: Some("File uploaded and analyzed successfully"),
            data: &result,
        }),
        Ok(Err(e)) => {
            warn!("Upload error: {}", e);
            error_response(status_for(&e), e.to_string())
        }
        Err(e) => {
            error!("Analysis task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Analysis failed")
        }
    }
}

/// Most recent successful analysis.
#[utoipa::path(
    get,
    path = "/api/analyze/latest",
    tag = "analysis",
    responses(
        (status = 200, description = "Latest result wrapped in {success, data}", body = AnalysisResult),
        (status = 404, description = "Nothing has been analyzed yet", body = ErrorResponse)
    )
)]
pub async fn latest_analysis(State(state): State<Arc<AppState>>) -> Response {
    match state.analyzer.latest() {
        Ok(result) => envelope_response(&AnalysisEnvelope {
            success: true,
            message: None,
            data: &result,
        }),
        Err(e) => error_response(status_for(&e), e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use axum::body::{to_bytes, Body};
    use axum::extract::{FromRequest, Request};
    use serde_json::Value;

    const BOUNDARY: &str = "review-upload-boundary";

    async fn multipart_form(field: &str, file_name: &str, content: &[u8]) -> Multipart {
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n",
            b = BOUNDARY
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&AnalysisError::NoPriorResult), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&AnalysisError::UnsupportedFileType("x.txt".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AnalysisError::Parse(ParseError::NotAnArray)),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_field_is_rejected() {
        let state = Arc::new(AppState::new(Config::default()));
        let form = multipart_form("attachment", "reviews.csv", b"review_id,review_text\n1,great\n").await;

        let response = analyze_upload(State(state.clone()), form).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "No file uploaded");
        assert!(state.analyzer.latest().is_err());
    }

    #[tokio::test]
    async fn test_upload_with_unsupported_type_is_rejected() {
        let state = Arc::new(AppState::new(Config::default()));
        let form = multipart_form("file", "notes.txt", b"hello").await;

        let response = analyze_upload(State(state), form).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_upload_returns_success_envelope() {
        let state = Arc::new(AppState::new(Config::default()));
        let csv = b"review_id,review_text,rating\n1,Great value and excellent quality,5\n2,Awful and broken,1\n";
        let form = multipart_form("file", "reviews.csv", csv).await;

        let response = analyze_upload(State(state.clone()), form).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "File uploaded and analyzed successfully");
        assert_eq!(body["data"]["file_info"]["original_name"], "reviews.csv");
        assert_eq!(body["data"]["summary"]["total_reviews"], 2);
        assert!(state.analyzer.latest().is_ok());
    }

    #[tokio::test]
    async fn test_latest_is_404_before_upload() {
        let state = Arc::new(AppState::new(Config::default()));
        let response = latest_analysis(State(state)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_latest_returns_stored_result() {
        let state = Arc::new(AppState::new(Config::default()));
        state
            .analyzer
            .analyze(&Upload {
                file_name: "r.json".to_string(),
                bytes: br#"[{"review_id": "1", "review_text": "great"}]"#.to_vec(),
            })
            .unwrap();

        let response = latest_analysis(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}

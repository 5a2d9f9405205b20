//! HTTP contract tests for the scan endpoint, run in-process against the
//! router with canned OCR output.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::Engine as _;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use medscan_core::{MedicineRecord, ReferenceTable};
use medscan_ner::GazetteerExtractor;
use medscan_server::{router, AppState, OcrEngine, OcrError, OcrText, ScanPipeline};

enum FakeOcr {
    Text(&'static str),
    NoText,
    Failing,
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn extract_text(&self, _png: &[u8]) -> Result<OcrText, OcrError> {
        match self {
            FakeOcr::Text(text) => Ok(OcrText::Text(text.to_string())),
            FakeOcr::NoText => Ok(OcrText::NoText),
            FakeOcr::Failing => Err(OcrError::Api("quota exceeded (code 8)".into())),
        }
    }

    fn backend(&self) -> &'static str {
        "fake"
    }
}

fn table() -> ReferenceTable {
    ReferenceTable::from_records([
        MedicineRecord::new(
            "paracetamol",
            Some("Relieves pain and fever".into()),
            Some("Nausea".into()),
        ),
        MedicineRecord::new("ibuprofen", None, None),
        MedicineRecord::new("aspirin", Some("Blood thinner".into()), None),
    ])
}

fn app(ocr: FakeOcr) -> Router {
    app_with_limit(ocr, 20 * 1024 * 1024)
}

fn app_with_limit(ocr: FakeOcr, max_body_bytes: usize) -> Router {
    let table = table();
    let mut ner = GazetteerExtractor::new();
    ner.extend(table.fuzzy_candidates().map(|(name, _)| name));
    let pipeline = ScanPipeline::new(Arc::new(table), Arc::new(ocr), Arc::new(ner));
    router(Arc::new(AppState::new(pipeline)), max_body_bytes)
}

fn jpeg_b64() -> String {
    let img = image::RgbImage::from_pixel(16, 16, image::Rgb([255, 255, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Jpeg).unwrap();
    base64::engine::general_purpose::STANDARD.encode(out.into_inner())
}

async fn post(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/process_image")
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
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

async fn post_image(app: Router, image: &str) -> (StatusCode, Value) {
    post(app, json!({ "image": image }).to_string()).await
}

#[tokio::test]
async fn test_exact_match() {
    let (status, body) = post_image(app(FakeOcr::Text("PARACETAMOL 500 mg")), &jpeg_b64()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "medicine_name": "paracetamol",
            "description": "Relieves pain and fever",
            "side_effects": "Nausea",
            "match_type": "Med7 direct match"
        })
    );
}

#[tokio::test]
async fn test_fuzzy_match_fills_defaults() {
    let (status, body) = post_image(app(FakeOcr::Text("Ibuprofin tablets")), &jpeg_b64()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["medicine_name"], "ibuprofen");
    assert_eq!(body["description"], "No description available");
    assert_eq!(body["side_effects"], "No side effects listed");
    assert_eq!(body["match_type"], "Fuzzy match after Med7 fail");
}

#[tokio::test]
async fn test_fuzzy_on_full_text() {
    let (status, body) = post_image(app(FakeOcr::Text("asprin")), &jpeg_b64()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["medicine_name"], "aspirin");
}

#[tokio::test]
async fn test_not_recognized() {
    let (status, body) = post_image(app(FakeOcr::Text("Store below 25C")), &jpeg_b64()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "Medicine not recognized" }));
}

#[tokio::test]
async fn test_no_text_is_not_recognized() {
    let (status, body) = post_image(app(FakeOcr::NoText), &jpeg_b64()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "Medicine not recognized" }));
}

#[tokio::test]
async fn test_missing_image() {
    for payload in [json!({}), json!({ "image": "" }), json!({ "image": null })] {
        let (status, body) = post(app(FakeOcr::NoText), payload.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body, json!({ "error": "Image data not found" }));
    }
}

#[tokio::test]
async fn test_body_not_json_object() {
    for payload in ["not json", "[1, 2]", "{\"image\": 5}"] {
        let (status, body) = post(app(FakeOcr::NoText), payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body, json!({ "error": "Image data not found" }));
    }
}

#[tokio::test]
async fn test_invalid_base64() {
    let (status, body) = post_image(app(FakeOcr::NoText), "@@not-base64@@").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid base64 image data"));
}

#[tokio::test]
async fn test_not_an_image() {
    let (status, body) = post_image(app(FakeOcr::NoText), "dGVzdA==").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("Cannot read image"));
}

#[tokio::test]
async fn test_ocr_failure() {
    let (status, body) = post_image(app(FakeOcr::Failing), &jpeg_b64()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "OCR service rejected the request: quota exceeded (code 8)" })
    );
}

#[tokio::test]
async fn test_wrapped_base64() {
    let wrapped: String = jpeg_b64()
        .as_bytes()
        .chunks(76)
        .map(|line| format!("{}\n", String::from_utf8_lossy(line)))
        .collect();

    let (status, body) = post_image(app(FakeOcr::Text("paracetamol")), &wrapped).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["medicine_name"], "paracetamol");
}

#[tokio::test]
async fn test_body_limit() {
    let (status, body) = post_image(app_with_limit(FakeOcr::NoText, 64), &jpeg_b64()).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_health() {
    let response = app(FakeOcr::NoText)
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "medscan");
    assert_eq!(body["medicines"], 3);
    assert_eq!(body["distinct_names"], 3);
    assert_eq!(body["dataset_sha256"].as_str().unwrap().len(), 64);
    assert_eq!(body["ner_backend"], "gazetteer");
}

#[tokio::test]
async fn test_cors_preflight() {
    let response = app(FakeOcr::NoText)
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/process_image")
                .header(header::ORIGIN, "http://localhost:8081")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

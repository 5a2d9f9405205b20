//! OCR collaborator.
//!
//! Images are normalized to PNG before they leave the process. The
//! production backend is the Google Cloud Vision `images:annotate` REST API.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default Cloud Vision endpoint.
pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// OCR errors.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Cannot read image: {0}")]
    Image(#[from] image::ImageError),

    #[error("OCR service error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OCR service rejected the request: {0}")]
    Api(String),
}

pub type OcrResult<T> = Result<T, OcrError>;

/// Text read from an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrText {
    Text(String),
    NoText,
}

/// A source of text for package photos.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Read text from PNG bytes.
    async fn extract_text(&self, png: &[u8]) -> OcrResult<OcrText>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Decode any supported image format and re-encode it as PNG.
pub fn prepare_image(bytes: &[u8]) -> OcrResult<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)?;
    let mut png = Cursor::new(Vec::new());
    decoded.write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}

/// How requests to Cloud Vision are authenticated.
#[derive(Debug, Clone)]
pub enum VisionCredential {
    ApiKey(String),
    BearerToken(String),
}

#[derive(Serialize)]
struct AnnotateRequest<'a> {
    requests: [AnnotateImageRequest<'a>; 1],
}

#[derive(Serialize)]
struct AnnotateImageRequest<'a> {
    image: ImageContent,
    features: [Feature<'a>; 1],
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Deserialize, Default)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct ApiStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// Cloud Vision text detection client.
pub struct VisionOcr {
    client: reqwest::Client,
    endpoint: String,
    credential: Option<VisionCredential>,
}

impl VisionOcr {
    pub fn new(
        endpoint: impl Into<String>,
        credential: Option<VisionCredential>,
        timeout: Duration,
    ) -> OcrResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            credential,
        })
    }
}

#[async_trait]
impl OcrEngine for VisionOcr {
    async fn extract_text(&self, png: &[u8]) -> OcrResult<OcrText> {
        let request = AnnotateRequest {
            requests: [AnnotateImageRequest {
                image: ImageContent {
                    content: base64::engine::general_purpose::STANDARD.encode(png),
                },
                features: [Feature {
                    kind: "TEXT_DETECTION",
                }],
            }],
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        builder = match &self.credential {
            Some(VisionCredential::ApiKey(key)) => builder.header("x-goog-api-key", key),
            Some(VisionCredential::BearerToken(token)) => builder.bearer_auth(token),
            None => builder,
        };

        let start = std::time::Instant::now();
        let response = builder.send().await?;
        let status = response.status();
        let raw = response.text().await?;

        let first = match serde_json::from_str::<AnnotateResponse>(&raw) {
            Ok(body) => body.responses.into_iter().next().unwrap_or_default(),
            Err(_) if !status.is_success() => AnnotateImageResponse::default(),
            Err(e) => return Err(OcrError::Api(format!("Malformed response: {}", e))),
        };
        if let Some(err) = first.error {
            return Err(OcrError::Api(format!("{} (code {})", err.message, err.code)));
        }
        if !status.is_success() {
            return Err(OcrError::Api(format!("HTTP {}", status)));
        }

        let text = first
            .text_annotations
            .into_iter()
            .next()
            .map(|a| a.description)
            .filter(|d| !d.trim().is_empty());

        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            text_len = text.as_ref().map_or(0, String::len),
            "Vision OCR complete"
        );

        Ok(match text {
            Some(text) => OcrText::Text(text),
            None => OcrText::NoText,
        })
    }

    fn backend(&self) -> &'static str {
        "vision"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 8, Rgb([200, 30, 30]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn client(server: &MockServer, credential: Option<VisionCredential>) -> VisionOcr {
        VisionOcr::new(server.uri(), credential, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_prepare_image_converts_jpeg_to_png() {
        let png = prepare_image(&encoded(ImageFormat::Jpeg)).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_prepare_image_rejects_garbage() {
        assert!(matches!(prepare_image(b"test"), Err(OcrError::Image(_))));
    }

    #[tokio::test]
    async fn test_vision_returns_first_annotation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-goog-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "responses": [{
                    "textAnnotations": [
                        { "description": "Paracetamol\nTablets IP" },
                        { "description": "Paracetamol" }
                    ]
                }]
            })))
            .mount(&server)
            .await;

        let ocr = client(&server, Some(VisionCredential::ApiKey("secret".into())));
        let text = ocr.extract_text(&encoded(ImageFormat::Png)).await.unwrap();

        assert_eq!(text, OcrText::Text("Paracetamol\nTablets IP".into()));
    }

    #[tokio::test]
    async fn test_vision_no_annotations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "responses": [{}]
            })))
            .mount(&server)
            .await;

        let ocr = client(&server, None);
        let text = ocr.extract_text(&encoded(ImageFormat::Png)).await.unwrap();

        assert_eq!(text, OcrText::NoText);
    }

    #[tokio::test]
    async fn test_vision_error_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "responses": [{ "error": { "code": 3, "message": "Bad image data." } }]
            })))
            .mount(&server)
            .await;

        let ocr = client(&server, None);
        let err = ocr.extract_text(&encoded(ImageFormat::Png)).await.unwrap_err();

        assert_eq!(err.to_string(), "OCR service rejected the request: Bad image data. (code 3)");
    }

    #[tokio::test]
    async fn test_vision_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let ocr = client(&server, Some(VisionCredential::BearerToken("token-1".into())));
        let err = ocr.extract_text(&encoded(ImageFormat::Png)).await.unwrap_err();

        assert!(matches!(err, OcrError::Api(msg) if msg.contains("403")));
    }
}

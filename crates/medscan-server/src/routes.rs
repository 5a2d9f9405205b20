//! HTTP routes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use medscan_core::ResolvedMedicine;

use crate::error::{ApiError, NOT_RECOGNIZED};
use crate::pipeline::{ScanOutcome, ScanPipeline};

/// Shared application state.
pub struct AppState {
    pub pipeline: ScanPipeline,
    /// When the reference table was loaded
    pub loaded_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: ScanPipeline) -> Self {
        Self {
            pipeline,
            loaded_at: Utc::now(),
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/process_image", post(process_image))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ProcessImageRequest {
    #[serde(default)]
    pub image: Option<String>,
}

/// Body of a successful scan.
#[derive(Debug, Serialize, PartialEq)]
pub struct MedicineResponse {
    pub medicine_name: String,
    pub description: String,
    pub side_effects: String,
    pub match_type: String,
}

impl From<&ResolvedMedicine> for MedicineResponse {
    fn from(medicine: &ResolvedMedicine) -> Self {
        Self {
            medicine_name: medicine.name.clone(),
            description: medicine.record.description_or_default().to_string(),
            side_effects: medicine.record.side_effects_or_default().to_string(),
            match_type: medicine.tier.label().to_string(),
        }
    }
}

/// JSON body for a scan outcome. Both variants are sent with 200.
pub fn outcome_body(outcome: &ScanOutcome) -> serde_json::Value {
    match outcome {
        ScanOutcome::Recognized(medicine) => json!(MedicineResponse::from(medicine)),
        ScanOutcome::NotRecognized => json!({ "error": NOT_RECOGNIZED }),
    }
}

async fn process_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProcessImageRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(ApiError::PayloadTooLarge(rejection.body_text()));
        }
        Err(rejection) => {
            tracing::debug!(rejection = %rejection.body_text(), "Unreadable request body");
            return Err(ApiError::ImageNotFound);
        }
    };

    let image = request
        .image
        .filter(|image| !image.is_empty())
        .ok_or(ApiError::ImageNotFound)?;

    let outcome = state.pipeline.scan(&image).await?;
    Ok((StatusCode::OK, Json(outcome_body(&outcome))).into_response())
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let table = state.pipeline.table();
    Json(json!({
        "status": "ok",
        "service": "medscan",
        "version": env!("CARGO_PKG_VERSION"),
        "medicines": table.len(),
        "distinct_names": table.distinct_names(),
        "dataset_sha256": table.fingerprint(),
        "ocr_backend": state.pipeline.ocr_backend(),
        "ner_backend": state.pipeline.ner_backend(),
        "loaded_at": state.loaded_at.to_rfc3339(),
    }))
}

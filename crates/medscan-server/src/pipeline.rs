//! Scan pipeline: base64 photo in, resolved medicine out.
//!
//! ```text
//! base64 ──► bytes ──► PNG ──► OCR ──► NER ──► first DRUG ──► Resolver
//! ```

use std::sync::Arc;

use base64::Engine as _;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use medscan_core::{ReferenceTable, ResolutionResult, ResolvedMedicine, Resolver};
use medscan_ner::{first_drug, EntityExtractor, ExtractionError};

use crate::ocr::{prepare_image, OcrEngine, OcrError, OcrText};

/// Scan failures. All of them are internal errors at the HTTP boundary.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Background task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

pub type ScanResult<T> = Result<T, ScanError>;

/// Final outcome of a scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Recognized(ResolvedMedicine),
    NotRecognized,
}

impl From<ResolutionResult> for ScanOutcome {
    fn from(result: ResolutionResult) -> Self {
        match result {
            ResolutionResult::Resolved(medicine) => ScanOutcome::Recognized(medicine),
            ResolutionResult::Unresolved => ScanOutcome::NotRecognized,
        }
    }
}

/// The loaded reference table plus its OCR and NER collaborators.
#[derive(Clone)]
pub struct ScanPipeline {
    table: Arc<ReferenceTable>,
    ocr: Arc<dyn OcrEngine>,
    ner: Arc<dyn EntityExtractor>,
}

impl ScanPipeline {
    pub fn new(
        table: Arc<ReferenceTable>,
        ocr: Arc<dyn OcrEngine>,
        ner: Arc<dyn EntityExtractor>,
    ) -> Self {
        Self { table, ocr, ner }
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    pub fn ocr_backend(&self) -> &'static str {
        self.ocr.backend()
    }

    pub fn ner_backend(&self) -> &'static str {
        self.ner.backend()
    }

    /// Run a full scan on a base64-encoded photo.
    pub async fn scan(&self, image_b64: &str) -> ScanResult<ScanOutcome> {
        let span = tracing::info_span!("scan", request_id = %Uuid::new_v4());
        self.scan_inner(image_b64).instrument(span).await
    }

    async fn scan_inner(&self, image_b64: &str) -> ScanResult<ScanOutcome> {
        let bytes = decode_image(image_b64)?;
        let input_bytes = bytes.len();
        // Decoding and re-encoding a full-size photo is CPU-bound
        let png = tokio::task::spawn_blocking(move || prepare_image(&bytes)).await??;
        tracing::debug!(input_bytes, png_bytes = png.len(), "Image prepared");

        let text = match self.ocr.extract_text(&png).await? {
            OcrText::Text(text) => text,
            OcrText::NoText => {
                tracing::info!(backend = self.ocr.backend(), "No text detected");
                return Ok(ScanOutcome::NotRecognized);
            }
        };

        let outcome = ScanOutcome::from(self.resolve_text(&text).await?);
        match &outcome {
            ScanOutcome::Recognized(medicine) => tracing::info!(
                medicine = %medicine.name,
                tier = %medicine.tier,
                score = ?medicine.score,
                "Medicine recognized"
            ),
            ScanOutcome::NotRecognized => tracing::info!("Medicine not recognized"),
        }
        Ok(outcome)
    }

    /// Run NER over OCR text and resolve the first drug entity.
    pub async fn resolve_text(&self, text: &str) -> ScanResult<ResolutionResult> {
        let entities = self.ner.extract(text).await?;
        let candidate = first_drug(&entities);
        tracing::debug!(
            backend = self.ner.backend(),
            entities = entities.len(),
            candidate = ?candidate,
            "Entities extracted"
        );

        // The fuzzy tiers scan every distinct name
        let table = Arc::clone(&self.table);
        let text = text.to_owned();
        let result = tokio::task::spawn_blocking(move || {
            Resolver::new(&table).resolve(&text, candidate.as_deref())
        })
        .await?;
        Ok(result)
    }
}

/// Decode the request's base64 image.
///
/// ASCII whitespace is ignored and a `data:<mime>;base64,` prefix is stripped.
pub fn decode_image(image_b64: &str) -> ScanResult<Vec<u8>> {
    let payload = match image_b64.trim_start().strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, data)| data),
        None => image_b64,
    };
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
}

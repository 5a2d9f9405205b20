//! MedScan HTTP service.
//!
//! Accepts a base64 photo of a medicine package on `POST /process_image`,
//! reads its text with an [`ocr::OcrEngine`], extracts a drug name with a
//! [`medscan_ner::EntityExtractor`] and resolves it against the loaded
//! [`medscan_core::ReferenceTable`].

pub mod config;
pub mod error;
pub mod ocr;
pub mod pipeline;
pub mod routes;

pub use config::{Config, NerBackend};
pub use error::ApiError;
pub use ocr::{OcrEngine, OcrError, OcrText, VisionCredential, VisionOcr};
pub use pipeline::{ScanError, ScanOutcome, ScanPipeline};
pub use routes::{router, AppState};

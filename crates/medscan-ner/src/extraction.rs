//! Entity types, backend trait and NER output parsing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label carried by drug-name entities.
pub const DRUG_LABEL: &str = "DRUG";

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("NER service error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// A labelled span of text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entity {
    /// Span text as it appears in the input
    pub text: String,
    /// Entity category (e.g. "DRUG", "DOSAGE")
    pub label: String,
    /// Start offset in the input
    #[serde(default)]
    pub start: usize,
    /// End offset in the input
    #[serde(default)]
    pub end: usize,
}

impl Entity {
    pub fn drug(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            label: DRUG_LABEL.to_string(),
            start,
            end,
        }
    }

    pub fn is_drug(&self) -> bool {
        self.label.eq_ignore_ascii_case(DRUG_LABEL)
    }
}

/// Raw NER output from an extraction service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NerOutput {
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// A source of drug-name entities.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Extract entities from OCR text, in text order.
    async fn extract(&self, text: &str) -> ExtractionResult<Vec<Entity>>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Parse NER service output into entities.
///
/// Prose around the JSON object is ignored.
pub fn parse_ner_output(raw: &str) -> ExtractionResult<NerOutput> {
    let json_start = raw.find('{').ok_or_else(|| {
        ExtractionError::InvalidFormat("No JSON object found in response".into())
    })?;
    let json_end = raw.rfind('}').ok_or_else(|| {
        ExtractionError::InvalidFormat("No closing brace found in response".into())
    })?;
    if json_end < json_start {
        return Err(ExtractionError::InvalidFormat(
            "Closing brace precedes opening brace".into(),
        ));
    }

    let output: NerOutput = serde_json::from_str(&raw[json_start..=json_end])?;
    Ok(output)
}

/// Lowercased text of the first DRUG entity, if any.
pub fn first_drug(entities: &[Entity]) -> Option<String> {
    entities
        .iter()
        .find(|e| e.is_drug())
        .map(|e| e.text.to_lowercase())
}

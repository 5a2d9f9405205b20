use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::ocr::{VisionCredential, DEFAULT_VISION_ENDPOINT};

/// Log filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Which entity extractor the server uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NerBackend {
    /// Built-in drug lexicon, extended with reference table names
    Gazetteer,
    /// Remote NER service at `MEDSCAN_NER_URL`
    Http,
}

impl FromStr for NerBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gazetteer" => Ok(NerBackend::Gazetteer),
            "http" => Ok(NerBackend::Http),
            other => Err(format!("Unknown NER backend: {}", other)),
        }
    }
}

/// MedScan runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Reference table, CSV or SQLite
    pub dataset_path: PathBuf,
    pub ner_backend: NerBackend,
    pub ner_url: Option<String>,
    pub vision_endpoint: String,
    pub vision_api_key: Option<String>,
    pub vision_token: Option<String>,
    /// Per-request timeout for OCR and NER calls
    pub collaborator_timeout_secs: u64,
    /// Maximum request body size
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            dataset_path: PathBuf::from("sorted_cleaned_dataset.csv"),
            ner_backend: NerBackend::Gazetteer,
            ner_url: None,
            vision_endpoint: DEFAULT_VISION_ENDPOINT.to_string(),
            vision_api_key: None,
            vision_token: None,
            collaborator_timeout_secs: 30,
            max_body_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Invalid values are logged, so the tracing subscriber should be
    /// installed first.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ner_backend = match lookup("MEDSCAN_NER_BACKEND").map(|v| v.parse::<NerBackend>()) {
            Some(Ok(backend)) => backend,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Falling back to the gazetteer NER backend");
                defaults.ner_backend
            }
            None => defaults.ner_backend,
        };

        Self {
            bind_address: non_empty("MEDSCAN_BIND").unwrap_or(defaults.bind_address),
            port: parsed(&lookup, "MEDSCAN_PORT").unwrap_or(defaults.port),
            dataset_path: non_empty("MEDSCAN_DATASET")
                .map(PathBuf::from)
                .unwrap_or(defaults.dataset_path),
            ner_backend,
            ner_url: non_empty("MEDSCAN_NER_URL"),
            vision_endpoint: non_empty("MEDSCAN_VISION_ENDPOINT")
                .unwrap_or(defaults.vision_endpoint),
            vision_api_key: non_empty("MEDSCAN_VISION_API_KEY"),
            vision_token: non_empty("MEDSCAN_VISION_TOKEN"),
            collaborator_timeout_secs: parsed(&lookup, "MEDSCAN_COLLABORATOR_TIMEOUT_SECS")
                .unwrap_or(defaults.collaborator_timeout_secs),
            max_body_bytes: parsed(&lookup, "MEDSCAN_MAX_BODY_BYTES")
                .unwrap_or(defaults.max_body_bytes),
        }
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }

    /// OCR credential. An API key takes precedence over a bearer token.
    pub fn vision_credential(&self) -> Option<VisionCredential> {
        self.vision_api_key
            .clone()
            .map(VisionCredential::ApiKey)
            .or_else(|| self.vision_token.clone().map(VisionCredential::BearerToken))
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

//! Remote NER service client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::extraction::{parse_ner_output, Entity, EntityExtractor, ExtractionResult};

#[derive(Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

/// Extractor that posts text to an HTTP NER service.
///
/// The service receives `{"text": ...}` and answers with
/// `{"entities": [{"text", "label", "start", "end"}]}`.
pub struct HttpEntityExtractor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpEntityExtractor {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> ExtractionResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EntityExtractor for HttpEntityExtractor {
    async fn extract(&self, text: &str) -> ExtractionResult<Vec<Entity>> {
        let body = self
            .client
            .post(&self.endpoint)
            .json(&NerRequest { text })
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let output = parse_ner_output(&body)?;
        tracing::debug!(
            endpoint = %self.endpoint,
            entities = output.entities.len(),
            "NER service responded"
        );
        Ok(output.entities)
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}

//! Image text recognition boundary.
//!
//! Recognition is delegated to an external service consumed as
//! `image bytes → text | empty`. The [`OcrProvider`] trait keeps the
//! extractors independent of any concrete backend:
//! - **[`DisabledOcr`]** — returns errors; used when OCR is not configured,
//!   so image uploads fail loudly instead of producing a silent hole in
//!   the corpus.
//! - **[`HttpOcr`]** — posts a base64 payload to a configured endpoint
//!   with a bounded timeout.

use async_trait::async_trait;
use base64::Engine as _;
use std::time::Duration;

use crate::config::OcrConfig;
use crate::error::ExtractError;

#[async_trait]
pub trait OcrProvider: Send + Sync {
    /// Recognize text in an image. An empty string means no text detected.
    async fn recognize(&self, image: &[u8]) -> Result<String, ExtractError>;
    fn name(&self) -> &str;
}

/// Placeholder provider used when `ocr.provider = "disabled"`.
pub struct DisabledOcr;

#[async_trait]
impl OcrProvider for DisabledOcr {
    async fn recognize(&self, _image: &[u8]) -> Result<String, ExtractError> {
        Err(ExtractError::Ocr(
            "no OCR provider configured; set ocr.provider in the config to ingest images"
                .to_string(),
        ))
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

/// Provider that calls an HTTP recognition service.
///
/// Sends `POST {endpoint}` with `{"image": "<base64>"}` and expects
/// `{"text": "..."}` back.
pub struct HttpOcr {
    endpoint: String,
    timeout: Duration,
}

impl HttpOcr {
    pub fn new(config: &OcrConfig) -> anyhow::Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| anyhow::anyhow!("ocr.endpoint required for the http provider"))?;
        Ok(Self {
            endpoint,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

#[async_trait]
impl OcrProvider for HttpOcr {
    async fn recognize(&self, image: &[u8]) -> Result<String, ExtractError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ExtractError::Ocr(e.to_string()))?;

        let body = serde_json::json!({
            "image": base64::engine::general_purpose::STANDARD.encode(image),
        });

        let response = client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::Ocr(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ExtractError::Ocr(format!(
                "recognition service returned {status}: {detail}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ExtractError::Ocr(e.to_string()))?;

        Ok(json
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string())
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Create the appropriate [`OcrProvider`] based on configuration.
pub fn create_provider(config: &OcrConfig) -> anyhow::Result<Box<dyn OcrProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledOcr)),
        "http" => Ok(Box::new(HttpOcr::new(config)?)),
        other => anyhow::bail!("Unknown OCR provider: {}", other),
    }
}

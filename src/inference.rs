//! Model backend abstraction and implementations.
//!
//! Defines the [`InferenceBackend`] trait and concrete implementations:
//! - **[`DisabledBackend`]** — returns errors; used when no backend is
//!   configured.
//! - **[`HostedBackend`]** — calls a Hugging Face style inference API
//!   with retry and backoff.
//!
//! # Retry Strategy
//!
//! The hosted backend retries transient errors with exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error, incl. model loading) → retry
//! - other HTTP 4xx (client error) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use async_trait::async_trait;
use std::time::Duration;

use crate::config::ModelsConfig;
use crate::error::EngineError;

/// Generation bounds applied to every summarization call.
///
/// Fixed by the pipeline: bounded output length and deterministic,
/// non-sampling decoding.
pub const SUMMARY_MAX_LENGTH: u32 = 150;
pub const SUMMARY_MIN_LENGTH: u32 = 30;

/// An extractive answer span with its confidence score.
#[derive(Debug, Clone)]
pub struct AnswerSpan {
    pub answer: String,
    pub score: f64,
}

/// Interface implemented by model backends.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Summarize one chunk of text within the fixed generation bounds.
    async fn summarize(&self, text: &str) -> Result<String, EngineError>;

    /// Answer a question by selecting a span from `context`.
    async fn answer(&self, question: &str, context: &str) -> Result<AnswerSpan, EngineError>;

    /// Human-readable backend description for logs.
    fn describe(&self) -> String;
}

// ============ Disabled backend ============

/// A backend that always fails; used when `models.provider = "disabled"`.
pub struct DisabledBackend;

#[async_trait]
impl InferenceBackend for DisabledBackend {
    async fn summarize(&self, _text: &str) -> Result<String, EngineError> {
        Err(EngineError::ModelUnavailable(
            "model backend is disabled".to_string(),
        ))
    }

    async fn answer(&self, _question: &str, _context: &str) -> Result<AnswerSpan, EngineError> {
        Err(EngineError::ModelUnavailable(
            "model backend is disabled".to_string(),
        ))
    }

    fn describe(&self) -> String {
        "disabled".to_string()
    }
}

// ============ Hosted backend ============

/// Backend calling a hosted inference API (`POST {base_url}/models/{model}`).
///
/// An optional bearer token is read from `HF_API_TOKEN`; anonymous calls
/// are allowed but rate-limited by the service.
pub struct HostedBackend {
    base_url: String,
    summarizer_model: String,
    qa_model: String,
    timeout: Duration,
    max_retries: u32,
    api_token: Option<String>,
}

impl HostedBackend {
    pub fn new(config: &ModelsConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            summarizer_model: config.summarizer_model.clone(),
            qa_model: config.qa_model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
            api_token: std::env::var("HF_API_TOKEN").ok(),
        }
    }

    /// POST a JSON body to a model endpoint with retry/backoff.
    async fn call_model(
        &self,
        model: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| EngineError::ModelUnavailable(e.to_string()))?;

        let url = format!("{}/models/{}", self.base_url, model);
        let mut last_err: Option<EngineError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let mut request = client.post(&url).json(body);
            if let Some(token) = &self.api_token {
                request = request.header("Authorization", format!("Bearer {token}"));
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return response
                            .json()
                            .await
                            .map_err(|e| EngineError::InvalidResponse(e.to_string()));
                    }

                    let detail = response.text().await.unwrap_or_default();

                    // Rate limited, model loading, or server error: retry.
                    if status.as_u16() == 429 || status.is_server_error() {
                        tracing::debug!(%status, model, attempt, "transient model error, retrying");
                        last_err = Some(EngineError::ModelUnavailable(format!(
                            "{model} returned {status}: {detail}"
                        )));
                        continue;
                    }

                    // Other client errors are not retryable.
                    return Err(EngineError::Inference(format!(
                        "{model} returned {status}: {detail}"
                    )));
                }
                Err(e) => {
                    tracing::debug!(error = %e, model, attempt, "model request failed, retrying");
                    last_err = Some(EngineError::ModelUnavailable(e.to_string()));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| EngineError::ModelUnavailable("retries exhausted".to_string())))
    }
}

#[async_trait]
impl InferenceBackend for HostedBackend {
    async fn summarize(&self, text: &str) -> Result<String, EngineError> {
        let body = serde_json::json!({
            "inputs": text,
            "parameters": {
                "max_length": SUMMARY_MAX_LENGTH,
                "min_length": SUMMARY_MIN_LENGTH,
                "do_sample": false,
            },
            "options": { "wait_for_model": true },
        });

        let json = self.call_model(&self.summarizer_model, &body).await?;
        parse_summary_response(&json)
    }

    async fn answer(&self, question: &str, context: &str) -> Result<AnswerSpan, EngineError> {
        let body = serde_json::json!({
            "inputs": { "question": question, "context": context },
            "options": { "wait_for_model": true },
        });

        let json = self.call_model(&self.qa_model, &body).await?;
        parse_answer_response(&json)
    }

    fn describe(&self) -> String {
        format!(
            "hosted ({} / {})",
            self.summarizer_model, self.qa_model
        )
    }
}

/// Parse `[{"summary_text": "..."}]`.
fn parse_summary_response(json: &serde_json::Value) -> Result<String, EngineError> {
    json.as_array()
        .and_then(|items| items.first())
        .and_then(|item| item.get("summary_text"))
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
        .ok_or_else(|| {
            EngineError::InvalidResponse(format!("missing summary_text in: {json}"))
        })
}

/// Parse `{"answer": "...", "score": 0.97, "start": .., "end": ..}`.
fn parse_answer_response(json: &serde_json::Value) -> Result<AnswerSpan, EngineError> {
    let answer = json
        .get("answer")
        .and_then(|a| a.as_str())
        .ok_or_else(|| EngineError::InvalidResponse(format!("missing answer in: {json}")))?;
    let score = json.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0);
    Ok(AnswerSpan {
        answer: answer.to_string(),
        score,
    })
}

/// Create the appropriate [`InferenceBackend`] based on configuration.
pub fn create_backend(config: &ModelsConfig) -> anyhow::Result<Box<dyn InferenceBackend>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledBackend)),
        "huggingface" => Ok(Box::new(HostedBackend::new(config))),
        other => anyhow::bail!("Unknown model provider: {}", other),
    }
}

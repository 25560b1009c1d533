//! Error types for the ingestion and query pipeline.
//!
//! Each stage signals failure as a value rather than by unwinding, so the
//! batch-abort and per-query-recovery policies are enforced structurally:
//! ingestion errors abort the whole upload without touching the corpus,
//! and engine errors leave both the corpus and the transcript intact.

use thiserror::Error;

/// A single document's content could not be decoded or parsed.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported document format")]
    UnsupportedFormat,
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
    #[error("invalid UTF-8 text: {0}")]
    Encoding(String),
    #[error("text recognition failed: {0}")]
    Ocr(String),
}

/// Ingestion failure. Either variant aborts the entire batch.
#[derive(Debug, Error)]
pub enum IngestError {
    /// One or more files failed the extension/MIME allow-list check.
    #[error("unsupported file types: {}", .0.join(", "))]
    UnsupportedFiles(Vec<String>),
    /// A single file failed to extract; no partial corpus is produced.
    #[error("failed to extract text from {name}: {source}")]
    Extraction {
        name: String,
        #[source]
        source: ExtractError,
    },
}

/// Model backend failure, recovered at the query level.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The backend could not be reached or is not configured.
    #[error("model backend unavailable: {0}")]
    ModelUnavailable(String),
    /// The backend rejected the request or failed to run inference.
    #[error("inference failed: {0}")]
    Inference(String),
    /// The backend responded with a payload the engine cannot interpret.
    #[error("malformed model response: {0}")]
    InvalidResponse(String),
}

//! Core data types used throughout docchat.
//!
//! These types represent the documents, queries, answers, and transcript
//! entries that flow through the ingestion and query pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document handed to the ingestion boundary. Immutable once received.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Original filename, including extension.
    pub name: String,
    /// MIME type declared by the uploader (may be empty).
    pub mime_type: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Closed set of supported document formats, each bound to one extractor.
///
/// Adding a format means adding a variant and an extractor case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
    Markdown,
    Image,
}

/// The routing decision derived from the first word of a user query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Summarize,
    Answer,
}

/// A user query with its resolved intent.
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub intent: Intent,
}

/// Raw model payload, shaped by the path that produced it.
#[derive(Debug, Clone)]
pub enum ModelPayload {
    /// One summary per corpus chunk, in chunk order.
    Summaries(Vec<String>),
    /// An extractive answer span. The score is computed by the model but
    /// not shown to the user; see DESIGN.md for the rationale.
    Span { answer: String, score: f64 },
}

/// An engine result: the raw payload plus the normalized display string.
#[derive(Debug, Clone)]
pub struct Answer {
    pub payload: ModelPayload,
    pub text: String,
}

/// Speaker role of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation, persisted by the history module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

//! Session state and the per-turn query loop.
//!
//! A [`Session`] owns exactly one corpus and one transcript; the caller
//! holds the session and passes it into every core operation — there is
//! no ambient global state. Ingestion is all-or-nothing: any validation
//! or extraction failure aborts the batch and leaves the existing corpus
//! untouched. Engine failures likewise leave both the corpus and the
//! transcript unmodified so the user can retry on the next turn.

use uuid::Uuid;

use crate::engine::AnswerEngine;
use crate::error::IngestError;
use crate::extract::extract_text;
use crate::models::{Intent, Query, Role, TranscriptEntry, UploadedDocument};
use crate::normalize::normalize;
use crate::ocr::OcrProvider;
use crate::postprocess::postprocess;
use crate::route::route;
use crate::validate::{document_kind, validate_batch};

pub const GREETING: &str = "Hello! I am here to help you with your questions.";
pub const EMPTY_CORPUS_REPLY: &str = "Please upload documents before asking questions!";

pub struct Session {
    pub id: Uuid,
    corpus: Option<String>,
    pub transcript: Vec<TranscriptEntry>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            corpus: None,
            transcript: Vec::new(),
        }
    }

    pub fn has_corpus(&self) -> bool {
        self.corpus.is_some()
    }

    pub fn corpus(&self) -> Option<&str> {
        self.corpus.as_deref()
    }

    /// The fixed greeting, shown only while the transcript is empty.
    pub fn greeting(&self) -> Option<&'static str> {
        self.transcript.is_empty().then_some(GREETING)
    }

    /// Ingest a document batch, replacing the corpus wholesale on success.
    ///
    /// Validation and extraction failures abort the entire batch; the
    /// previous corpus (if any) survives unchanged.
    pub async fn ingest(
        &mut self,
        docs: &[UploadedDocument],
        ocr: &dyn OcrProvider,
    ) -> Result<(), IngestError> {
        validate_batch(docs)?;

        let mut texts = Vec::with_capacity(docs.len());
        for doc in docs {
            // validate_batch accepted the doc, so a kind must resolve.
            let kind = document_kind(doc).ok_or_else(|| IngestError::UnsupportedFiles(vec![
                doc.name.clone(),
            ]))?;
            let text = extract_text(doc, kind, ocr)
                .await
                .map_err(|source| IngestError::Extraction {
                    name: doc.name.clone(),
                    source,
                })?;
            texts.push(text);
        }

        let corpus = normalize(&texts);
        tracing::info!(
            session = %self.id,
            documents = docs.len(),
            corpus_chars = corpus.chars().count(),
            "documents ingested"
        );
        // A corpus that normalized to nothing is no corpus at all; queries
        // must get the guidance reply, never an engine call with an empty
        // context.
        self.corpus = (!corpus.is_empty()).then_some(corpus);
        Ok(())
    }

    /// Handle one user turn.
    ///
    /// With no corpus the guidance reply is returned (and recorded) without
    /// touching the engine. Otherwise the question is routed, answered,
    /// post-processed, and both turns appended to the transcript. On an
    /// engine error nothing is appended.
    pub async fn handle_query(
        &mut self,
        text: &str,
        engine: &AnswerEngine,
    ) -> Result<(String, Option<Intent>), crate::error::EngineError> {
        let Some(corpus) = self.corpus.as_deref() else {
            self.push_turn(text, EMPTY_CORPUS_REPLY);
            return Ok((EMPTY_CORPUS_REPLY.to_string(), None));
        };

        let query = Query {
            text: text.to_string(),
            intent: route(text),
        };
        tracing::debug!(session = %self.id, intent = ?query.intent, "query routed");

        let answer = engine.run(&query, corpus).await?;
        let reply = postprocess(&answer.text);

        self.push_turn(text, &reply);
        Ok((reply, Some(query.intent)))
    }

    fn push_turn(&mut self, user: &str, assistant: &str) {
        self.transcript.push(TranscriptEntry::now(Role::User, user));
        self.transcript
            .push(TranscriptEntry::now(Role::Assistant, assistant));
    }

    /// Start over: drop the corpus and the transcript.
    pub fn start_new_chat(&mut self) {
        self.corpus = None;
        self.transcript.clear();
    }

    /// Delete the conversation. Also drops the corpus, matching new-chat.
    pub fn clear_history(&mut self) {
        self.start_new_chat();
    }
}

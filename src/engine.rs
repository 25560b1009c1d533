//! Query dispatch and model payload normalization.
//!
//! The engine owns the model backend and turns a routed [`Query`] plus the
//! session corpus into an [`Answer`]. Summarization chunks the corpus and
//! summarizes each chunk sequentially; question answering runs one call
//! over the entire corpus. Either way the raw payload is normalized to a
//! single display string before post-processing.

use crate::chunk::chunk_text;
use crate::config::ChunkingConfig;
use crate::error::EngineError;
use crate::inference::InferenceBackend;
use crate::models::{Answer, Intent, ModelPayload, Query};

pub struct AnswerEngine {
    backend: Box<dyn InferenceBackend>,
    chunking: ChunkingConfig,
}

impl AnswerEngine {
    pub fn new(backend: Box<dyn InferenceBackend>, chunking: ChunkingConfig) -> Self {
        Self { backend, chunking }
    }

    /// Run a query against the corpus.
    ///
    /// Failures are recoverable at the query level; the caller reports the
    /// error and keeps the session intact.
    pub async fn run(&self, query: &Query, corpus: &str) -> Result<Answer, EngineError> {
        match query.intent {
            Intent::Summarize => self.summarize_corpus(corpus).await,
            Intent::Answer => self.answer_question(&query.text, corpus).await,
        }
    }

    async fn summarize_corpus(&self, corpus: &str) -> Result<Answer, EngineError> {
        let chunks = chunk_text(
            corpus,
            self.chunking.chunk_size,
            self.chunking.chunk_overlap,
        );
        tracing::debug!(
            chunks = chunks.len(),
            backend = %self.backend.describe(),
            "summarizing corpus"
        );

        let mut summaries = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            summaries.push(self.backend.summarize(chunk).await?);
        }

        let text = summaries.join(" ");
        Ok(Answer {
            payload: ModelPayload::Summaries(summaries),
            text,
        })
    }

    async fn answer_question(&self, question: &str, corpus: &str) -> Result<Answer, EngineError> {
        tracing::debug!(backend = %self.backend.describe(), "answering question");
        let span = self.backend.answer(question, corpus).await?;

        // The score stays in the payload but is not displayed.
        Ok(Answer {
            text: span.answer.clone(),
            payload: ModelPayload::Span {
                answer: span.answer,
                score: span.score,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::AnswerSpan;
    use async_trait::async_trait;

    /// Backend stub returning fixed responses.
    struct StubBackend {
        summary: String,
        span: AnswerSpan,
    }

    #[async_trait]
    impl InferenceBackend for StubBackend {
        async fn summarize(&self, _text: &str) -> Result<String, EngineError> {
            Ok(self.summary.clone())
        }

        async fn answer(&self, _q: &str, _c: &str) -> Result<AnswerSpan, EngineError> {
            Ok(self.span.clone())
        }

        fn describe(&self) -> String {
            "stub".to_string()
        }
    }

    fn engine() -> AnswerEngine {
        AnswerEngine::new(
            Box::new(StubBackend {
                summary: "piece".to_string(),
                span: AnswerSpan {
                    answer: "Paris".to_string(),
                    score: 0.97,
                },
            }),
            ChunkingConfig {
                chunk_size: 50,
                chunk_overlap: 10,
            },
        )
    }

    #[tokio::test]
    async fn summarize_joins_per_chunk_summaries_in_order() {
        let corpus = "Sentence one goes here. Sentence two as well. ".repeat(5);
        let query = Query {
            text: "summarize".to_string(),
            intent: Intent::Summarize,
        };
        let answer = engine().run(&query, &corpus).await.unwrap();
        match &answer.payload {
            ModelPayload::Summaries(parts) => {
                assert!(parts.len() > 1);
                assert_eq!(answer.text, parts.join(" "));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn answer_uses_the_span_and_keeps_the_score() {
        let query = Query {
            text: "what is the capital".to_string(),
            intent: Intent::Answer,
        };
        let answer = engine().run(&query, "Paris capital France").await.unwrap();
        assert_eq!(answer.text, "Paris");
        match answer.payload {
            ModelPayload::Span { score, .. } => assert!(score > 0.9),
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}

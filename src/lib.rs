//! # docchat
//!
//! A conversational question-answering and summarization assistant for
//! local documents.
//!
//! Documents (PDF, DOCX, TXT, Markdown, images) are validated, their text
//! extracted and normalized into a single session corpus, and each user
//! query is routed to either a summarization path or an extractive
//! question-answering path backed by hosted models.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌─────────┐
//! │ Validate │──▶│ Extract  │──▶│ Normalize │──▶│ Corpus  │
//! │ ext/MIME │   │ pdf/docx │   │ stopwords │   │(session)│
//! └──────────┘   │ txt/md/… │   │ URLs      │   └────┬────┘
//!                └──────────┘   └───────────┘        │
//!                                                    ▼
//!        query ──▶ route ──▶ ┌─────────────────────────────┐
//!                 (intent)   │ Summarize: chunk → model → join │
//!                            │ Answer:    QA over corpus       │
//!                            └──────────────┬──────────────┘
//!                                           ▼
//!                                     postprocess ──▶ reply
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`validate`] | Upload allow-list validation |
//! | [`extract`] | Per-format text extraction |
//! | [`ocr`] | Image text recognition boundary |
//! | [`normalize`] | Corpus normalization |
//! | [`chunk`] | Overlapping sentence-aware chunking |
//! | [`route`] | Summarize/Answer intent routing |
//! | [`inference`] | Model backend abstraction |
//! | [`engine`] | Query dispatch and payload normalization |
//! | [`postprocess`] | Display-text cleanup |
//! | [`session`] | Session state and the query loop |
//! | [`history`] | Transcript persistence |
//! | [`server`] | HTTP JSON API |

pub mod chat;
pub mod chunk;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod history;
pub mod inference;
pub mod models;
pub mod normalize;
pub mod ocr;
pub mod postprocess;
pub mod route;
pub mod server;
pub mod session;
pub mod validate;

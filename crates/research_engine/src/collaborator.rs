//! Interfaces the workflow consumes to ingest pages and answer questions.

use futures_util::stream::BoxStream;

/// Lazy, finite, single-pass sequence of human-readable status lines.
///
/// The caller drives it to exhaustion; an `Err` item ends the run as failed.
pub type StatusStream = BoxStream<'static, Result<String, IngestError>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct IngestError {
    pub message: String,
}

impl IngestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerError {
    #[error("urls have not been processed yet")]
    NotProcessed,
    #[error("{0}")]
    Failed(String),
}

/// Answer text plus newline-joined sources (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Answer {
    pub answer: String,
    pub sources: String,
}

pub trait Ingestor: Send + Sync {
    /// Fetches and indexes `urls`; nothing happens until the stream is polled.
    fn process_urls(&self, urls: Vec<String>) -> StatusStream;
}

#[async_trait::async_trait]
pub trait Answerer: Send + Sync {
    async fn generate_answer(&self, question: &str) -> Result<Answer, AnswerError>;
}

//! Retrieval: the vector store seam
//!
//! The index itself is external. The router only needs
//! `retrieve(query, threshold)`; the store drops anything scoring below the
//! threshold so callers never see sub-threshold context.

mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryVectorStore;

/// A chunk of context, read-only once retrieved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub content: String,
    pub source: String,
    pub score: f32,
}

impl RetrievedDocument {
    pub fn new(content: impl Into<String>, source: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            score,
        }
    }
}

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid document file: {0}")]
    Parse(String),

    #[error("Vector store error: {0}")]
    Backend(String),
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;

/// Similarity search over an external index
///
/// Safe for concurrent reads.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Documents with `score >= score_threshold`, best first
    async fn retrieve(
        &self,
        query: &str,
        score_threshold: f32,
    ) -> RetrievalResult<Vec<RetrievedDocument>>;
}

//! In-process vector store scored by token overlap

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;

use super::{RetrievalError, RetrievalResult, RetrievedDocument, VectorStore};

#[derive(Debug, Clone, Deserialize)]
struct StoredDocument {
    content: String,
    #[serde(default)]
    source: String,
}

/// Scores each document by the share of distinct query tokens it contains
///
/// CJK text has no spaces, so each such character counts as one token.
#[derive(Debug, Default)]
pub struct MemoryVectorStore {
    documents: RwLock<Vec<(StoredDocument, HashSet<String>)>>,
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF | 0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xAC00..=0xD7AF | 0xF900..=0xFAFF)
}

fn tokens(text: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    let mut word = String::new();
    for c in text.chars().flat_map(char::to_lowercase) {
        if is_cjk(c) {
            if !word.is_empty() {
                out.insert(std::mem::take(&mut word));
            }
            out.insert(c.to_string());
        } else if c.is_alphanumeric() {
            word.push(c);
        } else if !word.is_empty() {
            out.insert(std::mem::take(&mut word));
        }
    }
    if !word.is_empty() {
        out.insert(word);
    }
    out
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, content: impl Into<String>, source: impl Into<String>) {
        let doc = StoredDocument {
            content: content.into(),
            source: source.into(),
        };
        let toks = tokens(&doc.content);
        self.documents.write().push((doc, toks));
    }

    /// Load `[{content, source}]` from a YAML or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> RetrievalResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let docs: Vec<StoredDocument> =
            serde_yaml::from_str(&content).map_err(|e| RetrievalError::Parse(e.to_string()))?;

        let store = Self::new();
        for doc in docs {
            store.add(doc.content, doc.source);
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn retrieve(
        &self,
        query: &str,
        score_threshold: f32,
    ) -> RetrievalResult<Vec<RetrievedDocument>> {
        let query_tokens = tokens(query);
        if query_tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<RetrievedDocument> = self
            .documents
            .read()
            .iter()
            .filter_map(|(doc, doc_tokens)| {
                let shared = query_tokens.intersection(doc_tokens).count();
                let score = shared as f32 / query_tokens.len() as f32;
                (score >= score_threshold && shared > 0)
                    .then(|| RetrievedDocument::new(&doc.content, &doc.source, score))
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_tokens() {
        let t = tokens("Rust's borrow-checker, 2024!");
        assert!(t.contains("rust"));
        assert!(t.contains("borrow"));
        assert!(t.contains("2024"));

        let cjk = tokens("工具列表");
        assert_eq!(cjk.len(), 4);
    }

    #[tokio::test]
    async fn test_threshold_excludes_low_scores() {
        let store = MemoryVectorStore::new();
        store.add("alpha only", "a.txt");

        // "alpha beta" shares one of two tokens: score 0.5
        let hits = store.retrieve("alpha beta", 0.5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].score - 0.5).abs() < f32::EPSILON);

        assert!(store.retrieve("alpha beta", 0.6).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_best_first() {
        let store = MemoryVectorStore::new();
        store.add("the refund policy", "weak.md");
        store.add("refund policy lasts thirty days", "strong.md");

        let hits = store.retrieve("refund policy days", 0.1).await.unwrap();
        assert_eq!(hits[0].source, "strong.md");
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_load_from_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docs.yaml");
        std::fs::write(
            &path,
            "- content: Refunds are accepted within 30 days\n  source: policy.md\n",
        )
        .unwrap();

        let store = MemoryVectorStore::from_file(&path).unwrap();
        assert_eq!(store.len(), 1);
        let hits = store.retrieve("refunds accepted", 0.65).await.unwrap();
        assert_eq!(hits[0].source, "policy.md");
    }
}

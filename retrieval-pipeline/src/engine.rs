use std::sync::Arc;

use common::{error::AppError, utils::embedding::EmbeddingProvider};
use tokio::sync::RwLock;
use tracing::debug;

use crate::index::FlatIndex;

/// A single ingested document. Documents are append-only and identified by
/// position: the index maps nearest-neighbor hits back to documents by their
/// insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub file_name: String,
    pub text: String,
}

/// Documents and the index derived from them, guarded together so a searcher
/// observes either the previous complete index or the new one, never a
/// half-built state.
struct EngineState {
    documents: Vec<Document>,
    index: Option<FlatIndex>,
}

/// Answers "which stored text is most relevant to this query" by exact
/// nearest-neighbor lookup in embedding space.
pub struct RetrievalEngine {
    embedder: Arc<EmbeddingProvider>,
    state: RwLock<EngineState>,
}

impl RetrievalEngine {
    pub fn new(embedder: Arc<EmbeddingProvider>) -> Self {
        Self {
            embedder,
            state: RwLock::new(EngineState {
                documents: Vec::new(),
                index: None,
            }),
        }
    }

    /// Appends a document and rebuilds the whole index from the full document
    /// list; every call is O(total documents). The index is always derived
    /// fresh from the complete list, never patched in place.
    ///
    /// Concurrent calls may race on the rebuild; appends happen under the
    /// lock so no document is lost, and the last completed rebuild wins.
    pub async fn add(
        &self,
        file_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), AppError> {
        let texts: Vec<String> = {
            let mut state = self.state.write().await;
            state.documents.push(Document {
                file_name: file_name.into(),
                text: text.into(),
            });
            state.documents.iter().map(|doc| doc.text.clone()).collect()
        };

        // Embedding and index construction happen outside the lock; searchers
        // keep the previous complete index until the swap below.
        let embeddings = self.embedder.embed_batch(texts).await?;
        let index = FlatIndex::build(embeddings);

        let mut state = self.state.write().await;
        debug!(
            documents = state.documents.len(),
            vectors = index.len(),
            "swapping rebuilt vector index"
        );
        state.index = Some(index);
        Ok(())
    }

    /// Concatenates the texts of the `top_k` documents nearest to `query`,
    /// nearest first, separated by a blank line. Returns an empty string when
    /// no documents have been ingested; callers treat that as "no context".
    pub async fn search(&self, query: &str, top_k: usize) -> Result<String, AppError> {
        {
            let state = self.state.read().await;
            if state.documents.is_empty() || state.index.is_none() {
                return Ok(String::new());
            }
        }

        let query_embedding = self.embedder.embed(query).await?;

        let state = self.state.read().await;
        let Some(index) = state.index.as_ref() else {
            return Ok(String::new());
        };

        // Hits outside the current document range are skipped; `get` covers
        // the window where the store has grown past the index.
        let texts: Vec<&str> = index
            .search(&query_embedding, top_k)
            .into_iter()
            .filter_map(|idx| state.documents.get(idx))
            .map(|doc| doc.text.as_str())
            .collect();

        Ok(texts.join("\n\n"))
    }

    pub async fn document_count(&self) -> usize {
        self.state.read().await.documents.len()
    }

    pub async fn index_len(&self) -> usize {
        self.state
            .read()
            .await
            .index
            .as_ref()
            .map_or(0, FlatIndex::len)
    }
}

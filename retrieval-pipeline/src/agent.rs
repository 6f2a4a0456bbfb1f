use std::sync::Arc;

use common::storage::{db::SurrealDbClient, types::cached_answer::CachedAnswer};
use tracing::{debug, warn};

use crate::{engine::RetrievalEngine, generation::GenerationClient, CONTEXT_TOP_K};

/// Orchestrates the answer fallback chain: answer cache, then
/// retrieval-augmented generation over ingested documents, then direct
/// generation from the raw query.
pub struct QueryAgent {
    db: Arc<SurrealDbClient>,
    engine: Arc<RetrievalEngine>,
    generation: GenerationClient,
}

impl QueryAgent {
    pub fn new(
        db: Arc<SurrealDbClient>,
        engine: Arc<RetrievalEngine>,
        generation: GenerationClient,
    ) -> Self {
        Self {
            db,
            engine,
            generation,
        }
    }

    /// Answers a query in a single pass; the first layer that produces an
    /// answer wins and no layer is retried. Never returns an error: every
    /// failure mode degrades to a readable answer string.
    pub async fn answer(&self, query: &str) -> String {
        if query.trim().is_empty() {
            return "⚠️ Please type a question.".to_string();
        }

        match CachedAnswer::find_fuzzy(query, &self.db).await {
            Ok(Some(answer)) => {
                debug!("serving answer from cache");
                return format!("(From Database)\n{answer}");
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "cache lookup failed, treating as miss"),
        }

        let context = match self.engine.search(query, CONTEXT_TOP_K).await {
            Ok(context) => context,
            Err(err) => {
                warn!(error = %err, "retrieval failed, falling back to direct generation");
                String::new()
            }
        };

        let answer = if context.is_empty() {
            self.generation.complete(query).await
        } else {
            let prompt =
                format!("Answer using only this context:\n{context}\n\nQuestion: {query}");
            self.generation.complete(&prompt).await
        };

        // Caching is best-effort; a write failure never affects the answer.
        if let Err(err) = CachedAnswer::insert(query, &answer, &self.db).await {
            warn!(error = %err, "failed to cache answer");
        }

        answer
    }
}

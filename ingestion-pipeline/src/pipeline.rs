use std::sync::Arc;

use common::error::AppError;
use retrieval_pipeline::RetrievalEngine;
use tracing::info;

use crate::extraction::{extract_text, DocumentKind};

/// Ingestion boundary: resolves the declared type from the file name,
/// extracts plain text, and hands the document to the retrieval engine.
pub struct IngestionPipeline {
    engine: Arc<RetrievalEngine>,
}

impl IngestionPipeline {
    pub fn new(engine: Arc<RetrievalEngine>) -> Self {
        Self { engine }
    }

    /// Adds one document to the knowledge base. An extraction failure is
    /// returned to the caller and leaves the document store and the vector
    /// index untouched.
    pub async fn add_document(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), AppError> {
        let kind = DocumentKind::from_file_name(file_name);

        // PDF and Word parsing are CPU-bound; keep them off the async runtime.
        let text = tokio::task::spawn_blocking(move || extract_text(&bytes, kind)).await??;

        info!(file_name, ?kind, chars = text.len(), "extracted document text");

        self.engine.add(file_name, text).await?;
        Ok(())
    }
}

use std::sync::Arc;

use common::storage::db::SurrealDbClient;
use ingestion_pipeline::IngestionPipeline;
use retrieval_pipeline::QueryAgent;

#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<SurrealDbClient>,
    pub agent: Arc<QueryAgent>,
    pub ingestion: Arc<IngestionPipeline>,
}

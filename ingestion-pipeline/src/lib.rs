pub mod extraction;
pub mod pipeline;

pub use extraction::{extract_text, DocumentKind};
pub use pipeline::IngestionPipeline;

pub mod agent;
pub mod engine;
pub mod generation;
pub mod index;

/// Number of nearest documents concatenated into the generation context.
pub const CONTEXT_TOP_K: usize = 2;

pub use agent::QueryAgent;
pub use engine::{Document, RetrievalEngine};
pub use generation::GenerationClient;

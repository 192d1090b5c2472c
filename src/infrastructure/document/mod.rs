//! Document index and embedding implementations

mod in_memory_index;
mod openai_embeddings;

pub use in_memory_index::InMemoryDocumentIndex;
pub use openai_embeddings::{EmbeddingSettings, OpenAiEmbeddingProvider};

//! Embedding provider trait

use async_trait::async_trait;

use crate::domain::DomainError;

/// Turns text into a vector; similar texts map to nearby vectors
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    fn model(&self) -> &str;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    const DIMENSIONS: usize = 32;

    /// Bag-of-words embedding: each lowercased word bumps one hashed dimension
    #[derive(Debug, Default)]
    pub struct MockEmbeddingProvider {
        error: Option<String>,
    }

    impl MockEmbeddingProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
            if let Some(error) = &self.error {
                return Err(DomainError::provider("mock", error));
            }

            let mut vector = vec![0.0; DIMENSIONS];
            for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
                let hash = word
                    .to_lowercase()
                    .bytes()
                    .fold(7u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
                vector[(hash % DIMENSIONS as u64) as usize] += 1.0;
            }
            Ok(vector)
        }

        fn model(&self) -> &str {
            "mock-embedding"
        }
    }
}

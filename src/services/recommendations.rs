use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::Recommendation,
    services::{embedding::EmbeddingClient, index::MovieIndex},
};

/// How many recommendations a retrieval returns by default
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 5;

/// Recommendation retrieval contract consumed by the turn orchestration
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Returns up to `limit` recommendations for the interpreted intent,
    /// ordered by descending relevance. An empty list is a valid result.
    async fn retrieve(&self, intent: &str, limit: usize) -> AppResult<Vec<Recommendation>>;
}

/// Retrieval backed by the embedding client and the in-memory movie index
pub struct VectorRetriever {
    embeddings: EmbeddingClient,
    index: MovieIndex,
}

impl VectorRetriever {
    pub fn new(embeddings: EmbeddingClient, index: MovieIndex) -> Self {
        Self { embeddings, index }
    }
}

#[async_trait]
impl RecommendationSource for VectorRetriever {
    async fn retrieve(&self, intent: &str, limit: usize) -> AppResult<Vec<Recommendation>> {
        let query_vector = self.embeddings.embed_query(intent).await?;
        let movies = self.index.query(&query_vector, limit);

        let recommendations: Vec<Recommendation> =
            movies.into_iter().map(Recommendation::from).collect();

        tracing::info!(found = recommendations.len(), "Retrieved recommendations");
        Ok(recommendations)
    }
}

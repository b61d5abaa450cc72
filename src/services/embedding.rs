use std::collections::HashMap;
use std::path::{Path, PathBuf};

use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::Movie,
};

const EMBEDDING_MODEL: &str = "text-embedding-ada-002";
const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const CACHE_FILE_NAME: &str = "cached_embeddings.json";

/// Pause between embedding batches to stay under rate limits
const BATCH_PAUSE_SECS: u64 = 1;

const HTTP_TIMEOUT_SECS: u64 = 60;

/// OpenAI embeddings client
#[derive(Clone)]
pub struct EmbeddingClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    batch_size: usize,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

impl EmbeddingClient {
    pub fn new(api_key: String, batch_size: usize) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http_client,
            api_key,
            api_url: OPENAI_EMBEDDINGS_URL.to_string(),
            batch_size,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Embeds a batch of texts in one API call, returning vectors in input
    /// order
    pub async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let body = json!({
            "input": texts,
            "model": EMBEDDING_MODEL,
        });

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OpenAI embeddings API returned status {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingsResponse = response.json().await?;
        Ok(parsed.data.into_iter().map(|row| row.embedding).collect())
    }

    /// Embeds a single query string
    pub async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        tracing::info!(query = %text, "Generating query embedding");
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        if vectors.is_empty() {
            return Err(AppError::ExternalApi(
                "OpenAI embeddings response was empty".to_string(),
            ));
        }
        Ok(vectors.remove(0))
    }
}

/// File-backed embedding cache keyed by movie metadata key.
///
/// Lets re-initialization skip the embeddings API for movies already seen.
pub struct EmbeddingCache {
    path: PathBuf,
}

impl EmbeddingCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CACHE_FILE_NAME),
        }
    }

    /// Loads cached embeddings; a missing or unreadable file yields an
    /// empty map
    pub fn load(&self) -> HashMap<String, Vec<f32>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => {
                tracing::info!(path = %self.path.display(), "No cached embeddings found");
                return HashMap::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "Discarding unreadable embedding cache");
                HashMap::new()
            }
        }
    }

    /// Persists the full cache map, creating the directory if needed
    pub fn store(&self, entries: &HashMap<String, Vec<f32>>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Internal(format!("Failed to create cache dir: {}", e)))?;
        }
        let raw = serde_json::to_string(entries)
            .map_err(|e| AppError::Internal(format!("Failed to serialize cache: {}", e)))?;
        std::fs::write(&self.path, raw)
            .map_err(|e| AppError::Internal(format!("Failed to write cache: {}", e)))?;
        tracing::info!(entries = entries.len(), path = %self.path.display(), "Saved embedding cache");
        Ok(())
    }
}

/// Embeds the catalog, consulting and updating the cache.
///
/// Movies already cached skip the API. Batches that fail are logged and
/// their movies dropped rather than failing the whole catalog, matching the
/// best-effort nature of initialization.
pub async fn embed_movies(
    movies: Vec<Movie>,
    client: &EmbeddingClient,
    cache: &EmbeddingCache,
) -> AppResult<Vec<(Movie, Vec<f32>)>> {
    let mut embeddings = cache.load();

    let pending: Vec<&Movie> = movies
        .iter()
        .filter(|movie| !embeddings.contains_key(&movie.key))
        .collect();

    tracing::info!(
        cached = movies.len() - pending.len(),
        pending = pending.len(),
        "Applying cached embeddings"
    );

    let mut newly_embedded = 0usize;
    let batches: Vec<&[&Movie]> = pending.chunks(client.batch_size().max(1)).collect();
    let batch_count = batches.len();

    for (i, batch) in batches.into_iter().enumerate() {
        let texts: Vec<String> = batch.iter().map(|movie| movie.embedding_text()).collect();
        tracing::info!(batch = i + 1, of = batch_count, size = batch.len(), "Embedding batch");

        match client.embed_batch(&texts).await {
            Ok(vectors) => {
                for (movie, vector) in batch.iter().zip(vectors) {
                    embeddings.insert(movie.key.clone(), vector);
                    newly_embedded += 1;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, batch = i + 1, "Embedding batch failed, dropping its movies");
            }
        }

        if i + 1 < batch_count {
            tokio::time::sleep(std::time::Duration::from_secs(BATCH_PAUSE_SECS)).await;
        }
    }

    if newly_embedded > 0 {
        if let Err(e) = cache.store(&embeddings) {
            tracing::error!(error = %e, "Failed to save embedding cache");
        }
    }

    let total = movies.len();
    let rows: Vec<(Movie, Vec<f32>)> = movies
        .into_iter()
        .filter_map(|movie| {
            let vector = embeddings.get(&movie.key).cloned();
            vector.map(|v| (movie, v))
        })
        .collect();

    if rows.len() < total {
        tracing::warn!(
            dropped = total - rows.len(),
            "Dropped movies with failed embeddings"
        );
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::new(dir.path());
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::new(dir.path());

        let mut entries = HashMap::new();
        entries.insert("/library/metadata/1".to_string(), vec![0.1, 0.2, 0.3]);
        cache.store(&entries).unwrap();

        let loaded = cache.load();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn test_cache_corrupt_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::new(dir.path());
        std::fs::write(dir.path().join(CACHE_FILE_NAME), "not json").unwrap();
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_cache_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deep").join("cache");
        let cache = EmbeddingCache::new(&nested);
        cache.store(&HashMap::new()).unwrap();
        assert!(nested.join(CACHE_FILE_NAME).exists());
    }
}

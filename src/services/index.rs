use crate::models::Movie;

/// In-memory nearest-neighbor index over movie embedding vectors.
///
/// Rebuilt from the embedding cache on every initialization; a brute-force
/// cosine scan is ample for a personal library's catalog size.
pub struct MovieIndex {
    rows: Vec<IndexRow>,
}

struct IndexRow {
    movie: Movie,
    vector: Vec<f32>,
}

impl MovieIndex {
    pub fn build(rows: Vec<(Movie, Vec<f32>)>) -> Self {
        let rows = rows
            .into_iter()
            .map(|(movie, vector)| IndexRow { movie, vector })
            .collect::<Vec<_>>();
        tracing::info!(movies = rows.len(), "Built movie index");
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns up to `limit` movies ranked by descending cosine similarity
    pub fn query(&self, vector: &[f32], limit: usize) -> Vec<&Movie> {
        let mut scored: Vec<(f32, &Movie)> = self
            .rows
            .iter()
            .map(|row| (cosine_similarity(&row.vector, vector), &row.movie))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, movie)| movie)
            .collect()
    }
}

/// Cosine similarity; zero for mismatched lengths or zero-norm vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

use serde::{Deserialize, Serialize};

/// A movie extracted from the Plex library catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub title: String,
    pub year: Option<i32>,
    pub summary: String,
    pub genres: Vec<String>,
    pub directors: Vec<String>,
    /// Top-billed cast, capped at five names during extraction
    pub actors: Vec<String>,
    /// Stable Plex metadata key, used later for playback lookup
    pub key: String,
    pub rating: Option<f64>,
    pub duration_ms: Option<i64>,
}

impl Movie {
    /// Builds the text fed to the embedding model.
    ///
    /// Concatenates title, year, directors, cast, genres, and summary,
    /// skipping whatever is absent.
    pub fn embedding_text(&self) -> String {
        let mut text = format!("Title: {}", self.title);

        if let Some(year) = self.year {
            text.push_str(&format!(" ({})", year));
        }

        if !self.directors.is_empty() {
            text.push_str(&format!(". Directed by {}", self.directors.join(", ")));
        }

        if !self.actors.is_empty() {
            text.push_str(&format!(". Starring {}", self.actors.join(", ")));
        }

        if !self.genres.is_empty() {
            text.push_str(&format!(". Genres: {}", self.genres.join(", ")));
        }

        if !self.summary.is_empty() {
            text.push_str(&format!(". Summary: {}", self.summary));
        }

        text
    }
}

/// A display-ready recommendation shown to the user.
///
/// Immutable once produced; `key` uniquely identifies the catalog item and
/// lists returned from a retrieval are ordered by descending relevance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub year: Option<i32>,
    /// Comma-joined genre names, denormalized for display
    pub genres: String,
    pub key: String,
    pub summary: String,
}

impl From<&Movie> for Recommendation {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            year: movie.year,
            genres: movie.genres.join(", "),
            key: movie.key.clone(),
            summary: movie.summary.clone(),
        }
    }
}

impl Recommendation {
    /// One listing line: "Inception (2010) - Action, Sci-Fi"
    pub fn listing_line(&self) -> String {
        let mut line = self.title.clone();
        if let Some(year) = self.year {
            line.push_str(&format!(" ({})", year));
        }
        if !self.genres.is_empty() {
            line.push_str(&format!(" - {}", self.genres));
        }
        line
    }
}

/// An available playback target connected to the Plex server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaClient {
    pub name: String,
    pub product: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_movie() -> Movie {
        Movie {
            title: "Inception".to_string(),
            year: Some(2010),
            summary: "A thief who steals corporate secrets.".to_string(),
            genres: vec!["Action".to_string(), "Sci-Fi".to_string()],
            directors: vec!["Christopher Nolan".to_string()],
            actors: vec!["Leonardo DiCaprio".to_string()],
            key: "/library/metadata/101".to_string(),
            rating: Some(8.8),
            duration_ms: Some(8_880_000),
        }
    }

    #[test]
    fn test_embedding_text_full() {
        let text = sample_movie().embedding_text();
        assert_eq!(
            text,
            "Title: Inception (2010). Directed by Christopher Nolan. \
             Starring Leonardo DiCaprio. Genres: Action, Sci-Fi. \
             Summary: A thief who steals corporate secrets."
        );
    }

    #[test]
    fn test_embedding_text_skips_absent_fields() {
        let movie = Movie {
            title: "Unknown".to_string(),
            year: None,
            summary: String::new(),
            genres: vec![],
            directors: vec![],
            actors: vec![],
            key: "/library/metadata/1".to_string(),
            rating: None,
            duration_ms: None,
        };
        assert_eq!(movie.embedding_text(), "Title: Unknown");
    }

    #[test]
    fn test_recommendation_from_movie() {
        let rec = Recommendation::from(&sample_movie());
        assert_eq!(rec.title, "Inception");
        assert_eq!(rec.genres, "Action, Sci-Fi");
        assert_eq!(rec.key, "/library/metadata/101");
    }

    #[test]
    fn test_listing_line() {
        let rec = Recommendation::from(&sample_movie());
        assert_eq!(rec.listing_line(), "Inception (2010) - Action, Sci-Fi");
    }

    #[test]
    fn test_listing_line_without_year_or_genres() {
        let rec = Recommendation {
            title: "Unknown".to_string(),
            year: None,
            genres: String::new(),
            key: "k".to_string(),
            summary: String::new(),
        };
        assert_eq!(rec.listing_line(), "Unknown");
    }
}

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Plex server base URL (e.g. "http://192.168.1.10:32400")
    pub plex_url: String,

    /// Plex authentication token
    pub plex_token: String,

    /// Name of the Plex library section holding movies
    #[serde(default = "default_movie_library_name")]
    pub movie_library_name: String,

    /// LLM provider: "anthropic" or "openai"
    #[serde(default = "default_llm_provider")]
    pub llm_provider: String,

    /// Anthropic API key (required when llm_provider = "anthropic")
    pub anthropic_api_key: Option<String>,

    /// OpenAI API key (always required: embeddings use OpenAI)
    pub openai_api_key: Option<String>,

    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Directory holding the embedding cache file
    #[serde(default = "default_vector_cache_dir")]
    pub vector_cache_dir: String,

    /// Batch size for embedding requests
    #[serde(default = "default_embedding_batch_size")]
    pub embedding_batch_size: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_movie_library_name() -> String {
    "Movies".to_string()
}

fn default_llm_provider() -> String {
    "anthropic".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-sonnet-20240229".to_string()
}

fn default_openai_model() -> String {
    "gpt-4".to_string()
}

fn default_vector_cache_dir() -> String {
    "./vector_cache".to_string()
}

fn default_embedding_batch_size() -> usize {
    100
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_env() -> Vec<(String, String)> {
        vec![
            ("PLEX_URL".to_string(), "http://localhost:32400".to_string()),
            ("PLEX_TOKEN".to_string(), "token".to_string()),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let config: Config = envy::from_iter(base_env()).unwrap();
        assert_eq!(config.movie_library_name, "Movies");
        assert_eq!(config.llm_provider, "anthropic");
        assert_eq!(config.embedding_batch_size, 100);
        assert_eq!(config.port, 3000);
        assert_eq!(config.anthropic_api_key, None);
    }

    #[test]
    fn test_missing_plex_url_rejected() {
        let result =
            envy::from_iter::<_, Config>(vec![("PLEX_TOKEN".to_string(), "token".to_string())]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let mut env = base_env();
        env.push(("LLM_PROVIDER".to_string(), "openai".to_string()));
        env.push(("PORT".to_string(), "8080".to_string()));
        let config: Config = envy::from_iter(env).unwrap();
        assert_eq!(config.llm_provider, "openai");
        assert_eq!(config.port, 8080);
    }
}

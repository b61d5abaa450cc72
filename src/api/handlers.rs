use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{MediaClient, Recommendation};
use crate::services::{
    chat::ChatEngine,
    embedding::{embed_movies, EmbeddingCache, EmbeddingClient},
    index::MovieIndex,
    llm::LlmService,
    plex::PlexServer,
    recommendations::VectorRetriever,
};

use super::{AppState, EngineHandles};

// Request/Response types

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub response: String,
    pub recommendations: Vec<Recommendation>,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ClientsResponse {
    pub clients: Vec<MediaClient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRequest {
    pub movie_key: Option<String>,
    pub client_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub result: String,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Wires up all collaborators: Plex connection, catalog extraction,
/// embeddings (cached), the similarity index, and the LLM service
pub async fn initialize(State(state): State<AppState>) -> AppResult<Json<InitializeResponse>> {
    tracing::info!("Starting initialization process");
    let config = &state.config;

    tracing::info!(url = %config.plex_url, "Connecting to Plex server");
    let plex = Arc::new(
        PlexServer::connect(config.plex_url.clone(), config.plex_token.clone()).await?,
    );

    tracing::info!(library = %config.movie_library_name, "Extracting movie data");
    let movies = plex.fetch_movies(&config.movie_library_name).await?;

    let openai_key = config.openai_api_key.clone().ok_or_else(|| {
        AppError::InvalidInput("OpenAI API key is required for generating embeddings".to_string())
    })?;

    let embedder = EmbeddingClient::new(openai_key, config.embedding_batch_size)?;
    let cache = EmbeddingCache::new(&config.vector_cache_dir);
    let rows = embed_movies(movies, &embedder, &cache).await?;

    let index = MovieIndex::build(rows);
    let indexed = index.len();

    let llm = Arc::new(LlmService::new(config)?);
    let retriever = Arc::new(VectorRetriever::new(embedder, index));

    let chat = Arc::new(ChatEngine::new(
        llm,
        plex.clone(),
        retriever,
        state.sessions.clone(),
    ));
    state.install(EngineHandles { chat, media: plex }).await;

    tracing::info!(movies = indexed, "Initialization complete");
    Ok(Json(InitializeResponse {
        success: true,
        message: format!("Successfully initialized with {} movies", indexed),
    }))
}

/// One conversational turn: recommendation request or follow-up play
/// command
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Json<RecommendResponse>> {
    let handles = state.handles().await?;

    let outcome = handles
        .chat
        .handle_turn(request.session_id, &request.message)
        .await?;

    Ok(Json(RecommendResponse {
        response: outcome.reply,
        recommendations: outcome.recommendations,
        session_id: outcome.session_id,
    }))
}

/// Lists playback clients connected to the Plex server
pub async fn clients(State(state): State<AppState>) -> AppResult<Json<ClientsResponse>> {
    let handles = state.handles().await?;
    let clients = handles.media.list_clients().await?;
    Ok(Json(ClientsResponse { clients }))
}

/// Plays a movie on a named client, bypassing the conversational flow
pub async fn play(
    State(state): State<AppState>,
    Json(request): Json<PlayRequest>,
) -> AppResult<Json<PlayResponse>> {
    let handles = state.handles().await?;

    let (movie_key, client_name) = match (request.movie_key, request.client_name) {
        (Some(movie_key), Some(client_name)) => (movie_key, client_name),
        _ => {
            return Err(AppError::InvalidInput(
                "Movie key and client name are required".to_string(),
            ))
        }
    };

    tracing::info!(%movie_key, %client_name, "Direct play request");
    let result = handles.media.play(&movie_key, &client_name).await?;

    Ok(Json(PlayResponse { result }))
}

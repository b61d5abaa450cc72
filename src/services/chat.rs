use std::sync::Arc;

use crate::{
    error::AppResult,
    models::Recommendation,
    services::{
        llm::{numbered_listing, LanguageModel},
        plex::MediaServer,
        recommendations::{RecommendationSource, DEFAULT_RECOMMENDATION_LIMIT},
        reference::{is_play_command, resolve_reference},
        sessions::SessionStore,
    },
};

/// Result of one conversational turn
#[derive(Debug)]
pub struct TurnOutcome {
    pub reply: String,
    pub recommendations: Vec<Recommendation>,
    pub session_id: String,
}

/// Orchestrates one conversational turn against the collaborators.
///
/// Owns no state of its own beyond the session store handle; all
/// per-conversation state lives in the store.
pub struct ChatEngine {
    llm: Arc<dyn LanguageModel>,
    media: Arc<dyn MediaServer>,
    retriever: Arc<dyn RecommendationSource>,
    sessions: SessionStore,
}

impl ChatEngine {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        media: Arc<dyn MediaServer>,
        retriever: Arc<dyn RecommendationSource>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            llm,
            media,
            retriever,
            sessions,
        }
    }

    /// Handles one user turn: either plays a previously shown
    /// recommendation or produces a fresh recommendation list.
    ///
    /// A turn is treated as a play command when the last shown list is
    /// non-empty, the text contains "play"/"watch", a reference resolves,
    /// and at least one playback client is connected. Anything short of
    /// that falls through to the recommendation path.
    pub async fn handle_turn(
        &self,
        session_id: Option<String>,
        user_text: &str,
    ) -> AppResult<TurnOutcome> {
        let (session_id, recent) = self.sessions.begin_turn(session_id, user_text).await;
        tracing::info!(session_id = %session_id, input = %user_text, "Received recommendation request");

        if is_play_command(user_text, &recent) {
            if let Some(movie) = resolve_reference(user_text, &recent).cloned() {
                let clients = self.media.list_clients().await?;
                if let Some(client) = clients.first() {
                    // The dispatcher reports playback problems inside its
                    // status message; the reply is built regardless.
                    let status = self.media.play(&movie.key, &client.name).await?;
                    tracing::info!(client = %client.name, status = %status, "Dispatched playback");

                    let reply = format!("Now playing '{}' on {}.", movie.title, client.name);
                    self.sessions.append_assistant(&session_id, &reply).await;

                    return Ok(TurnOutcome {
                        reply,
                        recommendations: recent,
                        session_id,
                    });
                }
                tracing::warn!("No playback clients available, treating as a new request");
            }
        }

        // The interpreter contract accepts history; none is passed here.
        let intent = match self.llm.interpret_request(user_text, &[]).await {
            Ok(intent) => intent,
            Err(e) => {
                tracing::error!(error = %e, "Intent interpretation failed, using raw input");
                user_text.to_string()
            }
        };

        let recommendations = self
            .retriever
            .retrieve(&intent, DEFAULT_RECOMMENDATION_LIMIT)
            .await?;
        self.sessions
            .replace_recommendations(&session_id, recommendations.clone())
            .await;

        let reply = match self.llm.generate_reply(user_text, &recommendations).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "Reply generation failed, using templated listing");
                listing_fallback(&recommendations)
            }
        };

        self.sessions.append_assistant(&session_id, &reply).await;
        self.sessions.maybe_sweep();

        Ok(TurnOutcome {
            reply,
            recommendations,
            session_id,
        })
    }
}

/// Templated reply used when the LLM cannot produce one
fn listing_fallback(recommendations: &[Recommendation]) -> String {
    format!(
        "Here are some movie recommendations for you:\n\n{}",
        numbered_listing(recommendations)
    )
}

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{ChatMessage, Recommendation, Session};

/// Sessions idle longer than this are evicted
const IDLE_TIMEOUT_MINUTES: i64 = 30;

/// Chance per turn that a janitor sweep is triggered
const SWEEP_PROBABILITY: f64 = 0.1;

/// Process-wide store of conversational sessions.
///
/// The lock guards structural mutation of the table; it is never held across
/// a collaborator call. Two simultaneous turns on the same session id may
/// interleave their reads of `recent_recommendations` — an accepted race,
/// matching the one-request-per-user usage this serves.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a turn: resolves or creates the session, refreshes its
    /// timestamp, and records the user message.
    ///
    /// The timestamp refresh is the first mutation of every turn, and the
    /// user message is appended before any further processing so that even
    /// failed turns leave a trace of what was asked. Returns the session id
    /// and a snapshot of the current recommendation list.
    pub async fn begin_turn(
        &self,
        session_id: Option<String>,
        user_text: &str,
    ) -> (String, Vec<Recommendation>) {
        let mut table = self.inner.write().await;

        let id = match session_id {
            Some(id) if table.contains_key(&id) => id,
            _ => {
                let id = Uuid::new_v4().to_string();
                table.insert(id.clone(), Session::new(id.clone()));
                tracing::debug!(session_id = %id, "Created new session");
                id
            }
        };

        let session = table.get_mut(&id).expect("session inserted above");
        session.last_updated = Utc::now();
        session
            .conversation_history
            .push(ChatMessage::user(user_text));

        (id, session.recent_recommendations.clone())
    }

    /// Overwrites the session's recommendation list with a new retrieval set.
    ///
    /// The old list is discarded, not merged: ordinal references always
    /// resolve against the most recent retrieval only.
    pub async fn replace_recommendations(&self, id: &str, recommendations: Vec<Recommendation>) {
        let mut table = self.inner.write().await;
        if let Some(session) = table.get_mut(id) {
            session.recent_recommendations = recommendations;
        }
    }

    /// Appends the assistant's reply to the session transcript
    pub async fn append_assistant(&self, id: &str, reply: &str) {
        let mut table = self.inner.write().await;
        if let Some(session) = table.get_mut(id) {
            session
                .conversation_history
                .push(ChatMessage::assistant(reply));
        }
    }

    /// Evicts every session idle longer than the timeout, returning how
    /// many were removed
    pub async fn sweep_expired(&self) -> usize {
        let cutoff = Utc::now() - Duration::minutes(IDLE_TIMEOUT_MINUTES);
        let mut table = self.inner.write().await;
        let before = table.len();
        table.retain(|_, session| session.last_updated > cutoff);
        let evicted = before - table.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = table.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Probabilistic janitor: with a small per-turn chance, sweeps expired
    /// sessions on a spawned task so eviction never blocks the turn itself
    pub fn maybe_sweep(&self) {
        if rand::rng().random_bool(SWEEP_PROBABILITY) {
            let store = self.clone();
            tokio::spawn(async move {
                store.sweep_expired().await;
            });
        }
    }

    /// Returns a snapshot of one session, if present
    pub async fn session(&self, id: &str) -> Option<Session> {
        self.inner.read().await.get(id).cloned()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::{plex::MediaServer, ChatEngine, SessionStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Lives outside the engine so sessions survive re-initialization
    pub sessions: SessionStore,
    inner: Arc<RwLock<Option<EngineHandles>>>,
}

/// Collaborator handles wired up by a successful initialization
#[derive(Clone)]
pub struct EngineHandles {
    pub chat: Arc<ChatEngine>,
    pub media: Arc<dyn MediaServer>,
}

impl AppState {
    /// Creates state with no engine; /api/initialize installs one
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sessions: SessionStore::new(),
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the initialized collaborator handles
    pub async fn handles(&self) -> AppResult<EngineHandles> {
        self.inner
            .read()
            .await
            .clone()
            .ok_or(AppError::NotInitialized)
    }

    /// Installs (or replaces) the collaborator handles
    pub async fn install(&self, handles: EngineHandles) {
        *self.inner.write().await = Some(handles);
    }
}

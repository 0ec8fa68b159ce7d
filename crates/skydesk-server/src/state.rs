use serde::Serialize;
use skydesk::driver::Driver;
use skydesk::session::Session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Which collaborators the server was started with
#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub provider: String,
    pub model: String,
    pub validation_enabled: bool,
    pub project_id: Option<String>,
    pub max_steps: usize,
}

/// Live chat sessions by id.
///
/// Each session sits behind its own lock, held for the length of a turn, so turns on one
/// session run one at a time while different sessions proceed independently.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session and return its id
    pub async fn create(&self) -> String {
        let session = Session::new();
        let id = session.id.clone();
        self.sessions
            .lock()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(session)));
        tracing::info!(session = %id, "session created");
        id
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.lock().await.get(id).cloned()
    }

    /// Start the session's conversation over under a fresh id, so the validation service
    /// threads it separately. Returns the new id, or None for unknown ids.
    pub async fn reset(&self, id: &str) -> Option<String> {
        let session = self.sessions.lock().await.remove(id)?;
        // Waits for a running turn without holding up other sessions
        let new_id = {
            let mut guard = session.lock().await;
            guard.reset();
            guard.id.clone()
        };
        self.sessions.lock().await.insert(new_id.clone(), session);
        tracing::info!(session = %id, new_session = %new_id, "session reset");
        Some(new_id)
    }

    /// Drop a session. Returns false for unknown ids.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.lock().await.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "session removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub driver: Arc<Driver>,
    pub sessions: SessionStore,
    pub status: StatusInfo,
}

impl AppState {
    pub fn new(driver: Driver, status: StatusInfo) -> Self {
        Self {
            driver: Arc::new(driver),
            sessions: SessionStore::new(),
            status,
        }
    }
}

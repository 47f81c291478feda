//! Conversation memory keyed by session ID.
//!
//! Each session gets its own lock so turns within one session run one
//! at a time while different sessions proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::models::ConversationMemory;

/// Used when a caller doesn't name a session.
pub const DEFAULT_SESSION: &str = "default";

pub type SessionHandle = Arc<Mutex<ConversationMemory>>;

#[derive(Default, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session's memory, created empty on first use.
    pub async fn get_or_create(&self, session_id: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(session_id) {
            return Arc::clone(handle);
        }
        let mut sessions = self.sessions.write().await;
        Arc::clone(sessions.entry(session_id.to_string()).or_default())
    }

    /// Lookup without creating anything.
    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

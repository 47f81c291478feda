use std::sync::{Arc, RwLock};

use crate::ai::chat::BookingAgent;
use crate::core::AppConfig;

pub type SharedState = Arc<RwLock<AppState>>;

pub struct AppState {
    // `None` when no language model could be reached at startup
    pub agent: Option<Arc<BookingAgent>>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(agent: Option<BookingAgent>, config: AppConfig) -> Self {
        Self {
            agent: agent.map(Arc::new),
            config,
        }
    }

    pub fn agent(&self) -> Option<Arc<BookingAgent>> {
        self.agent.as_ref().map(Arc::clone)
    }
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::services::SessionService;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    sessions: Arc<SessionService>,
    config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            started_at: Instant::now(),
            sessions: Arc::new(SessionService::new()),
            config: Arc::new(config),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    pub fn idle_eviction(&self) -> Duration {
        self.config.idle_eviction
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

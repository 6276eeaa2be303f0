use std::sync::Mutex;

use crate::config::AppConfig;
use crate::errors::{EngageResult, SafeLock};
use crate::input_validator::InputValidator;
use crate::predictor::EngagementPredictor;
use crate::session_context::SessionRegistry;

/// Shared state behind the HTTP router. The predictor is read-only after
/// startup; only the session registry is mutated.
pub struct AppState {
    pub predictor: EngagementPredictor,
    pub validator: InputValidator,
    pub sessions: Mutex<SessionRegistry>,
}

impl AppState {
    pub fn new(predictor: EngagementPredictor, max_sessions: usize) -> Self {
        Self {
            predictor,
            validator: InputValidator::new(),
            sessions: Mutex::new(SessionRegistry::new(max_sessions)),
        }
    }

    pub fn from_config(predictor: EngagementPredictor, config: &AppConfig) -> Self {
        Self::new(predictor, config.server.max_sessions)
    }

    pub fn session_count(&self) -> EngageResult<usize> {
        Ok(self.sessions.safe_lock()?.len())
    }
}

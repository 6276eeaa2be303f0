//! Per-session prediction state.
//!
//! A session is either waiting for its first prediction or holds the most
//! recent successful one. Explanation and report need the latter.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{EngageError, EngageResult};
use crate::explainer::Contribution;
use crate::predictor::{EngagementPredictor, PredictionResult};
use crate::report::{render_report, report_data_url, ReportLink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    AwaitingPrediction,
    PredictionAvailable,
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    last: Option<PredictionResult>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        SessionContext {
            session_id: Uuid::new_v4(),
            created_at: Utc::now(),
            last: None,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.last {
            Some(_) => SessionState::PredictionAvailable,
            None => SessionState::AwaitingPrediction,
        }
    }

    pub fn last_prediction(&self) -> EngageResult<&PredictionResult> {
        self.last
            .as_ref()
            .ok_or_else(|| EngageError::precondition("make a prediction first"))
    }

    /// Replace the held prediction wholesale.
    pub fn record(&mut self, result: PredictionResult) {
        self.last = Some(result);
    }

    /// Predict and, only on success, move to the prediction-available state.
    pub fn predict(
        &mut self,
        predictor: &EngagementPredictor,
        input: &crate::features::UserInput,
    ) -> EngageResult<&PredictionResult> {
        let result = predictor.predict(input)?;
        debug!(session = %self.session_id, score = result.score, "prediction recorded");
        self.record(result);
        self.last_prediction()
    }

    pub fn explanation(&self, predictor: &EngagementPredictor) -> EngageResult<Vec<Contribution>> {
        predictor.explain(self.last_prediction()?)
    }

    pub fn report(&self) -> EngageResult<String> {
        Ok(render_report(self.last_prediction()?))
    }

    pub fn report_link(&self) -> EngageResult<ReportLink> {
        Ok(report_data_url(self.last_prediction()?))
    }
}

/// Bounded collection of live sessions; the oldest is dropped when full.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<Uuid, SessionContext>,
    order: VecDeque<Uuid>,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            order: VecDeque::new(),
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn create(&mut self) -> Uuid {
        if self.order.len() == self.max_sessions {
            if let Some(oldest) = self.order.pop_front() {
                self.sessions.remove(&oldest);
                debug!(session = %oldest, "evicted oldest session");
            }
        }

        let session = SessionContext::new();
        let id = session.session_id;
        self.order.push_back(id);
        self.sessions.insert(id, session);
        id
    }

    pub fn get(&self, id: &Uuid) -> EngageResult<&SessionContext> {
        self.sessions
            .get(id)
            .ok_or_else(|| EngageError::not_found("session", id.to_string()))
    }

    pub fn get_mut(&mut self, id: &Uuid) -> EngageResult<&mut SessionContext> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| EngageError::not_found("session", id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_no_prediction() {
        let session = SessionContext::new();
        assert_eq!(session.state(), SessionState::AwaitingPrediction);
        assert!(matches!(session.report(), Err(EngageError::Precondition { .. })));
        assert!(matches!(session.report_link(), Err(EngageError::Precondition { .. })));
    }

    #[test]
    fn registry_evicts_oldest_session() {
        let mut registry = SessionRegistry::new(2);
        let first = registry.create();
        let second = registry.create();
        let third = registry.create();

        assert_eq!(registry.len(), 2);
        assert!(matches!(registry.get(&first), Err(EngageError::NotFound { .. })));
        assert!(registry.get(&second).is_ok());
        assert!(registry.get(&third).is_ok());
    }
}

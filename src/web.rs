use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use uuid::Uuid;

use crate::api_errors::AppError;
use crate::app_state::AppState;
use crate::errors::SafeLock;
use crate::explainer::Contribution;
use crate::features::{Feature, UserInput};
use crate::predictor::{feature_rows, FeatureRow, Importance};
use crate::report::{ReportLink, REPORT_FILENAME};

type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub session_id: Uuid,
    pub score: f64,
    pub score_display: String,
    pub features: Vec<FeatureRow>,
}

#[derive(Debug, Serialize)]
pub struct ExplanationResponse {
    pub session_id: Uuid,
    pub score: f64,
    pub contributions: Vec<Contribution>,
}

#[derive(Debug, Serialize)]
pub struct ImportanceResponse {
    pub model: String,
    pub total: f64,
    pub importances: Vec<Importance>,
}

/// Build the router: health probes, global endpoints and per-session routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/api/status", get(status))
        .route("/api/importance", get(importance))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}/predict", post(predict))
        .route("/api/sessions/{id}/explanation", get(explanation))
        .route("/api/sessions/{id}/report", get(report))
        .route("/api/sessions/{id}/report/link", get(report_link))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "engagement-predictor",
        "inputs": Feature::USER_INPUTS.iter().map(|f| f.name()).collect::<Vec<_>>(),
        "features": Feature::names(),
        "endpoints": [
            "POST /api/sessions",
            "POST /api/sessions/{id}/predict",
            "GET /api/sessions/{id}/explanation",
            "GET /api/sessions/{id}/report",
            "GET /api/sessions/{id}/report/link",
            "GET /api/importance",
            "GET /api/status",
        ],
    }))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn readyz(State(state): State<SharedState>) -> impl IntoResponse {
    let dims = state.predictor.dimension_report();
    let ready = dims.is_consistent();
    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(serde_json::json!({ "ready": ready, "dimensions": dims })))
}

async fn status(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, AppError> {
    let sessions = state.session_count()?;
    let artifacts = state.predictor.artifacts();
    Ok(Json(serde_json::json!({
        "model": state.predictor.model_name(),
        "dimensions": state.predictor.dimension_report(),
        "importance_total": state.predictor.importance_total(),
        "fingerprints": artifacts.fingerprints,
        "sessions": sessions,
    })))
}

async fn importance(State(state): State<SharedState>) -> Result<Json<ImportanceResponse>, AppError> {
    let importances = state.predictor.importances()?;
    Ok(Json(ImportanceResponse {
        model: state.predictor.model_name().to_string(),
        total: state.predictor.importance_total(),
        importances,
    }))
}

async fn create_session(
    State(state): State<SharedState>,
) -> Result<(StatusCode, Json<SessionCreated>), AppError> {
    let session_id = state.sessions.safe_lock()?.create();
    info!(session = %session_id, "session created");
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id })))
}

async fn predict(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(input) = payload?;
    state.validator.validate(&input)?;

    let mut sessions = state.sessions.safe_lock()?;
    let session = sessions.get_mut(&id)?;
    let result = session.predict(&state.predictor, &input)?;

    Ok(Json(PredictResponse {
        session_id: id,
        score: result.score,
        score_display: format!("{:.2}", result.score),
        features: feature_rows(&result.completed),
    }))
}

async fn explanation(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExplanationResponse>, AppError> {
    let sessions = state.sessions.safe_lock()?;
    let session = sessions.get(&id)?;
    let contributions = session.explanation(&state.predictor)?;
    let score = session.last_prediction()?.score;

    Ok(Json(ExplanationResponse {
        session_id: id,
        score,
        contributions,
    }))
}

async fn report(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let body = state.sessions.safe_lock()?.get(&id)?.report()?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILENAME}\""),
            ),
        ],
        body,
    ))
}

async fn report_link(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportLink>, AppError> {
    let link = state.sessions.safe_lock()?.get(&id)?.report_link()?;
    Ok(Json(link))
}

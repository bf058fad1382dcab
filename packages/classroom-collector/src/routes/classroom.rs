use attention_signals::StudentMetricsMessage;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::response::AppError;
use crate::services::{ActiveParticipants, SessionReport};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/update", post(update_student))
        .route("/students", get(get_students))
        .route("/end_class", post(end_class))
}

fn validate_metrics(payload: &StudentMetricsMessage) -> Result<(), AppError> {
    if payload.student_id.trim().is_empty() {
        return Err(AppError::validation("student_id must not be empty"));
    }
    if payload.fatigue > 100 {
        return Err(AppError::validation("fatigue must be between 0 and 100"));
    }
    if !payload.ear.is_finite() {
        return Err(AppError::validation("ear must be a finite number"));
    }
    if !payload.timestamp.is_finite() {
        return Err(AppError::validation("timestamp must be a finite number"));
    }
    Ok(())
}

async fn update_student(
    State(state): State<AppState>,
    payload: Result<Json<StudentMetricsMessage>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(payload) = payload?;
    validate_metrics(&payload)?;

    state.sessions().ingest(&payload);
    Ok(Json(MessageResponse { message: "updated" }))
}

async fn get_students(State(state): State<AppState>) -> Json<ActiveParticipants> {
    Json(state.sessions().snapshot_active(state.idle_eviction()))
}

async fn end_class(State(state): State<AppState>) -> Json<SessionReport> {
    Json(state.sessions().end_session())
}

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::records::DailyScoreFields;

use super::dto::{DailyScoreRequest, DailyScoreResponse, DailyScoresResponse, WindowQuery};

#[instrument(skip(state, payload))]
pub async fn log_daily_score(
    State(state): State<AppState>,
    Json(payload): Json<DailyScoreRequest>,
) -> Result<Json<DailyScoreResponse>, ApiError> {
    let score = state
        .store
        .save_daily_score(
            payload.user_id,
            DailyScoreFields {
                energy_level: payload.energy_level,
                mood_level: payload.mood_level,
                sleep_hours: payload.sleep_hours,
                water_intake: payload.water_intake,
                exercise_minutes: payload.exercise_minutes,
                notes: payload.notes,
            },
        )
        .await?;

    Ok(Json(DailyScoreResponse {
        score_id: score.id,
        date: score.date,
        message: "Daily score logged".into(),
    }))
}

#[instrument(skip(state))]
pub async fn list_daily_scores(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(window): Query<WindowQuery>,
) -> Result<Json<DailyScoresResponse>, ApiError> {
    if window.days < 0 {
        return Err(ApiError::bad_request("days must be non-negative"));
    }
    let scores = state.store.daily_scores(user_id, window.days).await?;
    Ok(Json(DailyScoresResponse { scores }))
}

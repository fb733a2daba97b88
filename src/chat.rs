use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::insights::summary::summarize;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/chat", post(chat))
}

/// Wellness chat grounded in the user's last week of data. Best-effort: an
/// upstream failure degrades to a canned reply.
#[instrument(skip(state, payload))]
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let meals = state.store.meals(payload.user_id, 7).await?;
    let symptoms = state.store.symptoms(payload.user_id, 7).await?;
    let scores = state.store.daily_scores(payload.user_id, 7).await?;
    let summary = summarize(7, &meals, &symptoms, &scores);

    let context = format!(
        "User's recent data: {} meals, avg calories: {}, avg energy: {}/10",
        summary.meals_logged, summary.avg_daily_calories, summary.avg_energy
    );

    let response = match state.ai.chat(&payload.message, &context).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "chat completion failed");
            "I'm having trouble connecting right now. Please try again!".into()
        }
    };

    Ok(Json(ChatResponse { response }))
}

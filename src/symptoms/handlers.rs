use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::records::NewSymptomLog;

use super::dto::{
    LogSymptomRequest, LogSymptomResponse, SymptomAnalysisResponse, SymptomsResponse, WindowQuery,
};

/// Severity outside [1,10] is rejected by the store with a constraint
/// violation; nothing is written.
#[instrument(skip(state, payload))]
pub async fn log_symptom(
    State(state): State<AppState>,
    Json(payload): Json<LogSymptomRequest>,
) -> Result<Json<LogSymptomResponse>, ApiError> {
    if payload.symptom.trim().is_empty() {
        return Err(ApiError::bad_request("symptom must not be empty"));
    }

    let log = state
        .store
        .create_symptom_log(
            payload.user_id,
            NewSymptomLog {
                symptom: payload.symptom,
                severity: payload.severity,
                notes: payload.notes,
            },
        )
        .await?;

    Ok(Json(LogSymptomResponse {
        symptom_id: log.id,
        message: "Symptom logged successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn list_symptoms(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(window): Query<WindowQuery>,
) -> Result<Json<SymptomsResponse>, ApiError> {
    if window.days < 0 {
        return Err(ApiError::bad_request("days must be non-negative"));
    }
    let symptoms = state.store.symptoms(user_id, window.days).await?;
    Ok(Json(SymptomsResponse { symptoms }))
}

/// LLM pattern analysis over the last 30 days of symptoms. Best-effort: an
/// upstream failure degrades to a canned message, never an error response.
#[instrument(skip(state))]
pub async fn analyze_symptoms(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<SymptomAnalysisResponse>, ApiError> {
    let symptoms = state.store.symptoms(user_id, 30).await?;
    if symptoms.is_empty() {
        return Ok(Json(SymptomAnalysisResponse {
            analysis: "No symptoms logged yet. Start tracking to see patterns!".into(),
            symptom_count: 0,
        }));
    }

    let analysis = match state.ai.analyze_symptoms(&symptoms).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "symptom analysis failed");
            "Unable to analyze patterns at this time.".into()
        }
    };

    Ok(Json(SymptomAnalysisResponse {
        analysis,
        symptom_count: symptoms.len(),
    }))
}

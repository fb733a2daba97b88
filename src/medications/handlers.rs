use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::records::{AdherenceSummary, NewMedication};

use super::dto::{
    AddMedicationRequest, AddMedicationResponse, DeactivateMedicationRequest,
    DeactivateMedicationResponse, MedicationsResponse, TakeMedicationRequest,
    TakeMedicationResponse, WindowQuery,
};

#[instrument(skip(state, payload))]
pub async fn add_medication(
    State(state): State<AppState>,
    Json(payload): Json<AddMedicationRequest>,
) -> Result<Json<AddMedicationResponse>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }

    let med = state
        .store
        .create_medication(
            payload.user_id,
            NewMedication {
                name: payload.name,
                dosage: payload.dosage,
                frequency: payload.frequency,
            },
        )
        .await?;

    info!(medication_id = %med.id, user_id = %med.user_id, "medication added");
    Ok(Json(AddMedicationResponse {
        medication_id: med.id,
        message: "Medication added".into(),
    }))
}

#[instrument(skip(state))]
pub async fn list_medications(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<MedicationsResponse>, ApiError> {
    let medications = state.store.medications(user_id).await?;
    Ok(Json(MedicationsResponse { medications }))
}

/// One adherence event per dose or skip. Unknown or foreign medications fail
/// with 404.
#[instrument(skip(state, payload))]
pub async fn take_medication(
    State(state): State<AppState>,
    Path(medication_id): Path<Uuid>,
    Json(payload): Json<TakeMedicationRequest>,
) -> Result<Json<TakeMedicationResponse>, ApiError> {
    let event = state
        .store
        .log_medication_event(medication_id, payload.user_id, payload.skipped)
        .await?;
    Ok(Json(TakeMedicationResponse {
        log_id: event.id,
        message: "Medication logged".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn deactivate_medication(
    State(state): State<AppState>,
    Path(medication_id): Path<Uuid>,
    Json(payload): Json<DeactivateMedicationRequest>,
) -> Result<Json<DeactivateMedicationResponse>, ApiError> {
    let med = state
        .store
        .deactivate_medication(payload.user_id, medication_id)
        .await?;
    info!(medication_id = %med.id, "medication deactivated");
    Ok(Json(DeactivateMedicationResponse {
        medication_id: med.id,
        active: med.active,
        message: "Medication deactivated".into(),
    }))
}

#[instrument(skip(state))]
pub async fn adherence(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(window): Query<WindowQuery>,
) -> Result<Json<AdherenceSummary>, ApiError> {
    if window.days < 0 {
        return Err(ApiError::bad_request("days must be non-negative"));
    }
    let summary = state
        .store
        .medication_adherence(user_id, window.days)
        .await?;
    Ok(Json(summary))
}

use axum::{
    extract::{Path, Query, State},
    Json,
};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{InsightsSummary, ReportResponse, WindowQuery};
use super::summary::{recommendations, summarize};

pub(super) async fn window_summary(
    state: &AppState,
    user_id: Uuid,
    days: i64,
) -> Result<InsightsSummary, ApiError> {
    let meals = state.store.meals(user_id, days).await?;
    let symptoms = state.store.symptoms(user_id, days).await?;
    let scores = state.store.daily_scores(user_id, days).await?;
    Ok(summarize(days, &meals, &symptoms, &scores))
}

#[instrument(skip(state))]
pub async fn get_insights(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(window): Query<WindowQuery>,
) -> Result<Json<InsightsSummary>, ApiError> {
    if window.days < 1 {
        return Err(ApiError::bad_request("days must be at least 1"));
    }
    let summary = window_summary(&state, user_id, window.days).await?;
    Ok(Json(summary))
}

#[instrument(skip(state))]
pub async fn get_report(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ReportResponse>, ApiError> {
    let user = state
        .store
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Store(crate::error::StoreError::NotFound("user not found".into())))?;

    let summary = window_summary(&state, user_id, 7).await?;
    let recommendations = recommendations(&summary);

    Ok(Json(ReportResponse {
        report_id: Uuid::new_v4(),
        user_name: user.name,
        generated_at: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
        period: summary.period.clone(),
        summary,
        recommendations,
    }))
}

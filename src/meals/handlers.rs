use std::path::Path as FsPath;

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::ai::MealAnalysis;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::records::NewMealLog;

use super::dto::{LogMealResponse, MealsResponse, WindowQuery};

struct LogMealForm {
    user_id: Option<Uuid>,
    description: Option<String>,
    meal_type: String,
    photo: Option<(String, Vec<u8>)>,
}

async fn read_form(mut mp: Multipart) -> Result<LogMealForm, ApiError> {
    let mut form = LogMealForm {
        user_id: None,
        description: None,
        meal_type: "snack".into(),
        photo: None,
    };
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        match field.name().unwrap_or_default() {
            "user_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                form.user_id = Some(
                    text.parse()
                        .map_err(|_| ApiError::bad_request("user_id must be a UUID"))?,
                );
            }
            "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                if !text.is_empty() {
                    form.description = Some(text);
                }
            }
            "meal_type" => {
                form.meal_type = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
            }
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                if !data.is_empty() {
                    form.photo = Some((filename, data.to_vec()));
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Log a meal with an optional photo. The photo, if present, goes through the
/// vision model; a failed or slow analysis degrades to the zeroed default and
/// the record is saved regardless.
#[instrument(skip(state, mp))]
pub async fn log_meal(
    State(state): State<AppState>,
    mp: Multipart,
) -> Result<Json<LogMealResponse>, ApiError> {
    let form = read_form(mp).await?;
    let user_id = form
        .user_id
        .ok_or_else(|| ApiError::bad_request("user_id is required"))?;

    let mut image_path = None;
    let mut analysis = MealAnalysis::default();
    let mut analyzed = false;

    if let Some((filename, bytes)) = &form.photo {
        let ext = FsPath::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");
        let stored = format!("{}/{}.{}", state.config.uploads_dir, Uuid::new_v4(), ext);
        tokio::fs::create_dir_all(&state.config.uploads_dir)
            .await
            .map_err(|e| crate::error::StoreError::Other(e.into()))?;
        tokio::fs::write(&stored, bytes)
            .await
            .map_err(|e| crate::error::StoreError::Other(e.into()))?;
        image_path = Some(stored);

        match state.ai.analyze_meal_image(bytes).await {
            Ok(result) => {
                analysis = result;
                analyzed = true;
            }
            Err(e) => warn!(error = %e, "meal analysis failed; saving with defaults"),
        }
    }

    let meal = state
        .store
        .create_meal_log(
            user_id,
            NewMealLog {
                image_path,
                description: form
                    .description
                    .or_else(|| analyzed.then(|| analysis.description.clone())),
                calories: analysis.calories.round().max(0.0) as i64,
                protein: analysis.protein.max(0.0),
                carbs: analysis.carbs.max(0.0),
                fat: analysis.fat.max(0.0),
                fiber: analysis.fiber.max(0.0),
                meal_type: form.meal_type,
                ai_analysis: if analyzed {
                    serde_json::to_value(&analysis).ok()
                } else {
                    None
                },
            },
        )
        .await?;

    Ok(Json(LogMealResponse {
        meal_id: meal.id,
        analysis,
        message: "Meal logged successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(window): Query<WindowQuery>,
) -> Result<Json<MealsResponse>, ApiError> {
    if window.days < 0 {
        return Err(ApiError::bad_request("days must be non-negative"));
    }
    let meals = state.store.meals(user_id, window.days).await?;
    Ok(Json(MealsResponse { meals }))
}

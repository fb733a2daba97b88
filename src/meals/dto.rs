use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ai::MealAnalysis;
use crate::store::records::MealLog;

#[derive(Debug, Serialize)]
pub struct LogMealResponse {
    pub meal_id: Uuid,
    pub analysis: MealAnalysis,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MealsResponse {
    pub meals: Vec<MealLog>,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    7
}

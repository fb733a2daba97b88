use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::store::records::DailyScore;

/// Daily-score upsert body. Fields left out are persisted as null for the
/// day, not inherited from an earlier save.
#[derive(Debug, Deserialize)]
pub struct DailyScoreRequest {
    pub user_id: Uuid,
    pub energy_level: Option<i64>,
    pub mood_level: Option<i64>,
    pub sleep_hours: Option<f64>,
    pub water_intake: Option<i64>,
    pub exercise_minutes: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DailyScoreResponse {
    pub score_id: Uuid,
    pub date: Date,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DailyScoresResponse {
    pub scores: Vec<DailyScore>,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}

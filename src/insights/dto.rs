use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Windowed summary over meals, symptoms and daily scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsSummary {
    pub period: String,
    pub meals_logged: i64,
    pub avg_daily_calories: i64,
    pub symptoms_logged: i64,
    pub avg_energy: f64,
    pub avg_mood: f64,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report_id: Uuid,
    pub user_name: String,
    pub generated_at: String,
    pub period: String,
    pub summary: InsightsSummary,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    7
}

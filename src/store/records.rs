use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Account record. `password_hash` is never serialized out; bot-created users
/// carry a `telegram_id` instead of email credentials.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub telegram_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub telegram_id: Option<String>,
}

/// One logged meal. Nutrition numbers default to zero when photo analysis was
/// unavailable; `ai_analysis` keeps the raw analysis payload for the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_path: Option<String>,
    pub description: Option<String>,
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub meal_type: String,
    pub ai_analysis: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct NewMealLog {
    pub image_path: Option<String>,
    pub description: Option<String>,
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub meal_type: String,
    pub ai_analysis: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SymptomLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symptom: String,
    pub severity: i64,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewSymptomLog {
    pub symptom: String,
    pub severity: i64,
    pub notes: Option<String>,
}

/// Medications are soft-deactivated via `active`, never physically removed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Medication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

/// One adherence log entry: a dose either taken or explicitly skipped.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MedicationEvent {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub taken_at: OffsetDateTime,
    pub skipped: bool,
}

/// At most one row per (user, date); a second save for the same day replaces
/// the row entirely.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyScore {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub energy_level: Option<i64>,
    pub mood_level: Option<i64>,
    pub sleep_hours: Option<f64>,
    pub water_intake: Option<i64>,
    pub exercise_minutes: Option<i64>,
    pub notes: Option<String>,
}

/// Caller-supplied daily-score fields. Fields left `None` are persisted as
/// null, not inherited from a prior row for the same day.
#[derive(Debug, Clone, Default)]
pub struct DailyScoreFields {
    pub energy_level: Option<i64>,
    pub mood_level: Option<i64>,
    pub sleep_hours: Option<f64>,
    pub water_intake: Option<i64>,
    pub exercise_minutes: Option<i64>,
    pub notes: Option<String>,
}

/// Windowed medication-adherence summary produced by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherenceSummary {
    pub period_days: i64,
    pub total: i64,
    pub taken: i64,
    pub skipped: i64,
    pub adherence_rate: f64,
}

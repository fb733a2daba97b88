use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{header::HeaderMap, header::HeaderValue, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::insights::summary::adherence_summary;

use super::records::{
    AdherenceSummary, DailyScore, DailyScoreFields, Medication, MedicationEvent, MealLog,
    NewMealLog, NewMedication, NewSymptomLog, NewUser, SymptomLog, User,
};
use super::{check_daily_score, check_meal_numbers, check_severity, check_window, window_start};

/// Hosted store reached over a PostgREST-style REST surface (Supabase
/// conventions): equality/range filters in the query string, `Prefer`
/// headers controlling write behavior.
pub struct RemoteStore {
    http: reqwest::Client,
    base: String,
    key: String,
}

impl RemoteStore {
    pub fn new(url: &str, key: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(key)?);
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            base: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base, table)
    }

    async fn insert<T: DeserializeOwned>(
        &self,
        table: &str,
        payload: Value,
    ) -> Result<T, StoreError> {
        let resp = self
            .http
            .post(self.endpoint(table))
            .bearer_auth(&self.key)
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await?;
        first_row(decode_rows(resp).await?)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        debug!(table, ?filters, "remote select");
        let resp = self
            .http
            .get(self.endpoint(table))
            .bearer_auth(&self.key)
            .query(filters)
            .send()
            .await?;
        decode_rows(resp).await
    }
}

fn first_row<T>(rows: Vec<T>) -> Result<T, StoreError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::Other(anyhow!("write returned no representation")))
}

fn rfc3339(t: OffsetDateTime) -> Result<String, StoreError> {
    t.format(&Rfc3339)
        .map_err(|e| StoreError::Other(anyhow!("timestamp format: {e}")))
}

/// Map a PostgREST response onto the shared store taxonomy: 409 / SQLSTATE
/// 23505 is a uniqueness violation, gateway-level 5xx means the medium is
/// unreachable. Genuine failures are surfaced, never turned into empty rows.
async fn decode_rows<T: DeserializeOwned>(resp: Response) -> Result<Vec<T>, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<Vec<T>>().await?);
    }

    let body = resp.text().await.unwrap_or_default();
    if status == StatusCode::CONFLICT || body.contains("23505") {
        return Err(StoreError::ConstraintViolation(body));
    }
    match status {
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            Err(StoreError::Unavailable(format!("{status}: {body}")))
        }
        _ => Err(StoreError::Other(anyhow!("remote store {status}: {body}"))),
    }
}

#[async_trait]
impl super::HealthStore for RemoteStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        self.insert(
            "users",
            json!({
                "id": Uuid::new_v4(),
                "name": new.name,
                "email": new.email,
                "password_hash": new.password_hash,
                "telegram_id": new.telegram_id,
                "created_at": rfc3339(OffsetDateTime::now_utc())?,
            }),
        )
        .await
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let rows: Vec<User> = self
            .select(
                "users",
                &[("email", format!("eq.{email}")), ("limit", "1".into())],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let rows: Vec<User> = self
            .select(
                "users",
                &[("id", format!("eq.{id}")), ("limit", "1".into())],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn create_meal_log(
        &self,
        user_id: Uuid,
        new: NewMealLog,
    ) -> Result<MealLog, StoreError> {
        check_meal_numbers(&new)?;
        self.insert(
            "meal_logs",
            json!({
                "id": Uuid::new_v4(),
                "user_id": user_id,
                "image_path": new.image_path,
                "description": new.description,
                "calories": new.calories,
                "protein": new.protein,
                "carbs": new.carbs,
                "fat": new.fat,
                "fiber": new.fiber,
                "meal_type": new.meal_type,
                "ai_analysis": new.ai_analysis,
                "logged_at": rfc3339(OffsetDateTime::now_utc())?,
            }),
        )
        .await
    }

    async fn meals(&self, user_id: Uuid, days: i64) -> Result<Vec<MealLog>, StoreError> {
        check_window(days)?;
        self.select(
            "meal_logs",
            &[
                ("user_id", format!("eq.{user_id}")),
                ("logged_at", format!("gte.{}", rfc3339(window_start(days))?)),
                ("order", "logged_at.desc".into()),
            ],
        )
        .await
    }

    async fn create_symptom_log(
        &self,
        user_id: Uuid,
        new: NewSymptomLog,
    ) -> Result<SymptomLog, StoreError> {
        check_severity(new.severity)?;
        self.insert(
            "symptom_logs",
            json!({
                "id": Uuid::new_v4(),
                "user_id": user_id,
                "symptom": new.symptom,
                "severity": new.severity,
                "notes": new.notes,
                "logged_at": rfc3339(OffsetDateTime::now_utc())?,
            }),
        )
        .await
    }

    async fn symptoms(&self, user_id: Uuid, days: i64) -> Result<Vec<SymptomLog>, StoreError> {
        check_window(days)?;
        self.select(
            "symptom_logs",
            &[
                ("user_id", format!("eq.{user_id}")),
                ("logged_at", format!("gte.{}", rfc3339(window_start(days))?)),
                ("order", "logged_at.desc".into()),
            ],
        )
        .await
    }

    async fn create_medication(
        &self,
        user_id: Uuid,
        new: NewMedication,
    ) -> Result<Medication, StoreError> {
        self.insert(
            "medications",
            json!({
                "id": Uuid::new_v4(),
                "user_id": user_id,
                "name": new.name,
                "dosage": new.dosage,
                "frequency": new.frequency,
                "active": true,
                "created_at": rfc3339(OffsetDateTime::now_utc())?,
            }),
        )
        .await
    }

    async fn medications(&self, user_id: Uuid) -> Result<Vec<Medication>, StoreError> {
        self.select(
            "medications",
            &[
                ("user_id", format!("eq.{user_id}")),
                ("active", "eq.true".into()),
                ("order", "created_at.desc".into()),
            ],
        )
        .await
    }

    async fn deactivate_medication(
        &self,
        user_id: Uuid,
        medication_id: Uuid,
    ) -> Result<Medication, StoreError> {
        let resp = self
            .http
            .patch(self.endpoint("medications"))
            .bearer_auth(&self.key)
            .query(&[
                ("id", format!("eq.{medication_id}")),
                ("user_id", format!("eq.{user_id}")),
            ])
            .header("Prefer", "return=representation")
            .json(&json!({ "active": false }))
            .send()
            .await?;
        let rows: Vec<Medication> = decode_rows(resp).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound("medication not found".into()))
    }

    async fn log_medication_event(
        &self,
        medication_id: Uuid,
        user_id: Uuid,
        skipped: bool,
    ) -> Result<MedicationEvent, StoreError> {
        let owned: Vec<Medication> = self
            .select(
                "medications",
                &[
                    ("id", format!("eq.{medication_id}")),
                    ("user_id", format!("eq.{user_id}")),
                    ("limit", "1".into()),
                ],
            )
            .await?;
        if owned.is_empty() {
            return Err(StoreError::NotFound("medication not found".into()));
        }

        self.insert(
            "medication_logs",
            json!({
                "id": Uuid::new_v4(),
                "medication_id": medication_id,
                "user_id": user_id,
                "taken_at": rfc3339(OffsetDateTime::now_utc())?,
                "skipped": skipped,
            }),
        )
        .await
    }

    async fn medication_adherence(
        &self,
        user_id: Uuid,
        days: i64,
    ) -> Result<AdherenceSummary, StoreError> {
        check_window(days)?;
        // Same math as the local variant, over the windowed events.
        let events: Vec<MedicationEvent> = self
            .select(
                "medication_logs",
                &[
                    ("user_id", format!("eq.{user_id}")),
                    ("taken_at", format!("gte.{}", rfc3339(window_start(days))?)),
                ],
            )
            .await?;
        Ok(adherence_summary(days, &events))
    }

    async fn save_daily_score(
        &self,
        user_id: Uuid,
        fields: DailyScoreFields,
    ) -> Result<DailyScore, StoreError> {
        check_daily_score(&fields)?;
        let today = OffsetDateTime::now_utc().date();
        // Server-side upsert on (user_id, date): one atomic exchange, all
        // columns sent explicitly so the prior row is fully replaced.
        let resp = self
            .http
            .post(self.endpoint("daily_scores"))
            .bearer_auth(&self.key)
            .query(&[("on_conflict", "user_id,date")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&json!({
                "id": Uuid::new_v4(),
                "user_id": user_id,
                "date": today.to_string(),
                "energy_level": fields.energy_level,
                "mood_level": fields.mood_level,
                "sleep_hours": fields.sleep_hours,
                "water_intake": fields.water_intake,
                "exercise_minutes": fields.exercise_minutes,
                "notes": fields.notes,
            }))
            .send()
            .await?;
        first_row(decode_rows(resp).await?)
    }

    async fn daily_scores(&self, user_id: Uuid, days: i64) -> Result<Vec<DailyScore>, StoreError> {
        check_window(days)?;
        let cutoff = OffsetDateTime::now_utc().date() - time::Duration::days(days);
        self.select(
            "daily_scores",
            &[
                ("user_id", format!("eq.{user_id}")),
                ("date", format!("gte.{cutoff}")),
                ("order", "date.desc".into()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_handles_trailing_slash() {
        let store = RemoteStore::new("https://proj.supabase.co/", "anon-key").expect("client");
        assert_eq!(
            store.endpoint("meal_logs"),
            "https://proj.supabase.co/rest/v1/meal_logs"
        );
    }
}

pub mod local;
pub mod records;
pub mod remote;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::{AppConfig, StoreKind};
use crate::error::StoreError;
use records::{
    AdherenceSummary, DailyScore, DailyScoreFields, Medication, MedicationEvent, MealLog,
    NewMealLog, NewMedication, NewSymptomLog, NewUser, SymptomLog, User,
};

/// Capability set shared by both backing stores. Selected once at startup;
/// call sites never branch on the store kind.
///
/// Windowed queries take a non-negative trailing day count (at most
/// `MAX_WINDOW_DAYS`) and return records newest-first. Every write is durably committed before the call returns.
#[async_trait]
pub trait HealthStore: Send + Sync {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn create_meal_log(&self, user_id: Uuid, new: NewMealLog)
        -> Result<MealLog, StoreError>;
    async fn meals(&self, user_id: Uuid, days: i64) -> Result<Vec<MealLog>, StoreError>;

    async fn create_symptom_log(
        &self,
        user_id: Uuid,
        new: NewSymptomLog,
    ) -> Result<SymptomLog, StoreError>;
    async fn symptoms(&self, user_id: Uuid, days: i64) -> Result<Vec<SymptomLog>, StoreError>;

    async fn create_medication(
        &self,
        user_id: Uuid,
        new: NewMedication,
    ) -> Result<Medication, StoreError>;
    /// Active medications only.
    async fn medications(&self, user_id: Uuid) -> Result<Vec<Medication>, StoreError>;
    /// Soft delete: clears the active flag, keeps the row.
    async fn deactivate_medication(
        &self,
        user_id: Uuid,
        medication_id: Uuid,
    ) -> Result<Medication, StoreError>;

    /// Fails with `NotFound` if the medication does not exist or belongs to
    /// another user.
    async fn log_medication_event(
        &self,
        medication_id: Uuid,
        user_id: Uuid,
        skipped: bool,
    ) -> Result<MedicationEvent, StoreError>;
    async fn medication_adherence(
        &self,
        user_id: Uuid,
        days: i64,
    ) -> Result<AdherenceSummary, StoreError>;

    /// Replace-on-conflict keyed on (user, today): fields omitted by the
    /// caller become null, not inherited from the prior row. Atomic with
    /// respect to concurrent writers for the same day.
    async fn save_daily_score(
        &self,
        user_id: Uuid,
        fields: DailyScoreFields,
    ) -> Result<DailyScore, StoreError>;
    async fn daily_scores(&self, user_id: Uuid, days: i64) -> Result<Vec<DailyScore>, StoreError>;
}

/// Build the store variant named by configuration.
pub async fn init_store(config: &AppConfig) -> anyhow::Result<Arc<dyn HealthStore>> {
    match config.store_kind {
        StoreKind::Local => {
            let store = local::LocalStore::connect(&config.database_path).await?;
            Ok(Arc::new(store))
        }
        StoreKind::Remote => {
            let url = config
                .supabase_url
                .as_deref()
                .context("SUPABASE_URL is required for STORE_KIND=remote")?;
            let key = config
                .supabase_key
                .as_deref()
                .context("SUPABASE_KEY is required for STORE_KIND=remote")?;
            let store = remote::RemoteStore::new(url, key)?;
            Ok(Arc::new(store))
        }
    }
}

/// Largest accepted trailing window, about a century. Anything longer is a
/// caller mistake, and unchecked it would overflow the date arithmetic below.
pub(crate) const MAX_WINDOW_DAYS: i64 = 36_500;

/// Start of a trailing window of `days` days ending now. `days = 0` yields
/// only same-instant records. Callers must run `check_window` first.
pub(crate) fn window_start(days: i64) -> OffsetDateTime {
    OffsetDateTime::now_utc() - time::Duration::days(days)
}

pub(crate) fn check_window(days: i64) -> Result<(), StoreError> {
    if !(0..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(StoreError::ConstraintViolation(format!(
            "window must be between 0 and {MAX_WINDOW_DAYS} days, got {days}"
        )));
    }
    Ok(())
}

pub(crate) fn check_severity(severity: i64) -> Result<(), StoreError> {
    if !(1..=10).contains(&severity) {
        return Err(StoreError::ConstraintViolation(format!(
            "severity must be between 1 and 10, got {severity}"
        )));
    }
    Ok(())
}

pub(crate) fn check_meal_numbers(new: &NewMealLog) -> Result<(), StoreError> {
    if new.calories < 0
        || new.protein < 0.0
        || new.carbs < 0.0
        || new.fat < 0.0
        || new.fiber < 0.0
    {
        return Err(StoreError::ConstraintViolation(
            "nutrition values must be non-negative".into(),
        ));
    }
    Ok(())
}

pub(crate) fn check_daily_score(fields: &DailyScoreFields) -> Result<(), StoreError> {
    let in_scale = |v: Option<i64>| v.map_or(true, |n| (1..=10).contains(&n));
    if !in_scale(fields.energy_level) || !in_scale(fields.mood_level) {
        return Err(StoreError::ConstraintViolation(
            "energy and mood levels must be between 1 and 10".into(),
        ));
    }
    if let Some(hours) = fields.sleep_hours {
        if !(0.0..=24.0).contains(&hours) {
            return Err(StoreError::ConstraintViolation(
                "sleep hours must be between 0 and 24".into(),
            ));
        }
    }
    if fields.water_intake.is_some_and(|n| n < 0)
        || fields.exercise_minutes.is_some_and(|n| n < 0)
    {
        return Err(StoreError::ConstraintViolation(
            "water intake and exercise minutes must be non-negative".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_bounds_are_inclusive() {
        assert!(check_severity(1).is_ok());
        assert!(check_severity(10).is_ok());
        assert!(check_severity(0).is_err());
        assert!(check_severity(11).is_err());
        assert!(check_severity(-3).is_err());
    }

    #[test]
    fn zero_day_window_is_legal() {
        assert!(check_window(0).is_ok());
        assert!(check_window(30).is_ok());
        assert!(check_window(-1).is_err());
    }

    #[test]
    fn window_upper_bound_is_enforced() {
        assert!(check_window(MAX_WINDOW_DAYS).is_ok());
        assert!(check_window(MAX_WINDOW_DAYS + 1).is_err());
        assert!(check_window(i64::MAX).is_err());
    }

    #[test]
    fn negative_nutrition_is_rejected() {
        let mut new = NewMealLog {
            meal_type: "snack".into(),
            ..NewMealLog::default()
        };
        assert!(check_meal_numbers(&new).is_ok());
        new.protein = -0.1;
        assert!(check_meal_numbers(&new).is_err());
    }

    #[test]
    fn daily_score_ranges() {
        let ok = DailyScoreFields {
            energy_level: Some(10),
            sleep_hours: Some(24.0),
            ..DailyScoreFields::default()
        };
        assert!(check_daily_score(&ok).is_ok());

        let bad_mood = DailyScoreFields {
            mood_level: Some(11),
            ..DailyScoreFields::default()
        };
        assert!(check_daily_score(&bad_mood).is_err());

        let bad_sleep = DailyScoreFields {
            sleep_hours: Some(25.0),
            ..DailyScoreFields::default()
        };
        assert!(check_daily_score(&bad_sleep).is_err());

        let bad_water = DailyScoreFields {
            water_intake: Some(-1),
            ..DailyScoreFields::default()
        };
        assert!(check_daily_score(&bad_water).is_err());
    }
}

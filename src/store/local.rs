use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, SqlitePool,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::StoreError;

use super::records::{
    AdherenceSummary, DailyScore, DailyScoreFields, Medication, MedicationEvent, MealLog,
    NewMealLog, NewMedication, NewSymptomLog, NewUser, SymptomLog, User,
};
use super::{check_daily_score, check_meal_numbers, check_severity, check_window, window_start};
use crate::insights::summary::adherence_from_counts;

/// Embedded store backed by a single SQLite file. The schema is created
/// idempotently on first use.
pub struct LocalStore {
    pool: SqlitePool,
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        telegram_id TEXT UNIQUE,
        name TEXT NOT NULL,
        email TEXT UNIQUE,
        password_hash TEXT,
        created_at TIMESTAMP NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS meal_logs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        image_path TEXT,
        description TEXT,
        calories INTEGER DEFAULT 0,
        protein REAL DEFAULT 0,
        carbs REAL DEFAULT 0,
        fat REAL DEFAULT 0,
        fiber REAL DEFAULT 0,
        meal_type TEXT,
        ai_analysis TEXT,
        logged_at TIMESTAMP NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id)
    )",
    "CREATE TABLE IF NOT EXISTS symptom_logs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        symptom TEXT NOT NULL,
        severity INTEGER CHECK(severity >= 1 AND severity <= 10),
        notes TEXT,
        logged_at TIMESTAMP NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id)
    )",
    "CREATE TABLE IF NOT EXISTS medications (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        dosage TEXT,
        frequency TEXT,
        active INTEGER DEFAULT 1,
        created_at TIMESTAMP NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id)
    )",
    "CREATE TABLE IF NOT EXISTS medication_logs (
        id TEXT PRIMARY KEY,
        medication_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        taken_at TIMESTAMP NOT NULL,
        skipped INTEGER DEFAULT 0,
        FOREIGN KEY (medication_id) REFERENCES medications(id)
    )",
    "CREATE TABLE IF NOT EXISTS daily_scores (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        date DATE NOT NULL,
        energy_level INTEGER,
        mood_level INTEGER,
        sleep_hours REAL,
        water_intake INTEGER,
        exercise_minutes INTEGER,
        notes TEXT,
        UNIQUE(user_id, date),
        FOREIGN KEY (user_id) REFERENCES users(id)
    )",
];

impl LocalStore {
    pub async fn connect(path: &str) -> anyhow::Result<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// In-memory database for tests. A single connection keeps the database
    /// alive for the lifetime of the pool.
    pub async fn connect_in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Raw meal row; `ai_analysis` is stored as JSON text. Historical rows with
/// malformed text decode to `None` instead of failing the whole query.
#[derive(Debug, FromRow)]
struct MealRow {
    id: Uuid,
    user_id: Uuid,
    image_path: Option<String>,
    description: Option<String>,
    calories: i64,
    protein: f64,
    carbs: f64,
    fat: f64,
    fiber: f64,
    meal_type: String,
    ai_analysis: Option<String>,
    logged_at: OffsetDateTime,
}

impl From<MealRow> for MealLog {
    fn from(row: MealRow) -> Self {
        MealLog {
            id: row.id,
            user_id: row.user_id,
            image_path: row.image_path,
            description: row.description,
            calories: row.calories,
            protein: row.protein,
            carbs: row.carbs,
            fat: row.fat,
            fiber: row.fiber,
            meal_type: row.meal_type,
            ai_analysis: row
                .ai_analysis
                .as_deref()
                .and_then(|text| serde_json::from_str(text).ok()),
            logged_at: row.logged_at,
        }
    }
}

#[async_trait]
impl super::HealthStore for LocalStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, telegram_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, name, email, password_hash, telegram_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.telegram_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, telegram_id, created_at
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, telegram_id, created_at
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_meal_log(
        &self,
        user_id: Uuid,
        new: NewMealLog,
    ) -> Result<MealLog, StoreError> {
        check_meal_numbers(&new)?;
        let row = sqlx::query_as::<_, MealRow>(
            r#"
            INSERT INTO meal_logs
                (id, user_id, image_path, description, calories, protein, carbs, fat, fiber,
                 meal_type, ai_analysis, logged_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, image_path, description, calories, protein, carbs, fat,
                      fiber, meal_type, ai_analysis, logged_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&new.image_path)
        .bind(&new.description)
        .bind(new.calories)
        .bind(new.protein)
        .bind(new.carbs)
        .bind(new.fat)
        .bind(new.fiber)
        .bind(&new.meal_type)
        .bind(new.ai_analysis.as_ref().map(|v| v.to_string()))
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn meals(&self, user_id: Uuid, days: i64) -> Result<Vec<MealLog>, StoreError> {
        check_window(days)?;
        let rows = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, user_id, image_path, description, calories, protein, carbs, fat,
                   fiber, meal_type, ai_analysis, logged_at
            FROM meal_logs
            WHERE user_id = ? AND logged_at >= ?
            ORDER BY logged_at DESC
            "#,
        )
        .bind(user_id)
        .bind(window_start(days))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MealLog::from).collect())
    }

    async fn create_symptom_log(
        &self,
        user_id: Uuid,
        new: NewSymptomLog,
    ) -> Result<SymptomLog, StoreError> {
        check_severity(new.severity)?;
        let log = sqlx::query_as::<_, SymptomLog>(
            r#"
            INSERT INTO symptom_logs (id, user_id, symptom, severity, notes, logged_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, symptom, severity, notes, logged_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&new.symptom)
        .bind(new.severity)
        .bind(&new.notes)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.pool)
        .await?;
        Ok(log)
    }

    async fn symptoms(&self, user_id: Uuid, days: i64) -> Result<Vec<SymptomLog>, StoreError> {
        check_window(days)?;
        let logs = sqlx::query_as::<_, SymptomLog>(
            r#"
            SELECT id, user_id, symptom, severity, notes, logged_at
            FROM symptom_logs
            WHERE user_id = ? AND logged_at >= ?
            ORDER BY logged_at DESC
            "#,
        )
        .bind(user_id)
        .bind(window_start(days))
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    async fn create_medication(
        &self,
        user_id: Uuid,
        new: NewMedication,
    ) -> Result<Medication, StoreError> {
        let med = sqlx::query_as::<_, Medication>(
            r#"
            INSERT INTO medications (id, user_id, name, dosage, frequency, active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, name, dosage, frequency, active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&new.name)
        .bind(&new.dosage)
        .bind(&new.frequency)
        .bind(true)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.pool)
        .await?;
        Ok(med)
    }

    async fn medications(&self, user_id: Uuid) -> Result<Vec<Medication>, StoreError> {
        let meds = sqlx::query_as::<_, Medication>(
            r#"
            SELECT id, user_id, name, dosage, frequency, active, created_at
            FROM medications
            WHERE user_id = ? AND active = 1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(meds)
    }

    async fn deactivate_medication(
        &self,
        user_id: Uuid,
        medication_id: Uuid,
    ) -> Result<Medication, StoreError> {
        let med = sqlx::query_as::<_, Medication>(
            r#"
            UPDATE medications SET active = 0
            WHERE id = ? AND user_id = ?
            RETURNING id, user_id, name, dosage, frequency, active, created_at
            "#,
        )
        .bind(medication_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        med.ok_or_else(|| StoreError::NotFound("medication not found".into()))
    }

    async fn log_medication_event(
        &self,
        medication_id: Uuid,
        user_id: Uuid,
        skipped: bool,
    ) -> Result<MedicationEvent, StoreError> {
        let owned = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM medications WHERE id = ? AND user_id = ?",
        )
        .bind(medication_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        if owned.is_none() {
            return Err(StoreError::NotFound("medication not found".into()));
        }

        let event = sqlx::query_as::<_, MedicationEvent>(
            r#"
            INSERT INTO medication_logs (id, medication_id, user_id, taken_at, skipped)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, medication_id, user_id, taken_at, skipped
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(medication_id)
        .bind(user_id)
        .bind(OffsetDateTime::now_utc())
        .bind(skipped)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    async fn medication_adherence(
        &self,
        user_id: Uuid,
        days: i64,
    ) -> Result<AdherenceSummary, StoreError> {
        check_window(days)?;
        let (total, taken) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(CASE WHEN skipped = 0 THEN 1 ELSE 0 END), 0)
            FROM medication_logs
            WHERE user_id = ? AND taken_at >= ?
            "#,
        )
        .bind(user_id)
        .bind(window_start(days))
        .fetch_one(&self.pool)
        .await?;
        Ok(adherence_from_counts(days, total, taken))
    }

    async fn save_daily_score(
        &self,
        user_id: Uuid,
        fields: DailyScoreFields,
    ) -> Result<DailyScore, StoreError> {
        check_daily_score(&fields)?;
        let today = OffsetDateTime::now_utc().date();
        // Single atomic statement; the whole row is overwritten on conflict.
        let score = sqlx::query_as::<_, DailyScore>(
            r#"
            INSERT INTO daily_scores
                (id, user_id, date, energy_level, mood_level, sleep_hours,
                 water_intake, exercise_minutes, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, date) DO UPDATE SET
                id = excluded.id,
                energy_level = excluded.energy_level,
                mood_level = excluded.mood_level,
                sleep_hours = excluded.sleep_hours,
                water_intake = excluded.water_intake,
                exercise_minutes = excluded.exercise_minutes,
                notes = excluded.notes
            RETURNING id, user_id, date, energy_level, mood_level, sleep_hours,
                      water_intake, exercise_minutes, notes
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(today)
        .bind(fields.energy_level)
        .bind(fields.mood_level)
        .bind(fields.sleep_hours)
        .bind(fields.water_intake)
        .bind(fields.exercise_minutes)
        .bind(&fields.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(score)
    }

    async fn daily_scores(&self, user_id: Uuid, days: i64) -> Result<Vec<DailyScore>, StoreError> {
        check_window(days)?;
        let cutoff = OffsetDateTime::now_utc().date() - time::Duration::days(days);
        let scores = sqlx::query_as::<_, DailyScore>(
            r#"
            SELECT id, user_id, date, energy_level, mood_level, sleep_hours,
                   water_intake, exercise_minutes, notes
            FROM daily_scores
            WHERE user_id = ? AND date >= ?
            ORDER BY date DESC
            "#,
        )
        .bind(user_id)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let store = LocalStore::connect_in_memory().await.expect("connect");
        store.init_schema().await.expect("second init");
        store.init_schema().await.expect("third init");
    }

    #[test]
    fn malformed_analysis_text_recovers_to_none() {
        let row = MealRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            image_path: None,
            description: Some("lunch".into()),
            calories: 500,
            protein: 20.0,
            carbs: 60.0,
            fat: 15.0,
            fiber: 5.0,
            meal_type: "lunch".into(),
            ai_analysis: Some("{not valid json".into()),
            logged_at: OffsetDateTime::now_utc(),
        };
        let meal = MealLog::from(row);
        assert!(meal.ai_analysis.is_none());
        assert_eq!(meal.calories, 500);
    }
}

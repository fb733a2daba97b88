//! Shared scenario set exercised against both persistence-gateway variants.
//! The local variant runs against an in-memory database on every test run;
//! the remote variant runs only when a reachable Supabase project is
//! configured through `HEALTHLOG_TEST_SUPABASE_URL` / `HEALTHLOG_TEST_SUPABASE_KEY`.

use healthlog::error::StoreError;
use healthlog::store::local::LocalStore;
use healthlog::store::records::{
    DailyScoreFields, NewMealLog, NewMedication, NewSymptomLog, NewUser,
};
use healthlog::store::remote::RemoteStore;
use healthlog::store::HealthStore;
use uuid::Uuid;

async fn fresh_user(store: &dyn HealthStore, tag: &str) -> healthlog::store::records::User {
    store
        .create_user(NewUser {
            name: format!("{tag} tester"),
            email: Some(format!("{tag}-{}@example.com", Uuid::new_v4())),
            password_hash: Some("$argon2id$fake".into()),
            telegram_id: None,
        })
        .await
        .expect("create user")
}

async fn scenario_email_uniqueness(store: &dyn HealthStore) {
    let email = format!("dup-{}@example.com", Uuid::new_v4());
    store
        .create_user(NewUser {
            name: "First".into(),
            email: Some(email.clone()),
            password_hash: None,
            telegram_id: None,
        })
        .await
        .expect("first signup");

    let err = store
        .create_user(NewUser {
            name: "Second".into(),
            email: Some(email.clone()),
            password_hash: None,
            telegram_id: None,
        })
        .await
        .expect_err("duplicate email must be rejected");
    assert!(matches!(err, StoreError::ConstraintViolation(_)));

    let found = store.user_by_email(&email).await.expect("lookup");
    assert_eq!(found.expect("present").name, "First");
}

async fn scenario_telegram_id_uniqueness(store: &dyn HealthStore) {
    let telegram_id = format!("tg-{}", Uuid::new_v4());
    store
        .create_user(NewUser {
            name: "First".into(),
            email: None,
            password_hash: None,
            telegram_id: Some(telegram_id.clone()),
        })
        .await
        .expect("first telegram user");

    let err = store
        .create_user(NewUser {
            name: "Second".into(),
            email: None,
            password_hash: None,
            telegram_id: Some(telegram_id),
        })
        .await
        .expect_err("duplicate telegram id must be rejected");
    assert!(matches!(err, StoreError::ConstraintViolation(_)));

    // Absent ids do not collide with each other.
    for name in ["Third", "Fourth"] {
        store
            .create_user(NewUser {
                name: name.into(),
                email: Some(format!("{}-{}@example.com", name, Uuid::new_v4())),
                password_hash: None,
                telegram_id: None,
            })
            .await
            .expect("users without a telegram id coexist");
    }
}

async fn scenario_severity_out_of_range_writes_nothing(store: &dyn HealthStore) {
    let user = fresh_user(store, "severity").await;

    for severity in [0, 11, -3] {
        let err = store
            .create_symptom_log(
                user.id,
                NewSymptomLog {
                    symptom: "headache".into(),
                    severity,
                    notes: None,
                },
            )
            .await
            .expect_err("out-of-range severity must fail");
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    let logs = store.symptoms(user.id, 7).await.expect("list");
    assert!(logs.is_empty(), "rejected writes must not persist");

    store
        .create_symptom_log(
            user.id,
            NewSymptomLog {
                symptom: "headache".into(),
                severity: 10,
                notes: Some("after lunch".into()),
            },
        )
        .await
        .expect("boundary severity is legal");
}

async fn scenario_meal_round_trip(store: &dyn HealthStore) {
    let user = fresh_user(store, "meal").await;

    let created = store
        .create_meal_log(
            user.id,
            NewMealLog {
                image_path: None,
                description: Some("grilled salmon".into()),
                calories: 540,
                protein: 42.0,
                carbs: 12.5,
                fat: 30.0,
                fiber: 2.0,
                meal_type: "dinner".into(),
                ai_analysis: Some(serde_json::json!({"health_score": 8})),
            },
        )
        .await
        .expect("create meal");

    let meals = store.meals(user.id, 7).await.expect("query");
    assert_eq!(meals.len(), 1);
    let meal = &meals[0];
    assert_eq!(meal.id, created.id);
    assert_eq!(meal.description.as_deref(), Some("grilled salmon"));
    assert_eq!(meal.calories, 540);
    assert_eq!(meal.protein, 42.0);
    assert_eq!(meal.meal_type, "dinner");
    assert_eq!(
        meal.ai_analysis.as_ref().and_then(|v| v["health_score"].as_i64()),
        Some(8)
    );

    // A zero-day window is legal and must not error.
    store.meals(user.id, 0).await.expect("zero-day window");
    let err = store.meals(user.id, -1).await.expect_err("negative window");
    assert!(matches!(err, StoreError::ConstraintViolation(_)));

    // Absurdly large windows are rejected instead of overflowing the
    // cutoff arithmetic.
    let err = store
        .meals(user.id, i64::MAX)
        .await
        .expect_err("oversized window");
    assert!(matches!(err, StoreError::ConstraintViolation(_)));
    let err = store
        .daily_scores(user.id, i64::MAX)
        .await
        .expect_err("oversized score window");
    assert!(matches!(err, StoreError::ConstraintViolation(_)));
    let err = store
        .medication_adherence(user.id, i64::MAX)
        .await
        .expect_err("oversized adherence window");
    assert!(matches!(err, StoreError::ConstraintViolation(_)));
}

async fn scenario_meals_ordered_newest_first(store: &dyn HealthStore) {
    let user = fresh_user(store, "order").await;
    for calories in [100, 200, 300] {
        store
            .create_meal_log(
                user.id,
                NewMealLog {
                    calories,
                    meal_type: "snack".into(),
                    ..NewMealLog::default()
                },
            )
            .await
            .expect("create meal");
    }
    let meals = store.meals(user.id, 7).await.expect("query");
    assert_eq!(meals.len(), 3);
    for pair in meals.windows(2) {
        assert!(pair[0].logged_at >= pair[1].logged_at, "newest first");
    }
}

async fn scenario_daily_score_replaces_whole_row(store: &dyn HealthStore) {
    let user = fresh_user(store, "score").await;

    store
        .save_daily_score(
            user.id,
            DailyScoreFields {
                energy_level: Some(3),
                mood_level: Some(4),
                sleep_hours: Some(6.5),
                notes: Some("rough night".into()),
                ..DailyScoreFields::default()
            },
        )
        .await
        .expect("first save");

    let second = store
        .save_daily_score(
            user.id,
            DailyScoreFields {
                energy_level: Some(8),
                water_intake: Some(5),
                ..DailyScoreFields::default()
            },
        )
        .await
        .expect("second save");

    let scores = store.daily_scores(user.id, 7).await.expect("list");
    assert_eq!(scores.len(), 1, "one row per (user, date)");
    let row = &scores[0];
    assert_eq!(row.id, second.id);
    assert_eq!(row.energy_level, Some(8));
    assert_eq!(row.water_intake, Some(5));
    assert_eq!(row.mood_level, None, "omitted fields become null");
    assert_eq!(row.sleep_hours, None);
    assert_eq!(row.notes, None);
}

async fn scenario_adherence(store: &dyn HealthStore) {
    let user = fresh_user(store, "adherence").await;

    // No events yet: rate is zero, not an error.
    let empty = store
        .medication_adherence(user.id, 30)
        .await
        .expect("empty adherence");
    assert_eq!(empty.total, 0);
    assert_eq!(empty.adherence_rate, 0.0);

    let med = store
        .create_medication(
            user.id,
            NewMedication {
                name: "Vitamin D".into(),
                dosage: "1000 IU".into(),
                frequency: "daily".into(),
            },
        )
        .await
        .expect("create medication");

    for _ in 0..8 {
        store
            .log_medication_event(med.id, user.id, false)
            .await
            .expect("taken");
    }
    for _ in 0..2 {
        store
            .log_medication_event(med.id, user.id, true)
            .await
            .expect("skipped");
    }

    let summary = store
        .medication_adherence(user.id, 30)
        .await
        .expect("adherence");
    assert_eq!(summary.period_days, 30);
    assert_eq!(summary.total, 10);
    assert_eq!(summary.taken, 8);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.adherence_rate, 80.0);
}

async fn scenario_medication_lifecycle(store: &dyn HealthStore) {
    let user = fresh_user(store, "meds").await;

    let err = store
        .log_medication_event(Uuid::new_v4(), user.id, false)
        .await
        .expect_err("unknown medication");
    assert!(matches!(err, StoreError::NotFound(_)));

    let med = store
        .create_medication(
            user.id,
            NewMedication {
                name: "Ibuprofen".into(),
                dosage: "200mg".into(),
                frequency: "as needed".into(),
            },
        )
        .await
        .expect("create medication");
    assert!(med.active);

    let listed = store.medications(user.id).await.expect("list");
    assert_eq!(listed.len(), 1);

    // Another user must not be able to log against it.
    let stranger = fresh_user(store, "stranger").await;
    let err = store
        .log_medication_event(med.id, stranger.id, false)
        .await
        .expect_err("foreign medication");
    assert!(matches!(err, StoreError::NotFound(_)));

    let deactivated = store
        .deactivate_medication(user.id, med.id)
        .await
        .expect("deactivate");
    assert!(!deactivated.active);
    let listed = store.medications(user.id).await.expect("list again");
    assert!(listed.is_empty(), "deactivated medications are hidden");
}

async fn run_all(store: &dyn HealthStore) {
    scenario_email_uniqueness(store).await;
    scenario_telegram_id_uniqueness(store).await;
    scenario_severity_out_of_range_writes_nothing(store).await;
    scenario_meal_round_trip(store).await;
    scenario_meals_ordered_newest_first(store).await;
    scenario_daily_score_replaces_whole_row(store).await;
    scenario_adherence(store).await;
    scenario_medication_lifecycle(store).await;
}

#[tokio::test]
async fn local_store_contract() {
    let store = LocalStore::connect_in_memory().await.expect("connect");
    run_all(&store).await;
}

#[tokio::test]
#[ignore = "requires a reachable Supabase project with the healthlog schema"]
async fn remote_store_contract() {
    let url = std::env::var("HEALTHLOG_TEST_SUPABASE_URL").expect("HEALTHLOG_TEST_SUPABASE_URL");
    let key = std::env::var("HEALTHLOG_TEST_SUPABASE_KEY").expect("HEALTHLOG_TEST_SUPABASE_KEY");
    let store = RemoteStore::new(&url, &key).expect("client");
    run_all(&store).await;
}

//! Pure aggregation over store query results. No persisted state of its own;
//! both store variants and the report handlers funnel through these functions
//! so the two backends cannot drift apart.

use crate::store::records::{AdherenceSummary, DailyScore, MealLog, MedicationEvent, SymptomLog};

use super::dto::InsightsSummary;

pub const LOW_CALORIE_NOTE: &str =
    "Your calorie intake seems low. Consider logging more meals.";
pub const LOW_ENERGY_NOTE: &str =
    "Your energy levels have been low. Consider evaluating sleep and diet.";
pub const AFFIRMING_NOTE: &str = "Great job staying consistent with your health tracking!";

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn mean_of_present(values: impl Iterator<Item = Option<i64>>) -> f64 {
    let present: Vec<i64> = values.flatten().collect();
    if present.is_empty() {
        return 0.0;
    }
    round1(present.iter().sum::<i64>() as f64 / present.len() as f64)
}

pub fn adherence_from_counts(period_days: i64, total: i64, taken: i64) -> AdherenceSummary {
    let adherence_rate = if total > 0 {
        round1(taken as f64 / total as f64 * 100.0)
    } else {
        0.0
    };
    AdherenceSummary {
        period_days,
        total,
        taken,
        skipped: total - taken,
        adherence_rate,
    }
}

pub fn adherence_summary(period_days: i64, events: &[MedicationEvent]) -> AdherenceSummary {
    let total = events.len() as i64;
    let taken = events.iter().filter(|e| !e.skipped).count() as i64;
    adherence_from_counts(period_days, total, taken)
}

/// Window statistics. `days` must be positive; callers reject zero/negative
/// windows before calling. The calorie average divides by the window length,
/// not by days-with-data: a zero-meal day dilutes the average.
pub fn summarize(
    days: i64,
    meals: &[MealLog],
    symptoms: &[SymptomLog],
    scores: &[DailyScore],
) -> InsightsSummary {
    let total_calories: i64 = meals.iter().map(|m| m.calories).sum();
    InsightsSummary {
        period: format!("Last {days} days"),
        meals_logged: meals.len() as i64,
        avg_daily_calories: (total_calories as f64 / days as f64).round() as i64,
        symptoms_logged: symptoms.len() as i64,
        avg_energy: mean_of_present(scores.iter().map(|s| s.energy_level)),
        avg_mood: mean_of_present(scores.iter().map(|s| s.mood_level)),
    }
}

/// Fixed-order rule list. Never empty: when no rule fires, a single affirming
/// note is produced.
pub fn recommendations(summary: &InsightsSummary) -> Vec<String> {
    let mut notes = Vec::new();
    if summary.avg_daily_calories < 1200 {
        notes.push(LOW_CALORIE_NOTE.to_string());
    }
    if summary.avg_energy < 5.0 {
        notes.push(LOW_ENERGY_NOTE.to_string());
    }
    if notes.is_empty() {
        notes.push(AFFIRMING_NOTE.to_string());
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn meal(calories: i64) -> MealLog {
        MealLog {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            image_path: None,
            description: None,
            calories,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            fiber: 0.0,
            meal_type: "lunch".into(),
            ai_analysis: None,
            logged_at: OffsetDateTime::now_utc(),
        }
    }

    fn score(energy: Option<i64>, mood: Option<i64>) -> DailyScore {
        DailyScore {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date: OffsetDateTime::now_utc().date(),
            energy_level: energy,
            mood_level: mood,
            sleep_hours: None,
            water_intake: None,
            exercise_minutes: None,
            notes: None,
        }
    }

    fn event(skipped: bool) -> MedicationEvent {
        MedicationEvent {
            id: Uuid::new_v4(),
            medication_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            taken_at: OffsetDateTime::now_utc(),
            skipped,
        }
    }

    #[test]
    fn calorie_average_divides_by_window_length() {
        let meals = vec![meal(500), meal(700)];
        let summary = summarize(7, &meals, &[], &[]);
        assert_eq!(summary.avg_daily_calories, 171);
        assert_eq!(summary.meals_logged, 2);
    }

    #[test]
    fn adherence_ten_events_eight_taken() {
        let mut events: Vec<_> = (0..8).map(|_| event(false)).collect();
        events.extend((0..2).map(|_| event(true)));
        let summary = adherence_summary(30, &events);
        assert_eq!(summary.total, 10);
        assert_eq!(summary.taken, 8);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.adherence_rate, 80.0);
    }

    #[test]
    fn adherence_with_no_events_is_zero_not_an_error() {
        let summary = adherence_summary(30, &[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.adherence_rate, 0.0);
    }

    #[test]
    fn adherence_rate_rounds_to_one_decimal() {
        // 2 of 3 taken -> 66.666... -> 66.7
        let summary = adherence_from_counts(30, 3, 2);
        assert_eq!(summary.adherence_rate, 66.7);
    }

    #[test]
    fn no_scores_means_zero_averages() {
        let summary = summarize(7, &[], &[], &[]);
        assert_eq!(summary.avg_energy, 0.0);
        assert_eq!(summary.avg_mood, 0.0);
    }

    #[test]
    fn averages_ignore_absent_values() {
        let scores = vec![score(Some(4), None), score(Some(7), Some(9))];
        let summary = summarize(7, &[], &[], &scores);
        assert_eq!(summary.avg_energy, 5.5);
        assert_eq!(summary.avg_mood, 9.0);
    }

    #[test]
    fn low_intake_and_low_energy_fire_in_fixed_order() {
        let summary = InsightsSummary {
            period: "Last 7 days".into(),
            meals_logged: 3,
            avg_daily_calories: 900,
            symptoms_logged: 0,
            avg_energy: 4.0,
            avg_mood: 6.0,
        };
        let notes = recommendations(&summary);
        assert_eq!(notes, vec![LOW_CALORIE_NOTE, LOW_ENERGY_NOTE]);
    }

    #[test]
    fn recommendations_are_never_empty() {
        let summary = InsightsSummary {
            period: "Last 7 days".into(),
            meals_logged: 10,
            avg_daily_calories: 2100,
            symptoms_logged: 0,
            avg_energy: 8.0,
            avg_mood: 8.0,
        };
        assert_eq!(recommendations(&summary), vec![AFFIRMING_NOTE]);
    }
}

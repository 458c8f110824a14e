//! Workout history queries and CSV export.
//!
//! Weekly adherence and the recent activity feed for the dashboard,
//! per-exercise history, and a flat CSV export of every performance record.

use crate::suggestion::format_weight;
use crate::{PerformanceRecord, Rating, Result, WeeklyPlan, WeightLog, WorkoutLog};
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use std::fs::File;
use std::path::Path;

/// Sunday 00:00 UTC of the week containing `now`
pub fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_since_sunday = i64::from(now.weekday().num_days_from_sunday());
    let sunday = now.date_naive() - Duration::days(days_since_sunday);
    Utc.from_utc_datetime(&sunday.and_time(NaiveTime::MIN))
}

/// Workouts logged since the start of the current week
pub fn workouts_this_week(logs: &[WorkoutLog], now: DateTime<Utc>) -> usize {
    let since = start_of_week(now);
    logs.iter().filter(|log| log.date >= since).count()
}

/// Weekly adherence as a percentage, capped at 100
pub fn weekly_adherence(workouts: usize, days_per_week: u32) -> f64 {
    if days_per_week == 0 {
        return 0.0;
    }
    (workouts as f64 / days_per_week as f64 * 100.0).min(100.0)
}

/// Every record of one exercise, newest workout first
pub fn exercise_history<'a>(logs: &'a [WorkoutLog], exercise_name: &str) -> Vec<&'a PerformanceRecord> {
    let mut ordered: Vec<&WorkoutLog> = logs.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date));

    ordered
        .into_iter()
        .flat_map(|log| log.completed_exercises.iter())
        .filter(|record| record.exercise_name == exercise_name)
        .collect()
}

/// What an activity feed entry refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityKind {
    Workout,
    Weight,
    Plan,
}

impl ActivityKind {
    pub fn title(&self) -> &'static str {
        match self {
            ActivityKind::Workout => "Workout completed",
            ActivityKind::Weight => "Weight logged",
            ActivityKind::Plan => "New plan",
        }
    }
}

/// One line of the dashboard activity feed
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityItem {
    pub kind: ActivityKind,
    pub date: DateTime<Utc>,
    pub description: String,
}

/// Merge workouts, weight check-ins and plans into one feed
///
/// Newest first, at most `limit` entries. Entries with the same timestamp
/// keep the workout, weight, plan order.
pub fn recent_activity(
    workouts: &[WorkoutLog],
    weights: &[WeightLog],
    plans: &[WeeklyPlan],
    limit: usize,
) -> Vec<ActivityItem> {
    let workouts = workouts.iter().map(|log| ActivityItem {
        kind: ActivityKind::Workout,
        date: log.date,
        description: format!(
            "{} min, {} exercises",
            log.duration_minutes,
            log.completed_exercises.len()
        ),
    });
    let weights = weights.iter().map(|log| ActivityItem {
        kind: ActivityKind::Weight,
        date: log.date,
        description: format!("{}kg", format_weight(log.weight_kg)),
    });
    let plans = plans.iter().map(|plan| ActivityItem {
        kind: ActivityKind::Plan,
        date: plan.created_at,
        description: format!("{} training days", plan.days.len()),
    });

    let mut items: Vec<ActivityItem> = workouts.chain(weights).chain(plans).collect();
    items.sort_by(|a, b| b.date.cmp(&a.date));
    items.truncate(limit);
    items
}

/// A row in the CSV export
#[derive(Debug, serde::Serialize)]
struct ExportRow<'a> {
    workout_id: String,
    date: String,
    day_id: &'a str,
    exercise: &'a str,
    weight: f64,
    reps: u32,
    sets: u32,
    rating: Rating,
    duration_minutes: u32,
}

/// Export all workouts as CSV, one row per performance record
///
/// Overwrites `path`. The file is synced before returning. Returns the
/// number of rows written.
pub fn export_csv(logs: &[WorkoutLog], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut ordered: Vec<&WorkoutLog> = logs.iter().collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date));

    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    let mut rows = 0;
    for log in ordered {
        for record in &log.completed_exercises {
            writer.serialize(ExportRow {
                workout_id: log.id.to_string(),
                date: log.date.to_rfc3339(),
                day_id: &log.day_id,
                exercise: &record.exercise_name,
                weight: record.weight_used,
                reps: record.reps_completed,
                sets: record.sets_completed,
                rating: record.rating,
                duration_minutes: log.duration_minutes,
            })?;
            rows += 1;
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} records to {:?}", rows, path);
    Ok(rows)
}
